//! Ticket history handler

use crate::dto::{ApiResponse, TicketHistoryQuery, TicketResponse};
use crate::handlers::AppState;
use actix_web::{web, HttpResponse};
use parkit_core::traits::{SpotRepository, TicketRepository};
use parkit_core::AppError;
use tracing::{debug, instrument};
use validator::Validate;

/// Ticket history of a vehicle, newest first
///
/// GET /api/v1/tickets?vehicle_reg_number=ABCDEF
#[instrument(skip(service))]
pub async fn ticket_history<S, T>(
    service: AppState<S, T>,
    query: web::Query<TicketHistoryQuery>,
) -> Result<HttpResponse, AppError>
where
    S: SpotRepository + 'static,
    T: TicketRepository + 'static,
{
    query.validate()?;

    let tickets: Vec<TicketResponse> = service
        .ticket_history(&query.vehicle_reg_number)
        .await?
        .into_iter()
        .map(TicketResponse::from)
        .collect();

    debug!(count = tickets.len(), "Loaded ticket history");

    Ok(HttpResponse::Ok().json(ApiResponse::success(tickets)))
}

pub fn configure<S, T>(cfg: &mut web::ServiceConfig)
where
    S: SpotRepository + 'static,
    T: TicketRepository + 'static,
{
    cfg.route("/tickets", web::get().to(ticket_history::<S, T>));
}
