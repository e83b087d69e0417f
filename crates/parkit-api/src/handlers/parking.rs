//! Vehicle entry and exit handlers
//!
//! Translate lifecycle outcomes into HTTP responses:
//! - a full facility is a conflict
//! - bad input is a bad request
//! - an exit without an open ticket is not found
//! - store failures are internal errors

use crate::dto::{ApiResponse, EntryRequest, ExitRequest};
use crate::handlers::AppState;
use actix_web::{web, HttpResponse};
use parkit_core::traits::{SpotRepository, TicketRepository};
use parkit_core::AppError;
use parkit_services::{EntryOutcome, ExitOutcome};
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Park a vehicle
///
/// POST /api/v1/parking/entries
#[instrument(skip(service, req))]
pub async fn park_vehicle<S, T>(
    service: AppState<S, T>,
    req: web::Json<EntryRequest>,
) -> Result<HttpResponse, AppError>
where
    S: SpotRepository + 'static,
    T: TicketRepository + 'static,
{
    req.validate().map_err(|e| {
        warn!("Entry validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    debug!(
        selection = req.selection(),
        vehicle = %req.vehicle_reg_number,
        "Processing vehicle entry"
    );

    let outcome = service.process_incoming_vehicle(&req.to_input()).await;
    let message = outcome.to_string();

    match outcome {
        EntryOutcome::Parked(receipt) => {
            info!(
                ticket_id = receipt.ticket_id,
                spot_id = receipt.spot_id,
                "Vehicle parked"
            );
            Ok(HttpResponse::Created().json(ApiResponse::with_message(receipt, message)))
        }
        EntryOutcome::InvalidSelection | EntryOutcome::InvalidRegistration => {
            Err(AppError::InvalidInput(message))
        }
        EntryOutcome::ParkingFull(parking_type) => {
            Err(AppError::NoSpotAvailable(parking_type.to_string()))
        }
        EntryOutcome::SpotTaken(_) => Err(AppError::Conflict(message)),
        EntryOutcome::Failed(_) => Err(AppError::Internal(message)),
    }
}

/// Check a vehicle out and price its stay
///
/// POST /api/v1/parking/exits
#[instrument(skip(service, req))]
pub async fn exit_vehicle<S, T>(
    service: AppState<S, T>,
    req: web::Json<ExitRequest>,
) -> Result<HttpResponse, AppError>
where
    S: SpotRepository + 'static,
    T: TicketRepository + 'static,
{
    req.validate().map_err(|e| {
        warn!("Exit validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    debug!(vehicle = %req.vehicle_reg_number, "Processing vehicle exit");

    let outcome = service.process_exiting_vehicle(&req.to_input()).await?;
    let message = outcome.to_string();

    match outcome {
        ExitOutcome::Exited(receipt) => {
            if !receipt.spot_released {
                warn!(spot_id = receipt.spot_id, "Spot still marked taken after exit");
            }
            Ok(HttpResponse::Ok().json(ApiResponse::with_message(receipt, message)))
        }
        ExitOutcome::InvalidRegistration => Err(AppError::InvalidInput(message)),
        ExitOutcome::NoOpenTicket(reg) => Err(AppError::TicketNotFound(reg)),
        ExitOutcome::Failed(_) => Err(AppError::Internal(message)),
    }
}

pub fn configure<S, T>(cfg: &mut web::ServiceConfig)
where
    S: SpotRepository + 'static,
    T: TicketRepository + 'static,
{
    cfg.service(
        web::scope("/parking")
            .route("/entries", web::post().to(park_vehicle::<S, T>))
            .route("/exits", web::post().to(exit_vehicle::<S, T>)),
    );
}
