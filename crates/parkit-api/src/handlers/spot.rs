//! Spot handlers

use crate::dto::{ApiResponse, AvailabilityQuery, SpotResponse};
use crate::handlers::AppState;
use actix_web::{web, HttpResponse};
use parkit_core::traits::{SpotRepository, TicketRepository};
use parkit_core::AppError;
use tracing::instrument;

/// List every spot in the facility
///
/// GET /api/v1/spots
#[instrument(skip(service))]
pub async fn list_spots<S, T>(service: AppState<S, T>) -> Result<HttpResponse, AppError>
where
    S: SpotRepository + 'static,
    T: TicketRepository + 'static,
{
    let spots: Vec<SpotResponse> = service
        .list_spots()
        .await?
        .into_iter()
        .map(SpotResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(spots)))
}

/// Next free spot of a category, without claiming it
///
/// GET /api/v1/spots/available?type=car
#[instrument(skip(service))]
pub async fn next_available_spot<S, T>(
    service: AppState<S, T>,
    query: web::Query<AvailabilityQuery>,
) -> Result<HttpResponse, AppError>
where
    S: SpotRepository + 'static,
    T: TicketRepository + 'static,
{
    let parking_type = query.parking_type().ok_or_else(|| {
        AppError::InvalidInput(format!("Unknown vehicle type: {}", query.parking_type))
    })?;

    let spot = service
        .next_available_spot(parking_type)
        .await?
        .ok_or_else(|| AppError::SpotNotFound(format!("no free {} spot", parking_type)))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(SpotResponse::from(spot))))
}

pub fn configure<S, T>(cfg: &mut web::ServiceConfig)
where
    S: SpotRepository + 'static,
    T: TicketRepository + 'static,
{
    cfg.service(
        web::scope("/spots")
            .route("", web::get().to(list_spots::<S, T>))
            .route("/available", web::get().to(next_available_spot::<S, T>)),
    );
}
