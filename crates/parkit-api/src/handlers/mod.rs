//! HTTP request handlers

pub mod health;
pub mod parking;
pub mod spot;
pub mod ticket;

use actix_web::web;
use parkit_core::traits::{SpotRepository, TicketRepository};
use parkit_services::ParkingService;

/// Shared application state: the parking service over the chosen stores
pub type AppState<S, T> = web::Data<ParkingService<S, T>>;

pub use health::configure as configure_health;
pub use parking::configure as configure_parking;
pub use spot::configure as configure_spots;
pub use ticket::configure as configure_tickets;

/// Mount every route under `/api/v1`
pub fn configure_api<S, T>(cfg: &mut web::ServiceConfig)
where
    S: SpotRepository + 'static,
    T: TicketRepository + 'static,
{
    cfg.service(
        web::scope("/api/v1")
            .configure(configure_health)
            .configure(configure_parking::<S, T>)
            .configure(configure_spots::<S, T>)
            .configure(configure_tickets::<S, T>),
    );
}
