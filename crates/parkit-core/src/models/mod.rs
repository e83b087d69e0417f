//! Domain models for ParkIt

pub mod spot;
pub mod ticket;

pub use spot::{ParkingSpot, ParkingType};
pub use ticket::Ticket;
