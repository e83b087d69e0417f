//! Data Transfer Objects (DTOs) for API requests and responses

pub mod common;
pub mod parking;
pub mod spot;
pub mod ticket;

pub use common::*;
pub use parking::*;
pub use spot::*;
pub use ticket::*;
