//! Common traits for stores and input sources
//!
//! The lifecycle services only ever talk to these abstractions; concrete
//! stores are injected at construction time.

use crate::error::AppError;
use crate::models::{ParkingSpot, ParkingType, Ticket};
use async_trait::async_trait;

/// Parking spot store
#[async_trait]
pub trait SpotRepository: Send + Sync {
    /// Lowest-numbered available spot of the given category
    async fn find_next_available(&self, parking_type: ParkingType)
        -> Result<Option<i32>, AppError>;

    /// Find spot by number
    async fn find_by_id(&self, id: i32) -> Result<Option<ParkingSpot>, AppError>;

    /// Persist the spot's availability flag
    ///
    /// Returns `false` when no row was changed.
    async fn update(&self, spot: &ParkingSpot) -> Result<bool, AppError>;

    /// Atomically flip an available spot to unavailable
    ///
    /// Returns `false` when the spot was already taken, which is how two
    /// concurrent entries racing for the same spot are told apart.
    async fn claim(&self, id: i32) -> Result<bool, AppError>;

    /// All spots ordered by number
    async fn list_all(&self) -> Result<Vec<ParkingSpot>, AppError>;
}

/// Ticket store
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Insert a new ticket and return it with its assigned id
    async fn save(&self, ticket: &Ticket) -> Result<Ticket, AppError>;

    /// Ticket without an exit time for this registration
    async fn find_open_by_registration(
        &self,
        vehicle_reg_number: &str,
    ) -> Result<Option<Ticket>, AppError>;

    /// Persist price and exit time of a ticket that is still open
    ///
    /// Returns `false` when no open ticket with that id exists, so a ticket
    /// is closed at most once.
    async fn update(&self, ticket: &Ticket) -> Result<bool, AppError>;

    /// Whether any open ticket references this spot
    async fn exists_open_for_spot(&self, spot_id: i32) -> Result<bool, AppError>;

    /// Number of tickets ever issued to this registration, open ones included
    async fn count_by_registration(&self, vehicle_reg_number: &str) -> Result<i64, AppError>;

    /// Ticket history for a registration, newest first
    async fn find_by_registration(&self, vehicle_reg_number: &str)
        -> Result<Vec<Ticket>, AppError>;
}

/// Source of operator input for lifecycle events
///
/// Any error returned here is treated by callers as the absence of valid input.
pub trait InputReader: Send + Sync {
    /// Vehicle type menu selection (1 = CAR, 2 = BIKE)
    fn read_selection(&self) -> Result<i32, AppError>;

    /// Vehicle registration number
    fn read_vehicle_registration(&self) -> Result<String, AppError>;
}
