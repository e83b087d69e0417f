//! Repository implementations
//!
//! Concrete implementations of the store traits defined in parkit-core:
//! PostgreSQL-backed ones using sqlx, and in-memory ones.

pub mod memory;
pub mod spot_repo;
pub mod ticket_repo;

pub use memory::{InMemorySpotRepository, InMemoryTicketRepository};
pub use spot_repo::PgSpotRepository;
pub use ticket_repo::PgTicketRepository;
