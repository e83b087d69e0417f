//! ParkIt Database Layer
//!
//! This crate provides store implementations for the ParkIt system:
//!
//! - Connection pool management and embedded migrations with sqlx
//! - PostgreSQL repositories for parking spots and tickets
//! - In-memory repositories with the same semantics, for the console
//!   front end and for tests

pub mod pool;
pub mod repositories;

pub use pool::{create_pool, run_migrations};
pub use repositories::*;

// Re-export commonly used types
pub use parkit_core::{AppError, AppResult};
pub use sqlx::PgPool;
