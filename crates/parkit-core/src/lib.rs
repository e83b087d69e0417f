//! ParkIt Core Library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the ParkIt system. It includes:
//!
//! - Domain models (ParkingSpot, Ticket)
//! - Store and input traits consumed by the lifecycle services
//! - Unified error handling with HTTP response mapping
//! - Application configuration

pub mod config;
pub mod error;
pub mod models;
pub mod traits;

pub use config::AppConfig;
pub use error::{AppError, FareError};

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
