//! API layer for ParkIt
//!
//! HTTP handlers exposing vehicle entry and exit, spot availability and
//! ticket history. Handlers are generic over the store implementations so
//! the same routes serve PostgreSQL and in-memory deployments.

#![forbid(unsafe_code)]

pub mod dto;
pub mod handlers;

pub use dto::ApiResponse;
pub use handlers::{configure_api, AppState};
