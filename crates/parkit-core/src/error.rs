//! Unified error handling for ParkIt
//!
//! This module provides the application error type with automatic HTTP
//! response mapping, plus the dedicated error type raised by fare computation.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Errors raised by the fare engine
///
/// Both variants describe malformed ticket state rather than a normal
/// operating condition, so callers must abort the enclosing transition
/// and never persist a price when one of them is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FareError {
    /// Exit time missing or earlier than the entry time
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    /// Vehicle category has no configured hourly rate
    #[error("Unknown vehicle type: {0}")]
    UnknownVehicleType(String),
}

/// Main application error type
///
/// All errors in the application should be converted to this type.
/// It implements `ResponseError` for automatic HTTP response generation.
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Database Errors ====================
    #[error("Database error: {0}")]
    Database(String),

    #[error("Database pool error: {0}")]
    Pool(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    // ==================== Parking Errors ====================
    #[error(transparent)]
    Fare(#[from] FareError),

    #[error("No parking spot available for {0}")]
    NoSpotAvailable(String),

    #[error("Parking spot not found: {0}")]
    SpotNotFound(String),

    #[error("No open ticket for vehicle: {0}")]
    TicketNotFound(String),

    // ==================== Validation Errors ====================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ==================== Resource Errors ====================
    #[error("Conflict: {0}")]
    Conflict(String),

    // ==================== Internal Errors ====================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,

            // 404 Not Found
            AppError::SpotNotFound(_) | AppError::TicketNotFound(_) => StatusCode::NOT_FOUND,

            // 409 Conflict
            AppError::NoSpotAvailable(_) | AppError::Conflict(_) => StatusCode::CONFLICT,

            // 422 Unprocessable Entity
            AppError::Fare(_) => StatusCode::UNPROCESSABLE_ENTITY,

            // 500 Internal Server Error
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database_error",
            AppError::Pool(_) => "pool_error",
            AppError::Migration(_) => "migration_error",
            AppError::Fare(FareError::InvalidDuration(_)) => "invalid_duration",
            AppError::Fare(FareError::UnknownVehicleType(_)) => "unknown_vehicle_type",
            AppError::NoSpotAvailable(_) => "parking_full",
            AppError::SpotNotFound(_) => "spot_not_found",
            AppError::TicketNotFound(_) => "ticket_not_found",
            AppError::Validation(_) => "validation_error",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::Conflict(_) => "conflict",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = json!({
            "error": self.error_code(),
            "message": self.to_string(),
            "status": status.as_u16(),
        });

        HttpResponse::build(status).json(body)
    }
}

// ==================== From implementations ====================

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}
