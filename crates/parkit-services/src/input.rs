//! Preset input source
//!
//! Feeds values that are already known (an HTTP request body, a test
//! fixture) through the same `InputReader` path the console uses.

use parkit_core::{traits::InputReader, AppError, AppResult};

/// Input source returning fixed answers
#[derive(Debug, Clone, Default)]
pub struct StaticInput {
    selection: Option<i32>,
    vehicle_reg_number: Option<String>,
}

impl StaticInput {
    /// Input for a vehicle entering: type selection plus registration
    pub fn entry(selection: i32, vehicle_reg_number: impl Into<String>) -> Self {
        Self {
            selection: Some(selection),
            vehicle_reg_number: Some(vehicle_reg_number.into()),
        }
    }

    /// Input for a vehicle leaving: registration only
    pub fn exit(vehicle_reg_number: impl Into<String>) -> Self {
        Self {
            selection: None,
            vehicle_reg_number: Some(vehicle_reg_number.into()),
        }
    }

    pub fn selection(selection: i32) -> Self {
        Self {
            selection: Some(selection),
            vehicle_reg_number: None,
        }
    }
}

impl InputReader for StaticInput {
    fn read_selection(&self) -> AppResult<i32> {
        self.selection
            .ok_or_else(|| AppError::InvalidInput("no vehicle type selected".to_string()))
    }

    fn read_vehicle_registration(&self) -> AppResult<String> {
        self.vehicle_reg_number
            .clone()
            .ok_or_else(|| AppError::InvalidInput("no vehicle registration given".to_string()))
    }
}
