//! Entry and exit DTOs
//!
//! Request bodies for the parking endpoints. They are turned into a
//! `StaticInput` so HTTP callers go through the same input path as the
//! console.

use parkit_core::models::ParkingType;
use parkit_services::StaticInput;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Vehicle entry request
///
/// The category can be given by name (`vehicle_type`) or by menu number
/// (`selection`, 1 = car, 2 = bike). The name wins when both are present.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EntryRequest {
    #[serde(default)]
    pub vehicle_type: Option<ParkingType>,

    #[serde(default)]
    pub selection: Option<i32>,

    #[validate(length(min = 1, max = 10, message = "Registration must be 1-10 characters"))]
    pub vehicle_reg_number: String,
}

impl EntryRequest {
    /// Menu number for the requested category
    ///
    /// Returns 0 when neither field is set, which no category maps to.
    pub fn selection(&self) -> i32 {
        self.vehicle_type
            .map(|t| t.selection())
            .or(self.selection)
            .unwrap_or(0)
    }

    pub fn to_input(&self) -> StaticInput {
        StaticInput::entry(self.selection(), self.vehicle_reg_number.clone())
    }
}

/// Vehicle exit request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExitRequest {
    #[validate(length(min = 1, max = 10, message = "Registration must be 1-10 characters"))]
    pub vehicle_reg_number: String,
}

impl ExitRequest {
    pub fn to_input(&self) -> StaticInput {
        StaticInput::exit(self.vehicle_reg_number.clone())
    }
}
