//! Spot DTOs

use parkit_core::models::{ParkingSpot, ParkingType};
use serde::{Deserialize, Serialize};

/// Spot as exposed over HTTP
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpotResponse {
    pub parking_number: i32,
    pub parking_type: ParkingType,
    pub available: bool,
}

impl From<ParkingSpot> for SpotResponse {
    fn from(spot: ParkingSpot) -> Self {
        Self {
            parking_number: spot.id,
            parking_type: spot.parking_type,
            available: spot.available,
        }
    }
}

/// Query for `GET /spots/available`
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    /// Category name, case-insensitive
    #[serde(rename = "type")]
    pub parking_type: String,
}

impl AvailabilityQuery {
    pub fn parking_type(&self) -> Option<ParkingType> {
        ParkingType::from_str(&self.parking_type)
    }
}
