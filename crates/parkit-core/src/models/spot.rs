//! Parking spot model
//!
//! A spot is a physical location in the facility. Its category is fixed at
//! creation; only the availability flag changes as vehicles come and go.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Vehicle category a spot is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParkingType {
    Car,
    Bike,
}

impl fmt::Display for ParkingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParkingType::Car => write!(f, "CAR"),
            ParkingType::Bike => write!(f, "BIKE"),
        }
    }
}

impl ParkingType {
    /// Every supported category, in menu order
    pub const ALL: [ParkingType; 2] = [ParkingType::Car, ParkingType::Bike];

    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "CAR" => Some(ParkingType::Car),
            "BIKE" => Some(ParkingType::Bike),
            _ => None,
        }
    }

    /// Map a menu selection (1 = CAR, 2 = BIKE) to a category
    pub fn from_selection(selection: i32) -> Option<Self> {
        match selection {
            1 => Some(ParkingType::Car),
            2 => Some(ParkingType::Bike),
            _ => None,
        }
    }

    /// Menu selection number for this category
    pub fn selection(&self) -> i32 {
        match self {
            ParkingType::Car => 1,
            ParkingType::Bike => 2,
        }
    }
}

/// Parking spot entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingSpot {
    /// Spot number, unique and stable
    pub id: i32,

    /// Category the spot accepts
    pub parking_type: ParkingType,

    /// Whether the spot is currently free
    pub available: bool,
}

impl ParkingSpot {
    pub fn new(id: i32, parking_type: ParkingType, available: bool) -> Self {
        Self {
            id,
            parking_type,
            available,
        }
    }

    /// Copy of this spot with the availability flag flipped to `available`
    pub fn with_availability(&self, available: bool) -> Self {
        Self {
            available,
            ..self.clone()
        }
    }
}
