//! Parking ticket model
//!
//! A ticket records one stay of one vehicle, from entry to exit. Tickets are
//! never deleted: closed tickets form the history used for loyalty lookups.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ParkingSpot;

/// Ticket entity
///
/// Lifecycle:
/// 1. Opened at entry with `price = 0` and no `out_time`
/// 2. Closed at exit, when `out_time` and `price` are written once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// Identifier assigned by the store (0 until saved)
    pub id: i32,

    /// Spot snapshot taken when the ticket was opened
    pub parking_spot: ParkingSpot,

    /// Vehicle registration (case-sensitive)
    pub vehicle_reg_number: String,

    /// Fare in whole cents, zero while the vehicle is parked
    pub price: Decimal,

    /// Entry timestamp
    pub in_time: DateTime<Utc>,

    /// Exit timestamp, `None` while the vehicle is parked
    pub out_time: Option<DateTime<Utc>>,
}

impl Ticket {
    /// Open a new ticket for a vehicle entering at `in_time`
    pub fn new(
        parking_spot: ParkingSpot,
        vehicle_reg_number: impl Into<String>,
        in_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            parking_spot: parking_spot.with_availability(false),
            vehicle_reg_number: vehicle_reg_number.into(),
            price: Decimal::ZERO,
            in_time,
            out_time: None,
        }
    }

    /// Check if the vehicle is still parked
    #[inline]
    pub fn is_open(&self) -> bool {
        self.out_time.is_none()
    }

    /// Time spent in the facility, once the ticket is closed
    pub fn duration(&self) -> Option<Duration> {
        self.out_time.map(|out| out - self.in_time)
    }
}
