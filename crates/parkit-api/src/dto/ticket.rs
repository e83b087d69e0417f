//! Ticket DTOs

use chrono::{DateTime, Utc};
use parkit_core::models::{ParkingType, Ticket};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Ticket as exposed over HTTP
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketResponse {
    pub id: i32,
    pub parking_number: i32,
    pub parking_type: ParkingType,
    pub vehicle_reg_number: String,
    /// Fare in whole cents
    pub price: Decimal,
    pub in_time: DateTime<Utc>,
    pub out_time: Option<DateTime<Utc>>,
}

impl From<Ticket> for TicketResponse {
    fn from(ticket: Ticket) -> Self {
        Self {
            id: ticket.id,
            parking_number: ticket.parking_spot.id,
            parking_type: ticket.parking_spot.parking_type,
            vehicle_reg_number: ticket.vehicle_reg_number,
            price: ticket.price,
            in_time: ticket.in_time,
            out_time: ticket.out_time,
        }
    }
}

/// Query for `GET /tickets`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TicketHistoryQuery {
    #[validate(length(min = 1, max = 10, message = "Registration must be 1-10 characters"))]
    pub vehicle_reg_number: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkit_core::models::ParkingSpot;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ticket_response_from_ticket() {
        let in_time = Utc::now();
        let mut ticket = Ticket::new(ParkingSpot::new(4, ParkingType::Bike, true), "BIKE01", in_time);
        ticket.id = 7;
        ticket.price = dec!(95);

        let resp = TicketResponse::from(ticket);
        assert_eq!(resp.id, 7);
        assert_eq!(resp.parking_number, 4);
        assert_eq!(resp.parking_type, ParkingType::Bike);
        assert_eq!(resp.price, dec!(95));
        assert!(resp.out_time.is_none());
    }
}
