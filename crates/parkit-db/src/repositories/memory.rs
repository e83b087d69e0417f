//! In-memory repository implementations
//!
//! Process-local stores with the same semantics as the PostgreSQL
//! repositories. Used by the console front end when no database is
//! configured and by tests. Writes can be made to fail on demand.

use async_trait::async_trait;
use parkit_core::{
    models::{ParkingSpot, ParkingType, Ticket},
    traits::{SpotRepository, TicketRepository},
    AppError, AppResult,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

fn injected_failure(what: &str) -> AppError {
    AppError::Database(format!("Failed to {}: store unavailable", what))
}

/// In-memory implementation of SpotRepository
#[derive(Default)]
pub struct InMemorySpotRepository {
    spots: RwLock<BTreeMap<i32, ParkingSpot>>,
    fail_writes: AtomicBool,
}

impl InMemorySpotRepository {
    /// Create a store holding the given spots
    pub fn new(spots: impl IntoIterator<Item = ParkingSpot>) -> Self {
        Self {
            spots: RwLock::new(spots.into_iter().map(|s| (s.id, s)).collect()),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Seed a facility with all spots free: cars first, then bikes
    pub fn with_layout(car_spots: i32, bike_spots: i32) -> Self {
        let cars = (1..=car_spots).map(|id| ParkingSpot::new(id, ParkingType::Car, true));
        let bikes = (car_spots + 1..=car_spots + bike_spots)
            .map(|id| ParkingSpot::new(id, ParkingType::Bike, true));

        Self::new(cars.chain(bikes))
    }

    /// Make every subsequent write fail (or succeed again)
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn writes_failing(&self) -> bool {
        self.fail_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpotRepository for InMemorySpotRepository {
    #[instrument(skip(self))]
    async fn find_next_available(&self, parking_type: ParkingType) -> AppResult<Option<i32>> {
        let spots = self.spots.read().await;

        Ok(spots
            .values()
            .find(|s| s.available && s.parking_type == parking_type)
            .map(|s| s.id))
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<ParkingSpot>> {
        Ok(self.spots.read().await.get(&id).cloned())
    }

    #[instrument(skip(self, spot), fields(spot_id = spot.id))]
    async fn update(&self, spot: &ParkingSpot) -> AppResult<bool> {
        if self.writes_failing() {
            return Err(injected_failure("update spot"));
        }

        let mut spots = self.spots.write().await;
        match spots.get_mut(&spot.id) {
            Some(stored) => {
                debug!("Setting spot {} available={}", spot.id, spot.available);
                stored.available = spot.available;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    #[instrument(skip(self))]
    async fn claim(&self, id: i32) -> AppResult<bool> {
        if self.writes_failing() {
            return Err(injected_failure("claim spot"));
        }

        let mut spots = self.spots.write().await;
        match spots.get_mut(&id) {
            Some(stored) if stored.available => {
                stored.available = false;
                Ok(true)
            }
            _ => {
                warn!("Spot {} was already taken", id);
                Ok(false)
            }
        }
    }

    async fn list_all(&self) -> AppResult<Vec<ParkingSpot>> {
        Ok(self.spots.read().await.values().cloned().collect())
    }
}

/// In-memory implementation of TicketRepository
///
/// Ids are assigned sequentially starting at 1.
#[derive(Default)]
pub struct InMemoryTicketRepository {
    tickets: RwLock<Vec<Ticket>>,
    fail_writes: AtomicBool,
}

impl InMemoryTicketRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail (or succeed again)
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn writes_failing(&self) -> bool {
        self.fail_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TicketRepository for InMemoryTicketRepository {
    #[instrument(skip(self, ticket), fields(vehicle = %ticket.vehicle_reg_number))]
    async fn save(&self, ticket: &Ticket) -> AppResult<Ticket> {
        if self.writes_failing() {
            return Err(injected_failure("save ticket"));
        }

        let mut tickets = self.tickets.write().await;
        let stored = Ticket {
            id: tickets.len() as i32 + 1,
            ..ticket.clone()
        };
        tickets.push(stored.clone());

        Ok(stored)
    }

    async fn find_open_by_registration(&self, vehicle_reg_number: &str) -> AppResult<Option<Ticket>> {
        let tickets = self.tickets.read().await;

        Ok(tickets
            .iter()
            .filter(|t| t.vehicle_reg_number == vehicle_reg_number && t.is_open())
            .max_by_key(|t| (t.in_time, t.id))
            .cloned())
    }

    #[instrument(skip(self, ticket), fields(ticket_id = ticket.id))]
    async fn update(&self, ticket: &Ticket) -> AppResult<bool> {
        if self.writes_failing() {
            return Err(injected_failure("update ticket"));
        }

        let out_time = ticket.out_time.ok_or_else(|| {
            AppError::InvalidInput(format!("Ticket {} has no exit time", ticket.id))
        })?;

        let mut tickets = self.tickets.write().await;
        match tickets.iter_mut().find(|t| t.id == ticket.id) {
            Some(stored) if stored.is_open() => {
                stored.price = ticket.price;
                stored.out_time = Some(out_time);
                Ok(true)
            }
            Some(_) => {
                warn!("Ticket {} is already closed", ticket.id);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    async fn exists_open_for_spot(&self, spot_id: i32) -> AppResult<bool> {
        let tickets = self.tickets.read().await;

        Ok(tickets
            .iter()
            .any(|t| t.parking_spot.id == spot_id && t.is_open()))
    }

    async fn count_by_registration(&self, vehicle_reg_number: &str) -> AppResult<i64> {
        let tickets = self.tickets.read().await;

        Ok(tickets
            .iter()
            .filter(|t| t.vehicle_reg_number == vehicle_reg_number)
            .count() as i64)
    }

    async fn find_by_registration(&self, vehicle_reg_number: &str) -> AppResult<Vec<Ticket>> {
        let tickets = self.tickets.read().await;

        let mut history: Vec<Ticket> = tickets
            .iter()
            .filter(|t| t.vehicle_reg_number == vehicle_reg_number)
            .cloned()
            .collect();
        history.sort_by(|a, b| (b.in_time, b.id).cmp(&(a.in_time, a.id)));

        Ok(history)
    }
}
