//! Parking lifecycle service
//!
//! Drives a vehicle through the facility:
//! - Entry: pick a free spot, claim it, open a ticket
//! - Exit: close the open ticket, price the stay, free the spot
//!
//! Store failures never escape as errors: they are logged and reported as
//! `Failed` outcomes, with the transition stopped before any later step.
//! Fare errors (`InvalidDuration`, `UnknownVehicleType`) are returned as
//! hard errors and nothing is persisted for the exit.

use chrono::{DateTime, Utc};
use parkit_core::{
    models::{ParkingSpot, ParkingType, Ticket},
    traits::{InputReader, SpotRepository, TicketRepository},
    AppResult,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::allocator::SpotAllocator;
use crate::clock::{Clock, SystemClock};
use crate::fare::FareCalculator;

/// Claims tried per entry before giving up on a contended category
const CLAIM_ATTEMPTS: usize = 2;

/// Proof of a successful entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParkingReceipt {
    pub ticket_id: i32,
    pub spot_id: i32,
    pub parking_type: ParkingType,
    pub vehicle_reg_number: String,
    pub in_time: DateTime<Utc>,
    /// The vehicle has stayed before and will get the loyalty discount
    pub recurring: bool,
}

/// Proof of a successful exit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExitReceipt {
    pub ticket_id: i32,
    pub spot_id: i32,
    pub parking_type: ParkingType,
    pub vehicle_reg_number: String,
    pub in_time: DateTime<Utc>,
    pub out_time: DateTime<Utc>,
    pub duration_minutes: i64,
    /// Fare in whole cents
    pub price: Decimal,
    pub discounted: bool,
    /// False when the fare was recorded but the spot could not be freed
    pub spot_released: bool,
}

/// Result of a vehicle entry
#[derive(Debug, Clone, PartialEq)]
pub enum EntryOutcome {
    Parked(ParkingReceipt),
    /// Vehicle type selection missing or unsupported; nothing was looked up
    InvalidSelection,
    /// No free spot of the requested type
    ParkingFull(ParkingType),
    InvalidRegistration,
    /// Other entries kept taking the allocated spot, even after a retry
    SpotTaken(i32),
    /// A store operation failed; no spot is left claimed without a ticket
    Failed(String),
}

/// Result of a vehicle exit
#[derive(Debug, Clone, PartialEq)]
pub enum ExitOutcome {
    Exited(ExitReceipt),
    InvalidRegistration,
    /// The registration has no ticket without an exit time
    NoOpenTicket(String),
    /// A store operation failed; the spot is still marked taken
    Failed(String),
}

impl fmt::Display for EntryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryOutcome::Parked(r) => write!(
                f,
                "Please park your vehicle in spot number {}. In time for vehicle {} is {}",
                r.spot_id, r.vehicle_reg_number, r.in_time
            ),
            EntryOutcome::InvalidSelection => write!(f, "Entered input is invalid"),
            EntryOutcome::ParkingFull(t) => {
                write!(f, "No {} spot available. Parking slots might be full", t)
            }
            EntryOutcome::InvalidRegistration => write!(f, "Vehicle registration is invalid"),
            EntryOutcome::SpotTaken(id) => {
                write!(f, "Spot {} was just taken by another vehicle, please try again", id)
            }
            EntryOutcome::Failed(reason) => write!(f, "Unable to process incoming vehicle: {}", reason),
        }
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitOutcome::Exited(r) => write!(
                f,
                "Please pay the parking fare: {}. Out time for vehicle {} is {}",
                r.price, r.vehicle_reg_number, r.out_time
            ),
            ExitOutcome::InvalidRegistration => write!(f, "Vehicle registration is invalid"),
            ExitOutcome::NoOpenTicket(reg) => write!(f, "No vehicle {} is currently parked", reg),
            ExitOutcome::Failed(reason) => {
                write!(f, "Unable to update ticket information: {}", reason)
            }
        }
    }
}

/// Parking lifecycle coordinator
pub struct ParkingService<S: SpotRepository, T: TicketRepository> {
    spot_repo: Arc<S>,
    ticket_repo: Arc<T>,
    allocator: SpotAllocator<S>,
    fare: FareCalculator,
    clock: Arc<dyn Clock>,
}

impl<S: SpotRepository, T: TicketRepository> ParkingService<S, T> {
    /// Create a new parking service using wall-clock time
    pub fn new(spot_repo: Arc<S>, ticket_repo: Arc<T>, fare: FareCalculator) -> Self {
        Self {
            allocator: SpotAllocator::new(Arc::clone(&spot_repo)),
            spot_repo,
            ticket_repo,
            fare,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn fare_calculator(&self) -> &FareCalculator {
        &self.fare
    }

    fn read_parking_type(input: &dyn InputReader) -> Option<ParkingType> {
        match input.read_selection() {
            Ok(selection) => {
                let parking_type = ParkingType::from_selection(selection);
                if parking_type.is_none() {
                    warn!("Unsupported vehicle type selection: {}", selection);
                }
                parking_type
            }
            Err(e) => {
                warn!("Unable to read vehicle type: {}", e);
                None
            }
        }
    }

    fn read_registration(input: &dyn InputReader) -> Option<String> {
        match input.read_vehicle_registration() {
            Ok(reg) if !reg.trim().is_empty() => Some(reg.trim().to_string()),
            Ok(_) => {
                warn!("Empty vehicle registration");
                None
            }
            Err(e) => {
                warn!("Unable to read vehicle registration: {}", e);
                None
            }
        }
    }

    /// Read the vehicle type and look up a free spot for it
    async fn allocate(&self, input: &dyn InputReader) -> Result<ParkingSpot, EntryOutcome> {
        let parking_type = Self::read_parking_type(input).ok_or(EntryOutcome::InvalidSelection)?;
        self.find_spot(parking_type).await
    }

    async fn find_spot(&self, parking_type: ParkingType) -> Result<ParkingSpot, EntryOutcome> {
        match self.allocator.find_available_spot(parking_type).await {
            Ok(Some(spot)) => Ok(spot),
            Ok(None) => Err(EntryOutcome::ParkingFull(parking_type)),
            Err(e) => {
                error!("Error fetching next available spot: {}", e);
                Err(EntryOutcome::Failed(e.to_string()))
            }
        }
    }

    /// Free spot for the vehicle type the input selects, without claiming it
    #[instrument(skip(self, input))]
    pub async fn get_next_parking_number_if_available(
        &self,
        input: &dyn InputReader,
    ) -> Option<ParkingSpot> {
        self.allocate(input).await.ok()
    }

    /// Put a claimed spot back after a later entry step failed
    async fn release_claim(&self, spot: &ParkingSpot) {
        match self.spot_repo.update(&spot.with_availability(true)).await {
            Ok(true) => info!("Released spot {} after failed entry", spot.id),
            Ok(false) => error!("Spot {} vanished while releasing it", spot.id),
            Err(e) => error!("Spot {} stays taken without a ticket: {}", spot.id, e),
        }
    }

    /// Claim the allocated spot, looking up a fresh one once if another
    /// entry got there first
    async fn claim_spot(&self, spot: ParkingSpot) -> Result<ParkingSpot, EntryOutcome> {
        let mut spot = spot;
        for attempt in 0..CLAIM_ATTEMPTS {
            if attempt > 0 {
                spot = self.find_spot(spot.parking_type).await?;
            }

            match self.spot_repo.claim(spot.id).await {
                Ok(true) => return Ok(spot),
                Ok(false) => warn!("Spot {} was claimed by another vehicle", spot.id),
                Err(e) => {
                    error!("Error updating parking info for spot {}: {}", spot.id, e);
                    return Err(EntryOutcome::Failed(e.to_string()));
                }
            }
        }

        Err(EntryOutcome::SpotTaken(spot.id))
    }

    /// Process a vehicle entering the facility
    ///
    /// Reads the vehicle type and registration from `input`, claims the
    /// lowest free spot of that type and opens a ticket for it.
    #[instrument(skip(self, input))]
    pub async fn process_incoming_vehicle(&self, input: &dyn InputReader) -> EntryOutcome {
        let spot = match self.allocate(input).await {
            Ok(spot) => spot,
            Err(outcome) => return outcome,
        };

        let Some(vehicle_reg_number) = Self::read_registration(input) else {
            return EntryOutcome::InvalidRegistration;
        };

        let spot = match self.claim_spot(spot).await {
            Ok(spot) => spot,
            Err(outcome) => return outcome,
        };

        let previous_tickets = match self
            .ticket_repo
            .count_by_registration(&vehicle_reg_number)
            .await
        {
            Ok(count) => count,
            Err(e) => {
                error!("Error counting tickets for {}: {}", vehicle_reg_number, e);
                self.release_claim(&spot).await;
                return EntryOutcome::Failed(e.to_string());
            }
        };
        let recurring = previous_tickets > 0;

        let ticket = Ticket::new(spot.clone(), vehicle_reg_number, self.clock.now());
        let ticket = match self.ticket_repo.save(&ticket).await {
            Ok(saved) => saved,
            Err(e) => {
                error!("Error saving ticket: {}", e);
                self.release_claim(&spot).await;
                return EntryOutcome::Failed(e.to_string());
            }
        };

        if recurring {
            info!(
                "Vehicle {} is a recurring user and will get the loyalty discount",
                ticket.vehicle_reg_number
            );
        }
        info!(
            "Ticket {} opened for {} in spot {} at {}",
            ticket.id, ticket.vehicle_reg_number, spot.id, ticket.in_time
        );

        EntryOutcome::Parked(ParkingReceipt {
            ticket_id: ticket.id,
            spot_id: spot.id,
            parking_type: spot.parking_type,
            vehicle_reg_number: ticket.vehicle_reg_number,
            in_time: ticket.in_time,
            recurring,
        })
    }

    /// Process a vehicle leaving the facility
    ///
    /// Closes the vehicle's open ticket, prices the stay and frees the spot.
    /// The spot is only freed once the priced ticket has been persisted.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Fare` when the stay cannot be priced; nothing is
    /// persisted in that case.
    #[instrument(skip(self, input))]
    pub async fn process_exiting_vehicle(&self, input: &dyn InputReader) -> AppResult<ExitOutcome> {
        let Some(vehicle_reg_number) = Self::read_registration(input) else {
            return Ok(ExitOutcome::InvalidRegistration);
        };

        let mut ticket = match self
            .ticket_repo
            .find_open_by_registration(&vehicle_reg_number)
            .await
        {
            Ok(Some(ticket)) => ticket,
            Ok(None) => {
                warn!("No open ticket for vehicle {}", vehicle_reg_number);
                return Ok(ExitOutcome::NoOpenTicket(vehicle_reg_number));
            }
            Err(e) => {
                error!("Error fetching ticket for {}: {}", vehicle_reg_number, e);
                return Ok(ExitOutcome::Failed(e.to_string()));
            }
        };

        // The count includes the ticket being closed
        let tickets = match self
            .ticket_repo
            .count_by_registration(&vehicle_reg_number)
            .await
        {
            Ok(count) => count,
            Err(e) => {
                error!("Error counting tickets for {}: {}", vehicle_reg_number, e);
                return Ok(ExitOutcome::Failed(e.to_string()));
            }
        };
        let discounted = tickets > 1;

        ticket.out_time = Some(self.clock.now());
        self.fare.calculate_for_ticket(&mut ticket, discounted)?;

        match self.ticket_repo.update(&ticket).await {
            Ok(true) => {}
            Ok(false) => {
                error!("Ticket {} was not updated", ticket.id);
                return Ok(ExitOutcome::Failed(format!(
                    "ticket {} was not updated",
                    ticket.id
                )));
            }
            Err(e) => {
                error!("Error updating ticket {}: {}", ticket.id, e);
                return Ok(ExitOutcome::Failed(e.to_string()));
            }
        }

        let spot = ticket.parking_spot.with_availability(true);
        let spot_released = match self.spot_repo.update(&spot).await {
            Ok(true) => true,
            Ok(false) => {
                error!("Spot {} was not freed", spot.id);
                false
            }
            Err(e) => {
                error!(
                    "Error freeing spot {} after closing ticket {}: {}. \
                     The spot stays taken until release_orphaned_spots runs",
                    spot.id, ticket.id, e
                );
                false
            }
        };

        let out_time = ticket.out_time.unwrap_or(ticket.in_time);
        let duration_minutes = ticket.duration().map_or(0, |d| d.num_minutes());

        info!(
            "Ticket {} closed for {} after {} min: {}",
            ticket.id, vehicle_reg_number, duration_minutes, ticket.price
        );

        Ok(ExitOutcome::Exited(ExitReceipt {
            ticket_id: ticket.id,
            spot_id: spot.id,
            parking_type: spot.parking_type,
            vehicle_reg_number,
            in_time: ticket.in_time,
            out_time,
            duration_minutes,
            price: ticket.price,
            discounted,
            spot_released,
        }))
    }

    /// Free every taken spot that no open ticket references
    ///
    /// Repairs spots left taken when an exit closed its ticket but could not
    /// free the spot. Meant for startup, before entries are accepted: a spot
    /// claimed by an entry whose ticket is not saved yet looks orphaned too.
    #[instrument(skip(self))]
    pub async fn release_orphaned_spots(&self) -> AppResult<Vec<i32>> {
        let mut released = Vec::new();

        for spot in self.spot_repo.list_all().await? {
            if spot.available || self.ticket_repo.exists_open_for_spot(spot.id).await? {
                continue;
            }

            if self.spot_repo.update(&spot.with_availability(true)).await? {
                info!("Released orphaned spot {}", spot.id);
                released.push(spot.id);
            }
        }

        if !released.is_empty() {
            warn!("Released {} spot(s) with no open ticket", released.len());
        }

        Ok(released)
    }

    /// Next free spot of a type, without claiming it
    pub async fn next_available_spot(
        &self,
        parking_type: ParkingType,
    ) -> AppResult<Option<ParkingSpot>> {
        self.allocator.find_available_spot(parking_type).await
    }

    /// Every spot in the facility
    pub async fn list_spots(&self) -> AppResult<Vec<ParkingSpot>> {
        self.spot_repo.list_all().await
    }

    /// Ticket history of a vehicle, newest first
    pub async fn ticket_history(&self, vehicle_reg_number: &str) -> AppResult<Vec<Ticket>> {
        self.ticket_repo.find_by_registration(vehicle_reg_number).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::input::StaticInput;
    use async_trait::async_trait;
    use chrono::Duration;
    use parkit_core::{AppError, FareError};
    use parking_lot::Mutex;
    use rust_decimal_macros::dec;

    /// Spot store recording every call, with scripted answers
    #[derive(Default)]
    struct MockSpotRepository {
        next: Option<i32>,
        claim_result: Option<bool>,
        /// Claims answered as lost before `claim_result` applies
        lost_claims: Mutex<usize>,
        update_fails: bool,
        listed: Vec<ParkingSpot>,
        lookups: Mutex<usize>,
        claims: Mutex<Vec<i32>>,
        updates: Mutex<Vec<ParkingSpot>>,
    }

    impl MockSpotRepository {
        fn with_free_spot(id: i32) -> Self {
            Self {
                next: Some(id),
                claim_result: Some(true),
                ..Default::default()
            }
        }

        fn mutations(&self) -> usize {
            self.claims.lock().len() + self.updates.lock().len()
        }
    }

    #[async_trait]
    impl SpotRepository for MockSpotRepository {
        async fn find_next_available(&self, _parking_type: ParkingType) -> AppResult<Option<i32>> {
            *self.lookups.lock() += 1;
            Ok(self.next)
        }

        async fn find_by_id(&self, _id: i32) -> AppResult<Option<ParkingSpot>> {
            Ok(None)
        }

        async fn update(&self, spot: &ParkingSpot) -> AppResult<bool> {
            self.updates.lock().push(spot.clone());
            if self.update_fails {
                return Err(AppError::Database("connection reset".to_string()));
            }
            Ok(true)
        }

        async fn claim(&self, id: i32) -> AppResult<bool> {
            self.claims.lock().push(id);
            let mut lost = self.lost_claims.lock();
            if *lost > 0 {
                *lost -= 1;
                return Ok(false);
            }
            match self.claim_result {
                Some(claimed) => Ok(claimed),
                None => Err(AppError::Database("connection reset".to_string())),
            }
        }

        async fn list_all(&self) -> AppResult<Vec<ParkingSpot>> {
            Ok(self.listed.clone())
        }
    }

    /// Ticket store recording every call, with scripted answers
    #[derive(Default)]
    struct MockTicketRepository {
        open: Option<Ticket>,
        count: i64,
        save_fails: bool,
        update_result: Option<bool>,
        open_spots: Vec<i32>,
        saved: Mutex<Vec<Ticket>>,
        updated: Mutex<Vec<Ticket>>,
        counts: Mutex<usize>,
    }

    #[async_trait]
    impl TicketRepository for MockTicketRepository {
        async fn save(&self, ticket: &Ticket) -> AppResult<Ticket> {
            self.saved.lock().push(ticket.clone());
            if self.save_fails {
                return Err(AppError::Database("disk full".to_string()));
            }
            Ok(Ticket {
                id: 1,
                ..ticket.clone()
            })
        }

        async fn find_open_by_registration(&self, _reg: &str) -> AppResult<Option<Ticket>> {
            Ok(self.open.clone())
        }

        async fn update(&self, ticket: &Ticket) -> AppResult<bool> {
            self.updated.lock().push(ticket.clone());
            match self.update_result {
                Some(updated) => Ok(updated),
                None => Err(AppError::Database("deadlock detected".to_string())),
            }
        }

        async fn exists_open_for_spot(&self, spot_id: i32) -> AppResult<bool> {
            Ok(self.open_spots.contains(&spot_id))
        }

        async fn count_by_registration(&self, _reg: &str) -> AppResult<i64> {
            *self.counts.lock() += 1;
            Ok(self.count)
        }

        async fn find_by_registration(&self, _reg: &str) -> AppResult<Vec<Ticket>> {
            Ok(vec![])
        }
    }

    fn service(
        spots: MockSpotRepository,
        tickets: MockTicketRepository,
    ) -> (
        ParkingService<MockSpotRepository, MockTicketRepository>,
        Arc<MockSpotRepository>,
        Arc<MockTicketRepository>,
        Arc<ManualClock>,
    ) {
        let spots = Arc::new(spots);
        let tickets = Arc::new(tickets);
        let clock = Arc::new(ManualClock::default());
        let service = ParkingService::new(spots.clone(), tickets.clone(), FareCalculator::default())
            .with_clock(clock.clone());
        (service, spots, tickets, clock)
    }

    fn parked_ticket(clock: &ManualClock, stay: Duration) -> Ticket {
        Ticket {
            id: 1,
            ..Ticket::new(
                ParkingSpot::new(1, ParkingType::Car, false),
                "ABCDEF",
                clock.now() - stay,
            )
        }
    }

    #[tokio::test]
    async fn test_incoming_vehicle_claims_spot_and_opens_ticket() {
        let (service, spots, tickets, clock) =
            service(MockSpotRepository::with_free_spot(1), MockTicketRepository::default());

        let outcome = service
            .process_incoming_vehicle(&StaticInput::entry(1, "ABCDEF"))
            .await;

        let EntryOutcome::Parked(receipt) = outcome else {
            panic!("expected a parked vehicle, got {:?}", outcome);
        };
        assert_eq!(receipt.spot_id, 1);
        assert_eq!(receipt.parking_type, ParkingType::Car);
        assert_eq!(receipt.in_time, clock.now());
        assert!(!receipt.recurring);

        assert_eq!(*spots.claims.lock(), vec![1]);
        assert_eq!(*tickets.counts.lock(), 1);
        let saved = tickets.saved.lock();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].price, Decimal::ZERO);
        assert!(saved[0].is_open());
        assert_eq!(saved[0].vehicle_reg_number, "ABCDEF");
    }

    #[tokio::test]
    async fn test_incoming_recurring_vehicle_is_flagged() {
        let tickets = MockTicketRepository {
            count: 2,
            ..Default::default()
        };
        let (service, _, tickets, _) = service(MockSpotRepository::with_free_spot(1), tickets);

        let outcome = service
            .process_incoming_vehicle(&StaticInput::entry(1, "ABCDEF"))
            .await;

        assert!(matches!(outcome, EntryOutcome::Parked(ParkingReceipt { recurring: true, .. })));
        assert_eq!(tickets.saved.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_incoming_vehicle_when_full_mutates_nothing() {
        let (service, spots, tickets, _) =
            service(MockSpotRepository::default(), MockTicketRepository::default());

        let outcome = service
            .process_incoming_vehicle(&StaticInput::entry(1, "ABCDEF"))
            .await;

        assert_eq!(outcome, EntryOutcome::ParkingFull(ParkingType::Car));
        assert_eq!(*spots.lookups.lock(), 1);
        assert_eq!(spots.mutations(), 0);
        assert!(tickets.saved.lock().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_selection_skips_lookup() {
        let (service, spots, tickets, _) =
            service(MockSpotRepository::with_free_spot(1), MockTicketRepository::default());

        let outcome = service
            .process_incoming_vehicle(&StaticInput::entry(3, "ABCDEF"))
            .await;

        assert_eq!(outcome, EntryOutcome::InvalidSelection);
        assert_eq!(*spots.lookups.lock(), 0);
        assert_eq!(spots.mutations(), 0);
        assert!(tickets.saved.lock().is_empty());
    }

    #[tokio::test]
    async fn test_missing_registration_aborts_entry() {
        let (service, spots, tickets, _) =
            service(MockSpotRepository::with_free_spot(1), MockTicketRepository::default());

        let outcome = service
            .process_incoming_vehicle(&StaticInput::entry(1, "   "))
            .await;

        assert_eq!(outcome, EntryOutcome::InvalidRegistration);
        assert_eq!(spots.mutations(), 0);
        assert!(tickets.saved.lock().is_empty());
    }

    #[tokio::test]
    async fn test_lost_claim_is_retried_once() {
        // Another entry took the spot between lookup and claim
        let spots = MockSpotRepository {
            lost_claims: Mutex::new(1),
            ..MockSpotRepository::with_free_spot(1)
        };
        let (service, spots, tickets, _) = service(spots, MockTicketRepository::default());

        let outcome = service
            .process_incoming_vehicle(&StaticInput::entry(1, "ABCDEF"))
            .await;

        assert!(matches!(outcome, EntryOutcome::Parked(_)));
        assert_eq!(*spots.lookups.lock(), 2);
        assert_eq!(*spots.claims.lock(), vec![1, 1]);
        assert_eq!(tickets.saved.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_contended_spot_aborts_entry_without_ticket() {
        let spots = MockSpotRepository {
            next: Some(1),
            claim_result: Some(false),
            ..Default::default()
        };
        let (service, spots, tickets, _) = service(spots, MockTicketRepository::default());

        let outcome = service
            .process_incoming_vehicle(&StaticInput::entry(1, "ABCDEF"))
            .await;

        assert_eq!(outcome, EntryOutcome::SpotTaken(1));
        assert_eq!(spots.claims.lock().len(), 2);
        assert!(spots.updates.lock().is_empty());
        assert!(tickets.saved.lock().is_empty());
    }

    #[tokio::test]
    async fn test_failed_ticket_save_releases_spot() {
        let tickets = MockTicketRepository {
            save_fails: true,
            ..Default::default()
        };
        let (service, spots, _, _) = service(MockSpotRepository::with_free_spot(2), tickets);

        let outcome = service
            .process_incoming_vehicle(&StaticInput::entry(1, "ABCDEF"))
            .await;

        assert!(matches!(outcome, EntryOutcome::Failed(_)));
        let updates = spots.updates.lock();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].id, 2);
        assert!(updates[0].available);
    }

    #[tokio::test]
    async fn test_get_next_parking_number_if_available() {
        let (service, spots, _, _) =
            service(MockSpotRepository::with_free_spot(1), MockTicketRepository::default());

        let spot = service
            .get_next_parking_number_if_available(&StaticInput::selection(1))
            .await
            .unwrap();

        assert_eq!(spot.id, 1);
        assert!(spot.available);
        assert_eq!(spot.parking_type, ParkingType::Car);
        assert_eq!(spots.mutations(), 0);
    }

    #[tokio::test]
    async fn test_get_next_parking_number_not_found() {
        let (service, spots, _, _) =
            service(MockSpotRepository::default(), MockTicketRepository::default());

        assert!(service
            .get_next_parking_number_if_available(&StaticInput::selection(1))
            .await
            .is_none());
        assert_eq!(*spots.lookups.lock(), 1);
    }

    #[tokio::test]
    async fn test_get_next_parking_number_wrong_selection() {
        let (service, spots, _, _) =
            service(MockSpotRepository::with_free_spot(1), MockTicketRepository::default());

        assert!(service
            .get_next_parking_number_if_available(&StaticInput::selection(3))
            .await
            .is_none());
        assert_eq!(*spots.lookups.lock(), 0);
    }

    #[tokio::test]
    async fn test_exiting_vehicle_prices_stay_and_frees_spot() {
        let clock = ManualClock::default();
        let tickets = MockTicketRepository {
            open: Some(parked_ticket(&clock, Duration::hours(1))),
            count: 1,
            update_result: Some(true),
            ..Default::default()
        };
        let (service, spots, tickets, svc_clock) = service(MockSpotRepository::default(), tickets);
        svc_clock.set(clock.now());

        let outcome = service
            .process_exiting_vehicle(&StaticInput::exit("ABCDEF"))
            .await
            .unwrap();

        let ExitOutcome::Exited(receipt) = outcome else {
            panic!("expected an exit, got {:?}", outcome);
        };
        assert_eq!(receipt.price, dec!(150));
        assert_eq!(receipt.duration_minutes, 60);
        assert!(!receipt.discounted);
        assert!(receipt.spot_released);

        assert_eq!(*tickets.counts.lock(), 1);
        let updated = tickets.updated.lock();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].price, dec!(150));
        assert_eq!(updated[0].out_time, Some(clock.now()));

        let spot_updates = spots.updates.lock();
        assert_eq!(spot_updates.len(), 1);
        assert!(spot_updates[0].available);
    }

    #[tokio::test]
    async fn test_exit_discount_counts_the_closing_ticket() {
        // Two tickets on record: the one being closed plus one earlier stay
        let clock = ManualClock::default();
        let tickets = MockTicketRepository {
            open: Some(parked_ticket(&clock, Duration::hours(1))),
            count: 2,
            update_result: Some(true),
            ..Default::default()
        };
        let (service, _, _, svc_clock) = service(MockSpotRepository::default(), tickets);
        svc_clock.set(clock.now());

        let outcome = service
            .process_exiting_vehicle(&StaticInput::exit("ABCDEF"))
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            ExitOutcome::Exited(ExitReceipt { discounted: true, .. })
        ));
        if let ExitOutcome::Exited(receipt) = outcome {
            assert_eq!(receipt.price, dec!(143));
        }
    }

    #[tokio::test]
    async fn test_exit_first_stay_only_ticket_gets_no_discount() {
        let clock = ManualClock::default();
        let tickets = MockTicketRepository {
            open: Some(parked_ticket(&clock, Duration::hours(1))),
            count: 1,
            update_result: Some(true),
            ..Default::default()
        };
        let (service, _, _, svc_clock) = service(MockSpotRepository::default(), tickets);
        svc_clock.set(clock.now());

        let outcome = service
            .process_exiting_vehicle(&StaticInput::exit("ABCDEF"))
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            ExitOutcome::Exited(ExitReceipt { discounted: false, .. })
        ));
    }

    #[tokio::test]
    async fn test_exit_unable_to_update_ticket_keeps_spot_taken() {
        let clock = ManualClock::default();
        let tickets = MockTicketRepository {
            open: Some(parked_ticket(&clock, Duration::hours(1))),
            count: 1,
            update_result: Some(false),
            ..Default::default()
        };
        let (service, spots, tickets, svc_clock) = service(MockSpotRepository::default(), tickets);
        svc_clock.set(clock.now());

        let outcome = service
            .process_exiting_vehicle(&StaticInput::exit("ABCDEF"))
            .await
            .unwrap();

        assert!(matches!(outcome, ExitOutcome::Failed(_)));
        assert_eq!(tickets.updated.lock().len(), 1);
        assert!(spots.updates.lock().is_empty());
    }

    #[tokio::test]
    async fn test_exit_ticket_store_error_keeps_spot_taken() {
        let clock = ManualClock::default();
        let tickets = MockTicketRepository {
            open: Some(parked_ticket(&clock, Duration::hours(1))),
            count: 1,
            update_result: None,
            ..Default::default()
        };
        let (service, spots, _, svc_clock) = service(MockSpotRepository::default(), tickets);
        svc_clock.set(clock.now());

        let outcome = service
            .process_exiting_vehicle(&StaticInput::exit("ABCDEF"))
            .await
            .unwrap();

        assert!(matches!(outcome, ExitOutcome::Failed(_)));
        assert!(spots.updates.lock().is_empty());
    }

    #[tokio::test]
    async fn test_exit_spot_release_failure_is_reported() {
        let clock = ManualClock::default();
        let tickets = MockTicketRepository {
            open: Some(parked_ticket(&clock, Duration::hours(1))),
            count: 1,
            update_result: Some(true),
            ..Default::default()
        };
        let spots = MockSpotRepository {
            update_fails: true,
            ..Default::default()
        };
        let (service, _, _, svc_clock) = service(spots, tickets);
        svc_clock.set(clock.now());

        let outcome = service
            .process_exiting_vehicle(&StaticInput::exit("ABCDEF"))
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            ExitOutcome::Exited(ExitReceipt { spot_released: false, .. })
        ));
    }

    #[tokio::test]
    async fn test_exit_without_open_ticket_is_a_no_op() {
        let (service, spots, tickets, _) =
            service(MockSpotRepository::default(), MockTicketRepository::default());

        let outcome = service
            .process_exiting_vehicle(&StaticInput::exit("ABCDEF"))
            .await
            .unwrap();

        assert_eq!(outcome, ExitOutcome::NoOpenTicket("ABCDEF".to_string()));
        assert!(tickets.updated.lock().is_empty());
        assert!(spots.updates.lock().is_empty());
    }

    #[tokio::test]
    async fn test_exit_before_entry_is_a_hard_error() {
        // Ticket entered in the future relative to the service clock
        let clock = ManualClock::default();
        let mut ticket = parked_ticket(&clock, Duration::zero());
        ticket.in_time = clock.now() + Duration::minutes(10);
        let tickets = MockTicketRepository {
            open: Some(ticket),
            count: 1,
            update_result: Some(true),
            ..Default::default()
        };
        let (service, spots, tickets, svc_clock) = service(MockSpotRepository::default(), tickets);
        svc_clock.set(clock.now());

        let result = service
            .process_exiting_vehicle(&StaticInput::exit("ABCDEF"))
            .await;

        assert!(matches!(
            result,
            Err(AppError::Fare(FareError::InvalidDuration(_)))
        ));
        assert!(tickets.updated.lock().is_empty());
        assert!(spots.updates.lock().is_empty());
    }

    #[tokio::test]
    async fn test_release_orphaned_spots_skips_spots_with_open_tickets() {
        let spots = MockSpotRepository {
            listed: vec![
                ParkingSpot::new(1, ParkingType::Car, false),
                ParkingSpot::new(2, ParkingType::Car, false),
                ParkingSpot::new(3, ParkingType::Bike, true),
            ],
            ..Default::default()
        };
        let tickets = MockTicketRepository {
            open_spots: vec![2],
            ..Default::default()
        };
        let (service, spots, _, _) = service(spots, tickets);

        let released = service.release_orphaned_spots().await.unwrap();

        assert_eq!(released, vec![1]);
        let updates = spots.updates.lock();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].id, 1);
        assert!(updates[0].available);
    }

    #[tokio::test]
    async fn test_release_orphaned_spots_propagates_store_errors() {
        let spots = MockSpotRepository {
            listed: vec![ParkingSpot::new(1, ParkingType::Car, false)],
            update_fails: true,
            ..Default::default()
        };
        let (service, _, _, _) = service(spots, MockTicketRepository::default());

        assert!(matches!(
            service.release_orphaned_spots().await,
            Err(AppError::Database(_))
        ));
    }

    #[tokio::test]
    async fn test_outcome_messages() {
        assert_eq!(EntryOutcome::InvalidSelection.to_string(), "Entered input is invalid");
        assert!(EntryOutcome::ParkingFull(ParkingType::Bike)
            .to_string()
            .contains("BIKE"));
        assert!(ExitOutcome::NoOpenTicket("ABCDEF".to_string())
            .to_string()
            .contains("ABCDEF"));
        assert!(EntryOutcome::SpotTaken(4).to_string().contains("Spot 4"));
    }
}
