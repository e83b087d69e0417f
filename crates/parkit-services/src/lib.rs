//! Business logic services for ParkIt
//!
//! This crate contains the services that drive a vehicle through the
//! facility: fare computation, spot allocation and the entry/exit lifecycle.
//!
//! # Architecture
//!
//! - Services own their dependencies (stores, fare schedule, clock)
//! - Stores are injected as `Arc`s implementing the parkit-core traits
//! - All operations are instrumented with tracing
//! - Store failures are logged and turned into caller-visible outcomes;
//!   fare errors are returned as hard errors
//!
//! # Services
//!
//! - `FareCalculator` - Duration-based pricing with grace period and loyalty discount
//! - `SpotAllocator` - Lowest-numbered free spot lookup
//! - `ParkingService` - Entry and exit lifecycle coordination

pub mod allocator;
pub mod clock;
pub mod fare;
pub mod input;
pub mod parking_service;

pub use allocator::SpotAllocator;
pub use clock::{Clock, ManualClock, SystemClock};
pub use fare::{FareCalculator, FareSchedule};
pub use input::StaticInput;
pub use parking_service::{EntryOutcome, ExitOutcome, ExitReceipt, ParkingReceipt, ParkingService};

/// Business logic constants
pub mod constants {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    /// Milliseconds in one hour
    pub const MILLIS_PER_HOUR: i64 = 3_600_000;

    /// Decimal places kept on the stay duration (in hours)
    pub const DURATION_SCALE: u32 = 2;

    /// Decimal places kept on the final price (whole cents)
    pub const PRICE_SCALE: u32 = 0;

    /// Longest stay billed at zero, in hours
    pub const DEFAULT_FREE_HOURS: Decimal = dec!(0.5);

    /// Multiplier applied to recurring vehicles' fares
    pub const DEFAULT_DISCOUNT_FACTOR: Decimal = dec!(0.95);
}
