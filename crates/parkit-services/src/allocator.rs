//! Spot allocator
//!
//! Finds a free spot for a vehicle category. Lookup only: claiming the spot
//! is left to the caller.

use parkit_core::{
    models::{ParkingSpot, ParkingType},
    traits::SpotRepository,
    AppResult,
};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Spot allocator
pub struct SpotAllocator<S: SpotRepository> {
    spot_repo: Arc<S>,
}

impl<S: SpotRepository> Clone for SpotAllocator<S> {
    fn clone(&self) -> Self {
        Self {
            spot_repo: Arc::clone(&self.spot_repo),
        }
    }
}

impl<S: SpotRepository> SpotAllocator<S> {
    /// Create a new allocator
    pub fn new(spot_repo: Arc<S>) -> Self {
        Self { spot_repo }
    }

    /// Lowest-numbered free spot of the category
    ///
    /// `Ok(None)` means the facility is full for this category, which is a
    /// normal outcome. Store failures are returned as errors.
    #[instrument(skip(self))]
    pub async fn find_available_spot(
        &self,
        parking_type: ParkingType,
    ) -> AppResult<Option<ParkingSpot>> {
        match self.spot_repo.find_next_available(parking_type).await? {
            Some(id) if id > 0 => {
                debug!("Next available {} spot: {}", parking_type, id);
                Ok(Some(ParkingSpot::new(id, parking_type, true)))
            }
            _ => {
                warn!("No {} spot available, parking might be full", parking_type);
                Ok(None)
            }
        }
    }
}
