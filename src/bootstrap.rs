//! Store and service construction from configuration

use parkit_core::{
    config::{DatabaseConfig, FareConfig, StorageConfig},
    traits::{SpotRepository, TicketRepository},
    AppResult,
};
use parkit_db::{
    create_pool, run_migrations, InMemorySpotRepository, InMemoryTicketRepository,
    PgSpotRepository, PgTicketRepository,
};
use parkit_services::{FareCalculator, FareSchedule, ParkingService};
use std::sync::Arc;
use tracing::{info, warn};

/// Connect to PostgreSQL and build the repositories over the pool
pub async fn postgres_stores(
    config: &DatabaseConfig,
) -> AppResult<(Arc<PgSpotRepository>, Arc<PgTicketRepository>)> {
    let pool = create_pool(config).await?;

    if config.run_migrations {
        run_migrations(&pool).await?;
    }

    Ok((
        Arc::new(PgSpotRepository::new(pool.clone())),
        Arc::new(PgTicketRepository::new(pool)),
    ))
}

/// Process-local stores seeded with the configured layout
pub fn memory_stores(
    config: &StorageConfig,
) -> (Arc<InMemorySpotRepository>, Arc<InMemoryTicketRepository>) {
    info!(
        "Using in-memory storage with {} car and {} bike spots",
        config.car_spots, config.bike_spots
    );

    (
        Arc::new(InMemorySpotRepository::with_layout(
            config.car_spots,
            config.bike_spots,
        )),
        Arc::new(InMemoryTicketRepository::new()),
    )
}

/// Build the lifecycle service with the configured fare schedule
pub fn parking_service<S, T>(
    spot_repo: Arc<S>,
    ticket_repo: Arc<T>,
    fare: &FareConfig,
) -> ParkingService<S, T>
where
    S: SpotRepository,
    T: TicketRepository,
{
    let schedule = FareSchedule::from(fare);
    info!(
        "Fare schedule: free for {}h, {}x for recurring vehicles",
        schedule.free_hours(),
        schedule.discount_factor()
    );

    ParkingService::new(spot_repo, ticket_repo, FareCalculator::new(schedule))
}

/// Free spots left taken by exits that closed their ticket but could not
/// release the spot
///
/// Runs before the service accepts entries.
pub async fn release_orphaned_spots<S, T>(service: &ParkingService<S, T>) -> AppResult<()>
where
    S: SpotRepository,
    T: TicketRepository,
{
    let released = service.release_orphaned_spots().await?;
    if released.is_empty() {
        info!("No orphaned spots found");
    } else {
        warn!("Released orphaned spots {:?}", released);
    }

    Ok(())
}
