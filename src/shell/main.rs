//! ParkIt console shell
//!
//! Interactive front end for a parking attendant. Uses the configured store
//! backend; logs go to stderr so they do not interleave with the prompts.

use anyhow::Context;
use parkit::bootstrap::{memory_stores, parking_service, postgres_stores, release_orphaned_spots};
use parkit::console::{run_shell, ConsoleInputReader};
use parkit::telemetry::init_tracing;
use parkit_core::{config::StorageBackend, AppConfig};
use tracing::info;

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging, std::io::stderr);

    info!("Starting ParkIt shell v{}", env!("CARGO_PKG_VERSION"));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let input = ConsoleInputReader::stdin();

        match config.storage.backend {
            StorageBackend::Postgres => {
                let (spots, tickets) = postgres_stores(&config.database).await?;
                let service = parking_service(spots, tickets, &config.fare);
                release_orphaned_spots(&service).await?;
                run_shell(&service, &input).await?;
            }
            StorageBackend::Memory => {
                let (spots, tickets) = memory_stores(&config.storage);
                let service = parking_service(spots, tickets, &config.fare);
                run_shell(&service, &input).await?;
            }
        }

        Ok::<(), anyhow::Error>(())
    })
}
