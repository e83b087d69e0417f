//! ParkIt HTTP server
//!
//! Serves vehicle entry and exit, spot availability and ticket history over
//! the configured store backend.

use actix_cors::Cors;
use actix_web::{http::header, middleware, web, App, HttpResponse, HttpServer};
use anyhow::Context;
use parkit::bootstrap::{memory_stores, parking_service, postgres_stores, release_orphaned_spots};
use parkit::telemetry::init_tracing;
use parkit_api::configure_api;
use parkit_core::{
    config::StorageBackend,
    traits::{SpotRepository, TicketRepository},
    AppConfig,
};
use parkit_services::ParkingService;
use tracing::info;
use tracing_actix_web::TracingLogger;

/// Run the HTTP server over the given service until shutdown
async fn run_server<S, T>(config: &AppConfig, service: ParkingService<S, T>) -> std::io::Result<()>
where
    S: SpotRepository + 'static,
    T: TicketRepository + 'static,
{
    let state = web::Data::new(service);
    let bind_addr = config.server_addr();

    info!(
        "Starting HTTP server on {} with {} workers",
        bind_addr, config.server.workers
    );

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .app_data(state.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                let error_message = err.to_string();
                actix_web::error::InternalError::from_response(
                    err,
                    HttpResponse::BadRequest().json(serde_json::json!({
                        "error": "invalid_json",
                        "message": error_message,
                        "status": 400,
                    })),
                )
                .into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                let error_message = err.to_string();
                actix_web::error::InternalError::from_response(
                    err,
                    HttpResponse::BadRequest().json(serde_json::json!({
                        "error": "invalid_query",
                        "message": error_message,
                        "status": 400,
                    })),
                )
                .into()
            }))
            // Middleware
            .wrap(cors)
            .wrap(TracingLogger::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(configure_api::<S, T>)
            // Root redirect to health
            .route(
                "/",
                web::get().to(|| async {
                    HttpResponse::Found()
                        .append_header(("Location", "/api/v1/health"))
                        .finish()
                }),
            )
    })
    .workers(config.server.workers)
    .bind(&bind_addr)?
    .run()
    .await
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging, std::io::stdout);

    info!("Starting ParkIt v{}", env!("CARGO_PKG_VERSION"));

    match config.storage.backend {
        StorageBackend::Postgres => {
            info!("Connecting to database...");
            let (spots, tickets) = postgres_stores(&config.database)
                .await
                .context("Failed to set up PostgreSQL storage")?;
            let service = parking_service(spots, tickets, &config.fare);
            release_orphaned_spots(&service)
                .await
                .context("Failed to release orphaned spots")?;
            run_server(&config, service).await?;
        }
        StorageBackend::Memory => {
            let (spots, tickets) = memory_stores(&config.storage);
            run_server(&config, parking_service(spots, tickets, &config.fare)).await?;
        }
    }

    Ok(())
}
