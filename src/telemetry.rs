//! Tracing subscriber setup

use parkit_core::config::LoggingConfig;
use std::env;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Directive used when RUST_LOG is unset
fn default_directive(level: &str) -> String {
    format!(
        "parkit={level},parkit_api={level},parkit_services={level},parkit_db={level},parkit_core={level},actix_web=info,sqlx=warn"
    )
}

/// Initialize tracing/logging
///
/// `LOG_LEVEL` overrides `logging.level`; `RUST_LOG` replaces the whole
/// filter.
pub fn init_tracing<W>(config: &LoggingConfig, writer: W)
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| config.level.clone());

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&log_level)));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(writer)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    }
}
