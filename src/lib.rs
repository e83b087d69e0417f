//! ParkIt application wiring
//!
//! Shared by the HTTP server and the console shell: tracing setup, store
//! construction from configuration, and the interactive console.

pub mod bootstrap;
pub mod console;
pub mod telemetry;
