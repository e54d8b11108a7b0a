//! ASCOM Alpaca front end for the Orrery simulator.
//!
//! This crate exposes the simulated devices over HTTP and answers UDP
//! discovery probes:
//!
//! - **Device API** (`/api/v1/{type}/{number}/{member}`) for the telescope
//!   and dome, with case-insensitive parameters
//! - **Management API** (`/management/...`) listing the server and its
//!   devices
//! - **Discovery** on UDP port 32227
//!
//! # Architecture
//!
//! Handlers never touch an engine directly. Each member is wrapped in the
//! dispatch envelope from `orrery-core`, which allocates the transaction
//! number, checks the connection, and converts the engine's result into
//! the Alpaca JSON response.

pub mod discovery;
pub mod error;
pub mod handlers;
pub mod params;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;

// Re-export primary types for convenience.
pub use discovery::{DiscoveryError, bind_discovery, spawn_discovery};
pub use error::RequestError;
pub use router::build_router;
pub use server::ServerError;
pub use startup::{RunningServer, StartupError, spawn_server};
pub use state::AppState;
