//! HTTP surface for the attack game.
//!
//! Exposes the raw store operations, the leaderboard, and session control
//! over axum. The binary in `main.rs` wires configuration, logging and the
//! runtime together; tests drive [`router`] directly.
pub mod config;
pub mod error;
pub mod logging;
pub mod routes;

pub use config::ServerConfig;
pub use error::{ApiError, Result};
pub use routes::{AppState, StoreCommand, router};
