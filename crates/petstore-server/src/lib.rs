//! HTTP server for the pet store.
//!
//! The binary in `main.rs` loads configuration, opens the database and
//! serves [`app`]; integration tests drive the same router directly.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod logging;
pub mod middleware;
pub mod pagination;
pub mod routes;
pub mod state;

pub use routes::app;
pub use state::AppState;
