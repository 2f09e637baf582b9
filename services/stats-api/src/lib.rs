//! Geostats HTTP API.
//!
//! Exposes cached per-cell statistics over HTTP. The binary in `main.rs`
//! wires configuration and logging; everything else lives here so the
//! router can be exercised in tests.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
