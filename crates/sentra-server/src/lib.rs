//! SENTRA Server — axum composition of the auth services.
//!
//! Everything here is thin plumbing: handlers delegate to
//! `sentra-auth`, and the router is generic over the SurrealDB
//! connection type so tests can drive it against the in-memory engine.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;
