//! SENTRA Core — domain models, repository trait definitions, and the
//! shared error type.
//!
//! This crate is persistence-agnostic: the service layers are generic
//! over the repository traits defined here, and `sentra-db` provides
//! the SurrealDB implementations.

pub mod error;
pub mod identity;
pub mod models;
pub mod repository;

pub use error::{SentraError, SentraResult};
