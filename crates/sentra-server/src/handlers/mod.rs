//! HTTP handlers — thin delegation into the `sentra-auth` services.

pub mod auth;
pub mod health;
pub mod rbac;
