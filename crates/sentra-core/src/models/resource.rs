//! Resource domain model.
//!
//! A resource is a business entity ("Orders", "Documents", …), not an
//! API route. Permissions define which [`Operation`]s may be performed
//! on it.
//!
//! [`Operation`]: super::operation::Operation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: Uuid,
    /// Unique display name of the business entity (e.g. "Orders").
    pub name: String,
    /// Slug used for permission lookups (e.g. "orders").
    pub path: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateResource {
    pub name: String,
    pub path: String,
    pub description: String,
}
