//! Permission domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::operation::Operation;

/// The (resource, operation) pair a role can be granted.
///
/// Unique per pair; owned by exactly one resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub id: Uuid,
    pub resource_id: Uuid,
    pub operation: Operation,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePermission {
    pub resource_id: Uuid,
    pub operation: Operation,
}
