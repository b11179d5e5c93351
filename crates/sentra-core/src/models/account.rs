//! Account domain model.
//!
//! One account row exists per (provider, subject id) pair. Emails are
//! deliberately not unique: accounts sharing an email form an identity
//! cluster and are treated as one logical user for MFA purposes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::IdentityProvider;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub provider: IdentityProvider,
    /// Subject id assigned by the provider; unique per provider.
    pub subject_id: String,
    pub mfa_enabled: bool,
    /// Base32 TOTP secret, shared by every account in the cluster.
    /// Never serialized outward.
    #[serde(skip_serializing)]
    pub mfa_secret: Option<String>,
    pub using_mfa: bool,
    /// When a TOTP code was last accepted for this cluster. Guards
    /// against replaying a consumed code within the same time step.
    pub mfa_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccount {
    pub email: String,
    pub display_name: String,
    pub provider: IdentityProvider,
    pub subject_id: String,
    /// MFA state, either defaulted or inherited from an existing
    /// cluster member.
    pub mfa_enabled: bool,
    pub mfa_secret: Option<String>,
    pub using_mfa: bool,
    pub mfa_verified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateAccount {
    pub display_name: Option<String>,
    pub mfa_enabled: Option<bool>,
    pub using_mfa: Option<bool>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub mfa_secret: Option<Option<String>>,
    pub mfa_verified_at: Option<Option<DateTime<Utc>>>,
}

/// MFA field update fanned out to every account sharing an email.
///
/// Applied by the repository as a single statement so the cluster is
/// updated consistently or not at all.
#[derive(Debug, Clone, Default)]
pub struct MfaUpdate {
    pub mfa_enabled: Option<bool>,
    pub using_mfa: Option<bool>,
    pub mfa_secret: Option<Option<String>>,
    pub mfa_verified_at: Option<Option<DateTime<Utc>>>,
}
