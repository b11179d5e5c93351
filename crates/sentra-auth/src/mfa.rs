//! MFA lifecycle — TOTP enrollment, verification, and disable.
//!
//! Every state transition fans out across the identity cluster in a
//! single repository statement, so all accounts sharing the email are
//! updated together or not at all.

use chrono::Utc;
use sentra_core::error::{SentraError, SentraResult};
use sentra_core::models::account::{Account, MfaUpdate};
use sentra_core::repository::AccountRepository;
use tracing::{info, warn};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::token;
use crate::totp::{self, MfaEnrollment, TOTP_STEP_SECS};

/// Read-only MFA state of an identity cluster.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MfaStatus {
    pub enabled: bool,
    pub email: String,
    pub display_name: String,
}

/// MFA lifecycle service.
pub struct MfaService<A: AccountRepository> {
    account_repo: A,
    config: AuthConfig,
}

impl<A: AccountRepository> MfaService<A> {
    pub fn new(account_repo: A, config: AuthConfig) -> Self {
        Self {
            account_repo,
            config,
        }
    }

    /// Begin enrollment: generate a fresh secret, store it on every
    /// cluster account without enabling MFA, and return the secret
    /// plus the otpauth URI for the client to render as a QR code.
    ///
    /// Any previously stored secret is overwritten.
    pub async fn begin_setup(&self, email: &str) -> SentraResult<MfaEnrollment> {
        self.cluster(email).await?;

        let enrollment = totp::generate_enrollment(&self.config.totp_issuer, email)?;

        self.account_repo
            .update_mfa_by_email(
                email,
                MfaUpdate {
                    mfa_secret: Some(Some(enrollment.secret.clone())),
                    mfa_verified_at: Some(None),
                    ..Default::default()
                },
            )
            .await?;

        info!(email = %email, "MFA enrollment started");
        Ok(enrollment)
    }

    /// Verify a TOTP code and enable MFA on every cluster account.
    ///
    /// An invalid code is rejected without mutating any state. On
    /// success a fresh bearer token bound to the email is returned.
    pub async fn verify_and_enable(&self, email: &str, code: &str) -> SentraResult<String> {
        let accounts = self.cluster(email).await?;
        let first = &accounts[0];

        let secret = first
            .mfa_secret
            .as_deref()
            .ok_or_else(|| SentraError::NotFound {
                entity: "MFA configuration".into(),
                id: format!("email={email}"),
            })?;

        // totp-rs validates against the time window but does not
        // remember consumed codes; refuse a second success within the
        // step of the last accepted one.
        let now = Utc::now();
        if let Some(verified_at) = first.mfa_verified_at {
            if now.timestamp() / TOTP_STEP_SECS == verified_at.timestamp() / TOTP_STEP_SECS {
                warn!(email = %email, "TOTP code replayed within the current step");
                return Err(AuthError::MfaInvalidCode.into());
            }
        }

        if !totp::verify_code(secret, code, &self.config.totp_issuer, email)? {
            warn!(email = %email, "Invalid TOTP code");
            return Err(AuthError::MfaInvalidCode.into());
        }

        self.account_repo
            .update_mfa_by_email(
                email,
                MfaUpdate {
                    mfa_enabled: Some(true),
                    using_mfa: Some(true),
                    mfa_verified_at: Some(Some(now)),
                    ..Default::default()
                },
            )
            .await?;

        info!(email = %email, "MFA enabled for cluster");
        Ok(token::issue_token(email, &self.config)?)
    }

    /// Disable MFA: clear the flags, the secret, and the replay marker
    /// on every cluster account.
    pub async fn disable(&self, email: &str) -> SentraResult<()> {
        self.cluster(email).await?;

        self.account_repo
            .update_mfa_by_email(
                email,
                MfaUpdate {
                    mfa_enabled: Some(false),
                    using_mfa: Some(false),
                    mfa_secret: Some(None),
                    mfa_verified_at: Some(None),
                },
            )
            .await?;

        info!(email = %email, "MFA disabled for cluster");
        Ok(())
    }

    /// Report the cluster's MFA state. Members are kept consistent by
    /// the lifecycle operations, so the first member is representative.
    pub async fn status(&self, email: &str) -> SentraResult<MfaStatus> {
        let accounts = self.cluster(email).await?;
        let first = &accounts[0];

        Ok(MfaStatus {
            enabled: first.mfa_enabled,
            email: first.email.clone(),
            display_name: first.display_name.clone(),
        })
    }

    /// Load the identity cluster, failing with NotFound when no
    /// account carries the email.
    async fn cluster(&self, email: &str) -> SentraResult<Vec<Account>> {
        let accounts = self.account_repo.find_all_by_email(email).await?;
        if accounts.is_empty() {
            return Err(SentraError::NotFound {
                entity: "account".into(),
                id: format!("email={email}"),
            });
        }
        Ok(accounts)
    }
}
