//! Identity cluster resolution.
//!
//! An identity cluster is the set of accounts sharing one email; the
//! system treats them as one logical user for MFA purposes. Resolution
//! maps a provider assertion to an account, creating one on first
//! login for that (provider, subject id) pair. A new account inherits
//! the cluster's MFA state and — at creation time only — the role set
//! of the oldest cluster member; role sets are not synchronized after
//! that.

use sentra_core::error::{SentraError, SentraResult};
use sentra_core::identity::IdentityAssertion;
use sentra_core::models::account::{Account, CreateAccount};
use sentra_core::models::role::{ADMIN_ROLE, Role, USER_ROLE};
use sentra_core::repository::{AccountRepository, RoleRepository};
use tracing::info;
use uuid::Uuid;

/// Resolves provider assertions to accounts.
pub struct IdentityResolver<A, R>
where
    A: AccountRepository,
    R: RoleRepository,
{
    account_repo: A,
    role_repo: R,
}

impl<A, R> IdentityResolver<A, R>
where
    A: AccountRepository,
    R: RoleRepository,
{
    pub fn new(account_repo: A, role_repo: R) -> Self {
        Self {
            account_repo,
            role_repo,
        }
    }

    /// Resolve an assertion to an account, creating one on first login.
    pub async fn resolve(&self, assertion: IdentityAssertion) -> SentraResult<Account> {
        // An account already registered for this (provider, subject)
        // pair is authoritative as stored.
        match self
            .account_repo
            .get_by_provider_subject(assertion.provider, &assertion.subject_id)
            .await
        {
            Ok(account) => {
                info!(
                    email = %account.email,
                    provider = %account.provider,
                    mfa_enabled = account.mfa_enabled,
                    "Existing account resolved"
                );
                return Ok(account);
            }
            Err(SentraError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        // First login via this provider. Accounts sharing the email —
        // the cluster — donate their MFA state to the new account.
        let cluster = self
            .account_repo
            .find_all_by_email(&assertion.email)
            .await?;

        let input = match cluster.first() {
            Some(sibling) => {
                info!(
                    email = %assertion.email,
                    "Existing cluster found; inheriting MFA state"
                );
                CreateAccount {
                    email: assertion.email.clone(),
                    display_name: assertion.display_name.clone(),
                    provider: assertion.provider,
                    subject_id: assertion.subject_id.clone(),
                    mfa_enabled: sibling.mfa_enabled,
                    mfa_secret: sibling.mfa_secret.clone(),
                    using_mfa: sibling.using_mfa,
                    mfa_verified_at: sibling.mfa_verified_at,
                }
            }
            None => CreateAccount {
                email: assertion.email.clone(),
                display_name: assertion.display_name.clone(),
                provider: assertion.provider,
                subject_id: assertion.subject_id.clone(),
                mfa_enabled: false,
                mfa_secret: None,
                using_mfa: false,
                mfa_verified_at: None,
            },
        };

        let account = self.account_repo.create(input).await?;

        // Inherit the sibling's role set at creation time; an empty
        // result falls back to the default USER role.
        let mut role_ids: Vec<Uuid> = match cluster.first() {
            Some(sibling) => self
                .account_repo
                .get_roles(sibling.id)
                .await?
                .into_iter()
                .map(|role| role.id)
                .collect(),
            None => Vec::new(),
        };

        if role_ids.is_empty() {
            let user_role = self.require_role(USER_ROLE).await?;
            role_ids.push(user_role.id);
        }

        self.account_repo.set_roles(account.id, &role_ids).await?;
        info!(
            email = %account.email,
            provider = %account.provider,
            "Created account"
        );

        // The very first account in the whole system becomes the
        // administrator, whatever it inherited — the system must never
        // be administrator-less.
        if self.account_repo.count().await? == 1 {
            let admin_role = self.require_role(ADMIN_ROLE).await?;
            self.account_repo
                .set_roles(account.id, &[admin_role.id])
                .await?;
            info!(email = %account.email, "First account registered; granted ADMIN role");
        }

        Ok(account)
    }

    /// Look up a bootstrap role, converting its absence into a fatal
    /// configuration error.
    async fn require_role(&self, name: &str) -> SentraResult<Role> {
        match self.role_repo.get_by_name(name).await {
            Ok(role) => Ok(role),
            Err(SentraError::NotFound { .. }) => Err(SentraError::Configuration(format!(
                "required bootstrap role {name} is missing"
            ))),
            Err(e) => Err(e),
        }
    }
}
