//! SurrealDB implementation of [`AccountRepository`].
//!
//! Accounts are keyed by (provider, subject_id); the email column is
//! indexed but not unique. Cluster-wide MFA writes are issued as one
//! `UPDATE ... WHERE email = $email` statement so that every member of
//! an identity cluster is updated consistently or not at all.

use chrono::{DateTime, Utc};
use sentra_core::error::SentraResult;
use sentra_core::identity::IdentityProvider;
use sentra_core::models::account::{Account, CreateAccount, MfaUpdate, UpdateAccount};
use sentra_core::models::role::Role;
use sentra_core::repository::{AccountRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::role::RoleRowWithId;

#[derive(Debug, SurrealValue)]
struct AccountRow {
    email: String,
    display_name: String,
    provider: String,
    subject_id: String,
    mfa_enabled: bool,
    mfa_secret: Option<String>,
    using_mfa: bool,
    mfa_verified_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct AccountRowWithId {
    record_id: String,
    email: String,
    display_name: String,
    provider: String,
    subject_id: String,
    mfa_enabled: bool,
    mfa_secret: Option<String>,
    using_mfa: bool,
    mfa_verified_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_provider(s: &str) -> Result<IdentityProvider, DbError> {
    match s {
        "GOOGLE" => Ok(IdentityProvider::Google),
        "GITHUB" => Ok(IdentityProvider::Github),
        "FACEBOOK" => Ok(IdentityProvider::Facebook),
        other => Err(DbError::Migration(format!("unknown provider: {other}"))),
    }
}

impl AccountRow {
    fn into_account(self, id: Uuid) -> Result<Account, DbError> {
        Ok(Account {
            id,
            email: self.email,
            display_name: self.display_name,
            provider: parse_provider(&self.provider)?,
            subject_id: self.subject_id,
            mfa_enabled: self.mfa_enabled,
            mfa_secret: self.mfa_secret,
            using_mfa: self.using_mfa,
            mfa_verified_at: self.mfa_verified_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl AccountRowWithId {
    fn try_into_account(self) -> Result<Account, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        Ok(Account {
            id,
            email: self.email,
            display_name: self.display_name,
            provider: parse_provider(&self.provider)?,
            subject_id: self.subject_id,
            mfa_enabled: self.mfa_enabled,
            mfa_secret: self.mfa_secret,
            using_mfa: self.using_mfa,
            mfa_verified_at: self.mfa_verified_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Account repository.
#[derive(Clone)]
pub struct SurrealAccountRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAccountRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AccountRepository for SurrealAccountRepository<C> {
    async fn create(&self, input: CreateAccount) -> SentraResult<Account> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('account', $id) SET \
                 email = $email, display_name = $display_name, \
                 provider = $provider, subject_id = $subject_id, \
                 mfa_enabled = $mfa_enabled, \
                 mfa_secret = $mfa_secret, \
                 using_mfa = $using_mfa, \
                 mfa_verified_at = $mfa_verified_at",
            )
            .bind(("id", id_str.clone()))
            .bind(("email", input.email))
            .bind(("display_name", input.display_name))
            .bind(("provider", input.provider.as_str().to_string()))
            .bind(("subject_id", input.subject_id))
            .bind(("mfa_enabled", input.mfa_enabled))
            .bind(("mfa_secret", input.mfa_secret))
            .bind(("using_mfa", input.using_mfa))
            .bind(("mfa_verified_at", input.mfa_verified_at))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<AccountRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "account".into(),
            id: id_str,
        })?;

        Ok(row.into_account(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> SentraResult<Account> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('account', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AccountRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "account".into(),
            id: id_str,
        })?;

        Ok(row.into_account(id)?)
    }

    async fn get_by_provider_subject(
        &self,
        provider: IdentityProvider,
        subject_id: &str,
    ) -> SentraResult<Account> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM account \
                 WHERE provider = $provider \
                 AND subject_id = $subject_id",
            )
            .bind(("provider", provider.as_str().to_string()))
            .bind(("subject_id", subject_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AccountRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "account".into(),
            id: format!("{provider}:{subject_id}"),
        })?;

        Ok(row.try_into_account()?)
    }

    async fn find_all_by_email(&self, email: &str) -> SentraResult<Vec<Account>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM account \
                 WHERE email = $email \
                 ORDER BY created_at ASC",
            )
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AccountRowWithId> = result.take(0).map_err(DbError::from)?;

        let accounts = rows
            .into_iter()
            .map(|row| row.try_into_account())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(accounts)
    }

    async fn update(&self, id: Uuid, input: UpdateAccount) -> SentraResult<Account> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.display_name.is_some() {
            sets.push("display_name = $display_name");
        }
        if input.mfa_enabled.is_some() {
            sets.push("mfa_enabled = $mfa_enabled");
        }
        if input.using_mfa.is_some() {
            sets.push("using_mfa = $using_mfa");
        }
        if input.mfa_secret.is_some() {
            sets.push("mfa_secret = $mfa_secret");
        }
        if input.mfa_verified_at.is_some() {
            sets.push("mfa_verified_at = $mfa_verified_at");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('account', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(display_name) = input.display_name {
            builder = builder.bind(("display_name", display_name));
        }
        if let Some(mfa_enabled) = input.mfa_enabled {
            builder = builder.bind(("mfa_enabled", mfa_enabled));
        }
        if let Some(using_mfa) = input.using_mfa {
            builder = builder.bind(("using_mfa", using_mfa));
        }
        if let Some(mfa_secret) = input.mfa_secret {
            // mfa_secret is Option<Option<String>>:
            // Some(Some(v)) = set, Some(None) = clear
            builder = builder.bind(("mfa_secret", mfa_secret));
        }
        if let Some(mfa_verified_at) = input.mfa_verified_at {
            builder = builder.bind(("mfa_verified_at", mfa_verified_at));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<AccountRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "account".into(),
            id: id_str,
        })?;

        Ok(row.into_account(id)?)
    }

    async fn update_mfa_by_email(&self, email: &str, update: MfaUpdate) -> SentraResult<u64> {
        let mut sets = Vec::new();
        if update.mfa_enabled.is_some() {
            sets.push("mfa_enabled = $mfa_enabled");
        }
        if update.using_mfa.is_some() {
            sets.push("using_mfa = $using_mfa");
        }
        if update.mfa_secret.is_some() {
            sets.push("mfa_secret = $mfa_secret");
        }
        if update.mfa_verified_at.is_some() {
            sets.push("mfa_verified_at = $mfa_verified_at");
        }
        sets.push("updated_at = time::now()");

        // One statement over the whole cluster: every account sharing
        // the email is updated, or none is.
        let query = format!(
            "UPDATE account SET {} WHERE email = $email",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("email", email.to_string()));

        if let Some(mfa_enabled) = update.mfa_enabled {
            builder = builder.bind(("mfa_enabled", mfa_enabled));
        }
        if let Some(using_mfa) = update.using_mfa {
            builder = builder.bind(("using_mfa", using_mfa));
        }
        if let Some(mfa_secret) = update.mfa_secret {
            builder = builder.bind(("mfa_secret", mfa_secret));
        }
        if let Some(mfa_verified_at) = update.mfa_verified_at {
            builder = builder.bind(("mfa_verified_at", mfa_verified_at));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<AccountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.len() as u64)
    }

    async fn count(&self) -> SentraResult<u64> {
        let mut result = self
            .db
            .query("SELECT count() AS total FROM account GROUP ALL")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn list(&self, pagination: Pagination) -> SentraResult<PaginatedResult<Account>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM account GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM account \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AccountRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_account())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn assign_role(&self, account_id: Uuid, role_id: Uuid) -> SentraResult<()> {
        let account_id_str = account_id.to_string();
        let role_id_str = role_id.to_string();

        // Clear any existing edge first so repeated assignments stay
        // single edges.
        let query = format!(
            "DELETE has_role WHERE \
             in = type::record('account', $account_id) AND \
             out = type::record('role', $role_id); \
             RELATE account:`{account_id_str}` -> has_role -> \
             role:`{role_id_str}`;"
        );

        self.db
            .query(query)
            .bind(("account_id", account_id_str))
            .bind(("role_id", role_id_str))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn unassign_role(&self, account_id: Uuid, role_id: Uuid) -> SentraResult<()> {
        self.db
            .query(
                "DELETE has_role WHERE \
                 in = type::record('account', $account_id) AND \
                 out = type::record('role', $role_id)",
            )
            .bind(("account_id", account_id.to_string()))
            .bind(("role_id", role_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn get_roles(&self, account_id: Uuid) -> SentraResult<Vec<Role>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM role \
                 WHERE id IN (\
                     SELECT VALUE out FROM has_role \
                     WHERE in = type::record('account', $account_id)\
                 )",
            )
            .bind(("account_id", account_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRowWithId> = result.take(0).map_err(DbError::from)?;

        let roles = rows
            .into_iter()
            .map(|row| row.try_into_role())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(roles)
    }

    async fn set_roles(&self, account_id: Uuid, role_ids: &[Uuid]) -> SentraResult<()> {
        let account_id_str = account_id.to_string();

        let mut query =
            String::from("DELETE has_role WHERE in = type::record('account', $account_id);");
        for role_id in role_ids {
            query.push_str(&format!(
                " RELATE account:`{account_id_str}` -> has_role -> role:`{role_id}`;"
            ));
        }

        self.db
            .query(query)
            .bind(("account_id", account_id_str))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}
