//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Mutating assignment operations
//! (role ↔ account, permission ↔ role) are set semantics: repeating a
//! call with identical arguments is a no-op, never an error.

use uuid::Uuid;

use crate::error::SentraResult;
use crate::identity::IdentityProvider;
use crate::models::{
    account::{Account, CreateAccount, MfaUpdate, UpdateAccount},
    operation::Operation,
    permission::{CreatePermission, Permission},
    resource::{CreateResource, Resource},
    role::{CreateRole, Role},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

pub trait AccountRepository: Send + Sync {
    fn create(&self, input: CreateAccount) -> impl Future<Output = SentraResult<Account>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = SentraResult<Account>> + Send;

    /// Look up the account for a (provider, subject id) pair — the
    /// identity a provider asserts on login.
    fn get_by_provider_subject(
        &self,
        provider: IdentityProvider,
        subject_id: &str,
    ) -> impl Future<Output = SentraResult<Account>> + Send;

    /// All accounts sharing an email — the identity cluster, oldest
    /// first. An empty vec is not an error.
    fn find_all_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = SentraResult<Vec<Account>>> + Send;

    fn update(
        &self,
        id: Uuid,
        input: UpdateAccount,
    ) -> impl Future<Output = SentraResult<Account>> + Send;

    /// Apply an MFA field update to every account sharing `email` in a
    /// single atomic statement. Returns the number of accounts touched.
    fn update_mfa_by_email(
        &self,
        email: &str,
        update: MfaUpdate,
    ) -> impl Future<Output = SentraResult<u64>> + Send;

    /// Total number of accounts in the system.
    fn count(&self) -> impl Future<Output = SentraResult<u64>> + Send;

    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = SentraResult<PaginatedResult<Account>>> + Send;

    /// Add a role to the account's role set (idempotent).
    fn assign_role(
        &self,
        account_id: Uuid,
        role_id: Uuid,
    ) -> impl Future<Output = SentraResult<()>> + Send;

    /// Remove a role from the account's role set (idempotent).
    fn unassign_role(
        &self,
        account_id: Uuid,
        role_id: Uuid,
    ) -> impl Future<Output = SentraResult<()>> + Send;

    fn get_roles(&self, account_id: Uuid) -> impl Future<Output = SentraResult<Vec<Role>>> + Send;

    /// Replace the account's role set wholesale.
    fn set_roles(
        &self,
        account_id: Uuid,
        role_ids: &[Uuid],
    ) -> impl Future<Output = SentraResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Role / Resource / Permission catalog
// ---------------------------------------------------------------------------

pub trait RoleRepository: Send + Sync {
    fn create(&self, input: CreateRole) -> impl Future<Output = SentraResult<Role>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = SentraResult<Role>> + Send;
    fn get_by_name(&self, name: &str) -> impl Future<Output = SentraResult<Role>> + Send;
    fn exists_by_name(&self, name: &str) -> impl Future<Output = SentraResult<bool>> + Send;
    /// Idempotent removal; cascades role assignments and grants.
    fn delete(&self, id: Uuid) -> impl Future<Output = SentraResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = SentraResult<PaginatedResult<Role>>> + Send;
}

pub trait ResourceRepository: Send + Sync {
    fn create(&self, input: CreateResource) -> impl Future<Output = SentraResult<Resource>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = SentraResult<Resource>> + Send;
    fn get_by_path(&self, path: &str) -> impl Future<Output = SentraResult<Resource>> + Send;
    fn exists_by_name(&self, name: &str) -> impl Future<Output = SentraResult<bool>> + Send;
    /// Idempotent removal; cascades the resource's permissions and
    /// their grants.
    fn delete(&self, id: Uuid) -> impl Future<Output = SentraResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = SentraResult<PaginatedResult<Resource>>> + Send;
}

pub trait PermissionRepository: Send + Sync {
    fn create(
        &self,
        input: CreatePermission,
    ) -> impl Future<Output = SentraResult<Permission>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = SentraResult<Permission>> + Send;
    fn get_by_resource_operation(
        &self,
        resource_id: Uuid,
        operation: Operation,
    ) -> impl Future<Output = SentraResult<Permission>> + Send;
    /// Idempotent removal; cascades grants referencing the permission.
    fn delete(&self, id: Uuid) -> impl Future<Output = SentraResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = SentraResult<PaginatedResult<Permission>>> + Send;

    /// Grant a permission to a role (idempotent, creates a `grants` edge).
    fn grant_to_role(
        &self,
        role_id: Uuid,
        permission_id: Uuid,
    ) -> impl Future<Output = SentraResult<()>> + Send;

    /// Revoke a permission from a role (idempotent).
    fn revoke_from_role(
        &self,
        role_id: Uuid,
        permission_id: Uuid,
    ) -> impl Future<Output = SentraResult<()>> + Send;

    /// All permissions granted to a role.
    fn get_role_permissions(
        &self,
        role_id: Uuid,
    ) -> impl Future<Output = SentraResult<Vec<Permission>>> + Send;
}
