//! RBAC authorization engine — permission checking, catalog
//! management, and assignment operations.

use sentra_core::error::{SentraError, SentraResult};
use sentra_core::models::account::Account;
use sentra_core::models::operation::Operation;
use sentra_core::models::permission::{CreatePermission, Permission};
use sentra_core::models::resource::{CreateResource, Resource};
use sentra_core::models::role::{ADMIN_ROLE, CreateRole, Role, USER_ROLE};
use sentra_core::repository::{
    AccountRepository, PaginatedResult, Pagination, PermissionRepository, ResourceRepository,
    RoleRepository,
};
use tracing::{debug, info};
use uuid::Uuid;

/// RBAC authorization engine.
///
/// Generic over repository implementations so that the auth layer has
/// no dependency on the database crate.
pub struct RbacEngine<A, R, S, P>
where
    A: AccountRepository,
    R: RoleRepository,
    S: ResourceRepository,
    P: PermissionRepository,
{
    account_repo: A,
    role_repo: R,
    resource_repo: S,
    permission_repo: P,
}

impl<A, R, S, P> RbacEngine<A, R, S, P>
where
    A: AccountRepository,
    R: RoleRepository,
    S: ResourceRepository,
    P: PermissionRepository,
{
    pub fn new(account_repo: A, role_repo: R, resource_repo: S, permission_repo: P) -> Self {
        Self {
            account_repo,
            role_repo,
            resource_repo,
            permission_repo,
        }
    }

    // ==================== permission checking ====================

    /// Whether any account sharing `email` holds a role granting
    /// `operation` on the resource registered under `resource_path`.
    ///
    /// Paths with no registered resource are allowed: unregistered
    /// endpoints are deliberately not gated, so registering a resource
    /// is what opts it into enforcement.
    pub async fn has_permission(
        &self,
        email: &str,
        resource_path: &str,
        operation: Operation,
    ) -> SentraResult<bool> {
        let accounts = self.account_repo.find_all_by_email(email).await?;
        if accounts.is_empty() {
            return Ok(false);
        }

        let resource = match self.resource_repo.get_by_path(resource_path).await {
            Ok(resource) => resource,
            Err(SentraError::NotFound { .. }) => return Ok(true),
            Err(e) => return Err(e),
        };

        for account in &accounts {
            for role in self.account_repo.get_roles(account.id).await? {
                for permission in self.permission_repo.get_role_permissions(role.id).await? {
                    if permission.resource_id == resource.id && permission.operation == operation
                    {
                        return Ok(true);
                    }
                }
            }
        }

        Ok(false)
    }

    /// Whether any account sharing `email` holds the `ADMIN` role.
    pub async fn is_admin(&self, email: &str) -> SentraResult<bool> {
        for account in self.account_repo.find_all_by_email(email).await? {
            for role in self.account_repo.get_roles(account.id).await? {
                if role.name == ADMIN_ROLE {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    // ==================== role management ====================

    pub async fn create_role(&self, input: CreateRole) -> SentraResult<Role> {
        if self.role_repo.exists_by_name(&input.name).await? {
            return Err(SentraError::AlreadyExists {
                entity: format!("role {}", input.name),
            });
        }

        let role = self.role_repo.create(input).await?;
        info!(role = %role.name, "Created role");
        Ok(role)
    }

    /// Idempotent removal; assignments and grants held by the role are
    /// cascaded away with it.
    pub async fn delete_role(&self, role_id: Uuid) -> SentraResult<()> {
        self.role_repo.delete(role_id).await?;
        info!(role_id = %role_id, "Deleted role");
        Ok(())
    }

    pub async fn roles(&self, pagination: Pagination) -> SentraResult<PaginatedResult<Role>> {
        self.role_repo.list(pagination).await
    }

    // ==================== resource management ====================

    pub async fn create_resource(&self, input: CreateResource) -> SentraResult<Resource> {
        if self.resource_repo.exists_by_name(&input.name).await? {
            return Err(SentraError::AlreadyExists {
                entity: format!("resource {}", input.name),
            });
        }

        let resource = self.resource_repo.create(input).await?;
        info!(resource = %resource.name, path = %resource.path, "Created resource");
        Ok(resource)
    }

    /// Idempotent removal; the resource's permissions (and their
    /// grants) are cascaded away with it.
    pub async fn delete_resource(&self, resource_id: Uuid) -> SentraResult<()> {
        self.resource_repo.delete(resource_id).await?;
        info!(resource_id = %resource_id, "Deleted resource");
        Ok(())
    }

    pub async fn resources(
        &self,
        pagination: Pagination,
    ) -> SentraResult<PaginatedResult<Resource>> {
        self.resource_repo.list(pagination).await
    }

    // ==================== permission management ====================

    pub async fn create_permission(&self, input: CreatePermission) -> SentraResult<Permission> {
        let resource = self.resource_repo.get_by_id(input.resource_id).await?;

        match self
            .permission_repo
            .get_by_resource_operation(resource.id, input.operation)
            .await
        {
            Ok(_) => {
                return Err(SentraError::AlreadyExists {
                    entity: format!("permission {} {}", resource.name, input.operation),
                });
            }
            Err(SentraError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let permission = self.permission_repo.create(input).await?;
        info!(
            resource = %resource.name,
            operation = %permission.operation,
            "Created permission"
        );
        Ok(permission)
    }

    pub async fn delete_permission(&self, permission_id: Uuid) -> SentraResult<()> {
        self.permission_repo.delete(permission_id).await?;
        info!(permission_id = %permission_id, "Deleted permission");
        Ok(())
    }

    pub async fn permissions(
        &self,
        pagination: Pagination,
    ) -> SentraResult<PaginatedResult<Permission>> {
        self.permission_repo.list(pagination).await
    }

    // ==================== assignments ====================

    /// Grant a permission to a role. A repeat grant is a no-op; fails
    /// only when either id does not exist.
    pub async fn assign_permission_to_role(
        &self,
        role_id: Uuid,
        permission_id: Uuid,
    ) -> SentraResult<()> {
        let role = self.role_repo.get_by_id(role_id).await?;
        let permission = self.permission_repo.get_by_id(permission_id).await?;

        self.permission_repo
            .grant_to_role(role.id, permission.id)
            .await?;
        info!(role = %role.name, permission_id = %permission.id, "Assigned permission to role");
        Ok(())
    }

    pub async fn remove_permission_from_role(
        &self,
        role_id: Uuid,
        permission_id: Uuid,
    ) -> SentraResult<()> {
        let role = self.role_repo.get_by_id(role_id).await?;
        let permission = self.permission_repo.get_by_id(permission_id).await?;

        self.permission_repo
            .revoke_from_role(role.id, permission.id)
            .await?;
        info!(role = %role.name, permission_id = %permission.id, "Removed permission from role");
        Ok(())
    }

    /// Add a role to an account's role set. A repeat assignment is a
    /// no-op; fails only when either id does not exist.
    pub async fn assign_role_to_account(
        &self,
        account_id: Uuid,
        role_id: Uuid,
    ) -> SentraResult<()> {
        let account = self.account_repo.get_by_id(account_id).await?;
        let role = self.role_repo.get_by_id(role_id).await?;

        self.account_repo.assign_role(account.id, role.id).await?;
        info!(role = %role.name, account = %account.email, "Assigned role to account");
        Ok(())
    }

    pub async fn remove_role_from_account(
        &self,
        account_id: Uuid,
        role_id: Uuid,
    ) -> SentraResult<()> {
        let account = self.account_repo.get_by_id(account_id).await?;
        let role = self.role_repo.get_by_id(role_id).await?;

        self.account_repo.unassign_role(account.id, role.id).await?;
        info!(role = %role.name, account = %account.email, "Removed role from account");
        Ok(())
    }

    // ==================== accounts (admin views) ====================

    pub async fn accounts(
        &self,
        pagination: Pagination,
    ) -> SentraResult<PaginatedResult<Account>> {
        self.account_repo.list(pagination).await
    }

    pub async fn account(&self, account_id: Uuid) -> SentraResult<Account> {
        self.account_repo.get_by_id(account_id).await
    }

    pub async fn account_roles(&self, account_id: Uuid) -> SentraResult<Vec<Role>> {
        let account = self.account_repo.get_by_id(account_id).await?;
        self.account_repo.get_roles(account.id).await
    }

    // ==================== initialization ====================

    /// Idempotent startup reconciliation: ensure the built-in `ADMIN`
    /// and `USER` roles exist before any traffic is served.
    pub async fn ensure_builtin_roles(&self) -> SentraResult<()> {
        if !self.role_repo.exists_by_name(ADMIN_ROLE).await? {
            self.role_repo
                .create(CreateRole {
                    name: ADMIN_ROLE.into(),
                    description: "Administrator with full access".into(),
                })
                .await?;
            info!("Created default ADMIN role");
        }

        if !self.role_repo.exists_by_name(USER_ROLE).await? {
            self.role_repo
                .create(CreateRole {
                    name: USER_ROLE.into(),
                    description: "Regular user with limited access".into(),
                })
                .await?;
            info!("Created default USER role");
        }

        debug!("Role catalog reconciled");
        Ok(())
    }
}
