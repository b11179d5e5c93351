//! SurrealDB implementation of [`PermissionRepository`].

use chrono::{DateTime, Utc};
use sentra_core::error::SentraResult;
use sentra_core::models::operation::Operation;
use sentra_core::models::permission::{CreatePermission, Permission};
use sentra_core::repository::{PaginatedResult, Pagination, PermissionRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct PermissionRow {
    resource_id: String,
    operation: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct PermissionRowWithId {
    record_id: String,
    resource_id: String,
    operation: String,
    created_at: DateTime<Utc>,
}

fn parse_operation(s: &str) -> Result<Operation, DbError> {
    match s {
        "CREATE" => Ok(Operation::Create),
        "READ" => Ok(Operation::Read),
        "UPDATE" => Ok(Operation::Update),
        "DELETE" => Ok(Operation::Delete),
        other => Err(DbError::Migration(format!("unknown operation: {other}"))),
    }
}

impl PermissionRow {
    fn into_permission(self, id: Uuid) -> Result<Permission, DbError> {
        let resource_id = Uuid::parse_str(&self.resource_id)
            .map_err(|e| DbError::Migration(format!("invalid resource UUID: {e}")))?;
        Ok(Permission {
            id,
            resource_id,
            operation: parse_operation(&self.operation)?,
            created_at: self.created_at,
        })
    }
}

impl PermissionRowWithId {
    fn try_into_permission(self) -> Result<Permission, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        let resource_id = Uuid::parse_str(&self.resource_id)
            .map_err(|e| DbError::Migration(format!("invalid resource UUID: {e}")))?;
        Ok(Permission {
            id,
            resource_id,
            operation: parse_operation(&self.operation)?,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Permission repository.
#[derive(Clone)]
pub struct SurrealPermissionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPermissionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PermissionRepository for SurrealPermissionRepository<C> {
    async fn create(&self, input: CreatePermission) -> SentraResult<Permission> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('permission', $id) SET \
                 resource_id = $resource_id, \
                 operation = $operation",
            )
            .bind(("id", id_str.clone()))
            .bind(("resource_id", input.resource_id.to_string()))
            .bind(("operation", input.operation.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "permission".into(),
            id: id_str,
        })?;

        Ok(row.into_permission(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> SentraResult<Permission> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('permission', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "permission".into(),
            id: id_str,
        })?;

        Ok(row.into_permission(id)?)
    }

    async fn get_by_resource_operation(
        &self,
        resource_id: Uuid,
        operation: Operation,
    ) -> SentraResult<Permission> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM permission \
                 WHERE resource_id = $resource_id \
                 AND operation = $operation",
            )
            .bind(("resource_id", resource_id.to_string()))
            .bind(("operation", operation.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "permission".into(),
            id: format!("resource={resource_id} operation={operation}"),
        })?;

        Ok(row.try_into_permission()?)
    }

    async fn delete(&self, id: Uuid) -> SentraResult<()> {
        let id_str = id.to_string();

        // Delete grants referencing the permission first.
        let query = format!(
            "DELETE grants WHERE out = permission:`{id_str}`; \
             DELETE type::record('permission', $id);"
        );

        self.db
            .query(query)
            .bind(("id", id_str))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> SentraResult<PaginatedResult<Permission>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM permission GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM permission \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_permission())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn grant_to_role(&self, role_id: Uuid, permission_id: Uuid) -> SentraResult<()> {
        let role_id_str = role_id.to_string();
        let permission_id_str = permission_id.to_string();

        // Clear any existing edge first so repeated grants stay
        // single edges.
        let query = format!(
            "DELETE grants WHERE \
             in = type::record('role', $role_id) AND \
             out = type::record('permission', $permission_id); \
             RELATE role:`{role_id_str}` -> grants -> \
             permission:`{permission_id_str}`;"
        );

        self.db
            .query(query)
            .bind(("role_id", role_id_str))
            .bind(("permission_id", permission_id_str))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn revoke_from_role(&self, role_id: Uuid, permission_id: Uuid) -> SentraResult<()> {
        self.db
            .query(
                "DELETE grants WHERE \
                 in = type::record('role', $role_id) AND \
                 out = type::record('permission', $permission_id)",
            )
            .bind(("role_id", role_id.to_string()))
            .bind(("permission_id", permission_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn get_role_permissions(&self, role_id: Uuid) -> SentraResult<Vec<Permission>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM permission \
                 WHERE id IN (\
                     SELECT VALUE out FROM grants \
                     WHERE in = type::record('role', $role_id)\
                 )",
            )
            .bind(("role_id", role_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRowWithId> = result.take(0).map_err(DbError::from)?;

        let permissions = rows
            .into_iter()
            .map(|row| row.try_into_permission())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(permissions)
    }
}
