//! RBAC catalog administration endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use sentra_core::models::account::Account;
use sentra_core::models::operation::Operation;
use sentra_core::models::permission::{CreatePermission, Permission};
use sentra_core::models::resource::{CreateResource, Resource};
use sentra_core::models::role::{CreateRole, Role};
use sentra_core::repository::Pagination;
use serde::{Deserialize, Serialize};
use surrealdb::Connection;
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::auth::MessageResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl From<PageParams> for Pagination {
    fn from(params: PageParams) -> Self {
        let default = Pagination::default();
        Pagination {
            offset: params.offset.unwrap_or(default.offset),
            limit: params.limit.unwrap_or(default.limit),
        }
    }
}

// ==================== roles ====================

pub async fn create_role<C: Connection>(
    State(state): State<AppState<C>>,
    Json(input): Json<CreateRole>,
) -> Result<Json<Role>, ApiError> {
    Ok(Json(state.gate.engine().create_role(input).await?))
}

pub async fn list_roles<C: Connection>(
    State(state): State<AppState<C>>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<Role>>, ApiError> {
    let page = state.gate.engine().roles(params.into()).await?;
    Ok(Json(page.items))
}

pub async fn delete_role<C: Connection>(
    State(state): State<AppState<C>>,
    Path(role_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.gate.engine().delete_role(role_id).await?;
    Ok(Json(MessageResponse {
        message: "Role deleted".into(),
    }))
}

// ==================== resources ====================

pub async fn create_resource<C: Connection>(
    State(state): State<AppState<C>>,
    Json(input): Json<CreateResource>,
) -> Result<Json<Resource>, ApiError> {
    Ok(Json(state.gate.engine().create_resource(input).await?))
}

pub async fn list_resources<C: Connection>(
    State(state): State<AppState<C>>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<Resource>>, ApiError> {
    let page = state.gate.engine().resources(params.into()).await?;
    Ok(Json(page.items))
}

pub async fn delete_resource<C: Connection>(
    State(state): State<AppState<C>>,
    Path(resource_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.gate.engine().delete_resource(resource_id).await?;
    Ok(Json(MessageResponse {
        message: "Resource deleted".into(),
    }))
}

// ==================== permissions ====================

pub async fn create_permission<C: Connection>(
    State(state): State<AppState<C>>,
    Json(input): Json<CreatePermission>,
) -> Result<Json<Permission>, ApiError> {
    Ok(Json(state.gate.engine().create_permission(input).await?))
}

pub async fn list_permissions<C: Connection>(
    State(state): State<AppState<C>>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<Permission>>, ApiError> {
    let page = state.gate.engine().permissions(params.into()).await?;
    Ok(Json(page.items))
}

pub async fn delete_permission<C: Connection>(
    State(state): State<AppState<C>>,
    Path(permission_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.gate.engine().delete_permission(permission_id).await?;
    Ok(Json(MessageResponse {
        message: "Permission deleted".into(),
    }))
}

// ==================== assignments ====================

pub async fn assign_permission_to_role<C: Connection>(
    State(state): State<AppState<C>>,
    Path((role_id, permission_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .gate
        .engine()
        .assign_permission_to_role(role_id, permission_id)
        .await?;
    Ok(Json(MessageResponse {
        message: "Permission assigned to role".into(),
    }))
}

pub async fn remove_permission_from_role<C: Connection>(
    State(state): State<AppState<C>>,
    Path((role_id, permission_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .gate
        .engine()
        .remove_permission_from_role(role_id, permission_id)
        .await?;
    Ok(Json(MessageResponse {
        message: "Permission removed from role".into(),
    }))
}

pub async fn assign_role_to_account<C: Connection>(
    State(state): State<AppState<C>>,
    Path((account_id, role_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .gate
        .engine()
        .assign_role_to_account(account_id, role_id)
        .await?;
    Ok(Json(MessageResponse {
        message: "Role assigned to account".into(),
    }))
}

pub async fn remove_role_from_account<C: Connection>(
    State(state): State<AppState<C>>,
    Path((account_id, role_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .gate
        .engine()
        .remove_role_from_account(account_id, role_id)
        .await?;
    Ok(Json(MessageResponse {
        message: "Role removed from account".into(),
    }))
}

// ==================== accounts ====================

pub async fn list_accounts<C: Connection>(
    State(state): State<AppState<C>>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<Account>>, ApiError> {
    let page = state.gate.engine().accounts(params.into()).await?;
    Ok(Json(page.items))
}

#[derive(Debug, Serialize)]
pub struct AccountDetail {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub roles: Vec<Role>,
}

pub async fn get_account<C: Connection>(
    State(state): State<AppState<C>>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<AccountDetail>, ApiError> {
    let engine = state.gate.engine();
    let account = engine.account(account_id).await?;
    let roles = engine.account_roles(account_id).await?;

    Ok(Json(AccountDetail {
        id: account.id,
        email: account.email,
        display_name: account.display_name,
        roles,
    }))
}

// ==================== operations ====================

pub async fn list_operations() -> Json<[Operation; 4]> {
    Json(Operation::ALL)
}
