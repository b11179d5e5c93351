//! Route table and middleware wiring.

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post};
use sentra_auth::PermissionRequirement;
use sentra_core::models::operation::Operation;
use surrealdb::Connection;
use tower_http::trace::TraceLayer;

use crate::handlers::{auth, health, rbac};
use crate::middleware;
use crate::state::AppState;

/// Resource path gating the administrative API. Registering a
/// resource under this path turns enforcement on for non-admins;
/// until then the engine is fail-open for it.
pub const RBAC_RESOURCE: &str = "rbac";

pub fn build_router<C: Connection>(state: AppState<C>) -> Router {
    // Ungated: liveness and the two steps of the login flow.
    let public = Router::new()
        .route("/health", get(health::health))
        .route("/api/auth/login", post(auth::login::<C>))
        .route("/api/auth/mfa/verify", post(auth::mfa_verify::<C>));

    // Authentication-only: MFA self-service for the logged-in identity.
    let mfa = Router::new()
        .route("/api/auth/mfa/setup", post(auth::mfa_setup::<C>))
        .route("/api/auth/mfa/disable", post(auth::mfa_disable::<C>))
        .route("/api/auth/mfa/status", get(auth::mfa_status::<C>))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::authenticate::<C>,
        ));

    // Administrative catalog, grouped by the operation each route
    // performs on the RBAC resource.
    let rbac_reads = Router::new()
        .route("/roles", get(rbac::list_roles::<C>))
        .route("/resources", get(rbac::list_resources::<C>))
        .route("/permissions", get(rbac::list_permissions::<C>))
        .route("/accounts", get(rbac::list_accounts::<C>))
        .route("/accounts/:account_id", get(rbac::get_account::<C>))
        .route("/operations", get(rbac::list_operations))
        .route_layer(from_fn_with_state(
            (
                state.clone(),
                PermissionRequirement::new(RBAC_RESOURCE, Operation::Read),
            ),
            middleware::require_permission::<C>,
        ));

    let rbac_creates = Router::new()
        .route("/roles", post(rbac::create_role::<C>))
        .route("/resources", post(rbac::create_resource::<C>))
        .route("/permissions", post(rbac::create_permission::<C>))
        .route_layer(from_fn_with_state(
            (
                state.clone(),
                PermissionRequirement::new(RBAC_RESOURCE, Operation::Create),
            ),
            middleware::require_permission::<C>,
        ));

    let rbac_deletes = Router::new()
        .route("/roles/:role_id", delete(rbac::delete_role::<C>))
        .route(
            "/resources/:resource_id",
            delete(rbac::delete_resource::<C>),
        )
        .route(
            "/permissions/:permission_id",
            delete(rbac::delete_permission::<C>),
        )
        .route_layer(from_fn_with_state(
            (
                state.clone(),
                PermissionRequirement::new(RBAC_RESOURCE, Operation::Delete),
            ),
            middleware::require_permission::<C>,
        ));

    let rbac_updates = Router::new()
        .route(
            "/roles/:role_id/permissions/:permission_id",
            post(rbac::assign_permission_to_role::<C>)
                .delete(rbac::remove_permission_from_role::<C>),
        )
        .route(
            "/accounts/:account_id/roles/:role_id",
            post(rbac::assign_role_to_account::<C>)
                .delete(rbac::remove_role_from_account::<C>),
        )
        .route_layer(from_fn_with_state(
            (
                state.clone(),
                PermissionRequirement::new(RBAC_RESOURCE, Operation::Update),
            ),
            middleware::require_permission::<C>,
        ));

    // Authentication wraps the whole administrative subtree, running
    // before the per-group permission layers.
    let rbac_routes = Router::new()
        .merge(rbac_reads)
        .merge(rbac_creates)
        .merge(rbac_deletes)
        .merge(rbac_updates)
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::authenticate::<C>,
        ));

    Router::new()
        .merge(public)
        .merge(mfa)
        .nest("/api/rbac", rbac_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
