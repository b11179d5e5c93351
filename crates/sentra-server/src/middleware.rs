//! Request middleware: bearer authentication and per-route permission
//! enforcement.

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use sentra_auth::PermissionRequirement;
use sentra_core::error::SentraError;
use sentra_core::identity::AuthenticatedIdentity;
use surrealdb::Connection;

use crate::error::ApiError;
use crate::state::AppState;

/// Require a valid bearer token and store the authenticated identity
/// in request extensions for handlers and downstream middleware.
pub async fn authenticate<C: Connection>(
    State(state): State<AppState<C>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let identity = state.gate.authenticate(authorization)?;
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// Enforce a route's permission requirement against the gate.
///
/// Must run after [`authenticate`]; the requirement travels in the
/// middleware state alongside the application state.
pub async fn require_permission<C: Connection>(
    State((state, requirement)): State<(AppState<C>, PermissionRequirement)>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = req
        .extensions()
        .get::<AuthenticatedIdentity>()
        .cloned()
        .ok_or_else(|| SentraError::AuthenticationFailed {
            reason: "request is not authenticated".into(),
        })?;

    state.gate.authorize(&identity, &requirement).await?;

    Ok(next.run(req).await)
}
