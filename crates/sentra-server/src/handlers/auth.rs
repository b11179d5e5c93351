//! Login resolution and MFA lifecycle endpoints.

use axum::extract::State;
use axum::{Extension, Json};
use sentra_auth::MfaStatus;
use sentra_auth::token;
use sentra_core::error::SentraError;
use sentra_core::identity::{AuthenticatedIdentity, IdentityAssertion, IdentityProvider};
use serde::{Deserialize, Serialize};
use surrealdb::Connection;

use crate::error::ApiError;
use crate::state::AppState;

/// The post-handshake payload from the OAuth collaborator: which
/// provider authenticated, and the raw attribute map it returned.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub provider: IdentityProvider,
    pub attributes: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub email: String,
    pub mfa_required: bool,
    /// Present only when no second factor is pending.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Resolve a provider login to an account.
///
/// Accounts with MFA enabled get no token yet — the client proceeds to
/// code verification, which issues one.
pub async fn login<C: Connection>(
    State(state): State<AppState<C>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let assertion = IdentityAssertion::from_attributes(request.provider, &request.attributes)?;
    let account = state.resolver.resolve(assertion).await?;

    let token = if account.mfa_enabled {
        None
    } else {
        let token = token::issue_token(&account.email, &state.auth_config)
            .map_err(SentraError::from)?;
        Some(token)
    };

    Ok(Json(LoginResponse {
        mfa_required: account.mfa_enabled,
        email: account.email,
        token,
    }))
}

#[derive(Debug, Serialize)]
pub struct MfaSetupResponse {
    pub secret: String,
    pub provisioning_uri: String,
}

pub async fn mfa_setup<C: Connection>(
    State(state): State<AppState<C>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
) -> Result<Json<MfaSetupResponse>, ApiError> {
    let enrollment = state.mfa.begin_setup(&identity.email).await?;

    Ok(Json(MfaSetupResponse {
        secret: enrollment.secret,
        provisioning_uri: enrollment.provisioning_uri,
    }))
}

#[derive(Debug, Deserialize)]
pub struct MfaVerifyRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct MfaVerifyResponse {
    pub message: String,
    pub token: String,
    pub mfa_enabled: bool,
}

/// Verify a TOTP code mid-login. Deliberately unauthenticated: the
/// caller holds no token until the second factor succeeds.
pub async fn mfa_verify<C: Connection>(
    State(state): State<AppState<C>>,
    Json(request): Json<MfaVerifyRequest>,
) -> Result<Json<MfaVerifyResponse>, ApiError> {
    let token = state
        .mfa
        .verify_and_enable(&request.email, &request.code)
        .await?;

    Ok(Json(MfaVerifyResponse {
        message: "MFA enabled".into(),
        token,
        mfa_enabled: true,
    }))
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn mfa_disable<C: Connection>(
    State(state): State<AppState<C>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.mfa.disable(&identity.email).await?;

    Ok(Json(MessageResponse {
        message: "MFA disabled".into(),
    }))
}

pub async fn mfa_status<C: Connection>(
    State(state): State<AppState<C>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
) -> Result<Json<MfaStatus>, ApiError> {
    Ok(Json(state.mfa.status(&identity.email).await?))
}
