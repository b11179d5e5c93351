//! Per-request authentication and authorization boundary.
//!
//! The gate sits between the transport layer and the RBAC engine:
//! it turns an `Authorization` header into an [`AuthenticatedIdentity`]
//! and enforces a route's [`PermissionRequirement`]. Routes without a
//! requirement are authentication-only.

use sentra_core::error::{SentraError, SentraResult};
use sentra_core::identity::AuthenticatedIdentity;
use sentra_core::models::operation::Operation;
use sentra_core::repository::{
    AccountRepository, PermissionRepository, ResourceRepository, RoleRepository,
};
use tracing::{debug, warn};

use crate::config::AuthConfig;
use crate::rbac::RbacEngine;
use crate::token;

/// The (resource, operation) pair a protected route requires.
#[derive(Debug, Clone)]
pub struct PermissionRequirement {
    /// Path of the registered resource (e.g. "orders").
    pub resource: String,
    pub operation: Operation,
}

impl PermissionRequirement {
    pub fn new(resource: impl Into<String>, operation: Operation) -> Self {
        Self {
            resource: resource.into(),
            operation,
        }
    }
}

/// Extract the token from an `Authorization: Bearer …` header value.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    header.and_then(|value| value.strip_prefix("Bearer "))
}

/// Request gate: validates bearer tokens and enforces permission
/// requirements against the RBAC engine.
pub struct RequestGate<A, R, S, P>
where
    A: AccountRepository,
    R: RoleRepository,
    S: ResourceRepository,
    P: PermissionRepository,
{
    engine: RbacEngine<A, R, S, P>,
    config: AuthConfig,
}

impl<A, R, S, P> RequestGate<A, R, S, P>
where
    A: AccountRepository,
    R: RoleRepository,
    S: ResourceRepository,
    P: PermissionRepository,
{
    pub fn new(engine: RbacEngine<A, R, S, P>, config: AuthConfig) -> Self {
        Self { engine, config }
    }

    /// The engine backing this gate, for callers that also manage the
    /// catalog.
    pub fn engine(&self) -> &RbacEngine<A, R, S, P> {
        &self.engine
    }

    /// Authenticate a request from its `Authorization` header value.
    ///
    /// A missing, malformed, expired, or otherwise invalid token is an
    /// authentication failure — the transport maps it to 401.
    pub fn authenticate(&self, authorization: Option<&str>) -> SentraResult<AuthenticatedIdentity> {
        let token = bearer_token(authorization).ok_or_else(|| {
            SentraError::AuthenticationFailed {
                reason: "missing bearer token".into(),
            }
        })?;

        Ok(token::validate_token(token, &self.config)?)
    }

    /// Authorize an authenticated identity against a route requirement.
    ///
    /// Accounts holding the `ADMIN` role bypass the permission check
    /// entirely; everyone else must hold a matching permission. Denial
    /// maps to 403 at the transport.
    pub async fn authorize(
        &self,
        identity: &AuthenticatedIdentity,
        requirement: &PermissionRequirement,
    ) -> SentraResult<()> {
        if self.engine.is_admin(&identity.email).await? {
            debug!(
                email = %identity.email,
                resource = %requirement.resource,
                "Admin bypass"
            );
            return Ok(());
        }

        if self
            .engine
            .has_permission(&identity.email, &requirement.resource, requirement.operation)
            .await?
        {
            debug!(
                email = %identity.email,
                resource = %requirement.resource,
                operation = %requirement.operation,
                "Permission granted"
            );
            return Ok(());
        }

        warn!(
            email = %identity.email,
            resource = %requirement.resource,
            operation = %requirement.operation,
            "Insufficient permissions"
        );
        Err(SentraError::AuthorizationDenied {
            reason: format!(
                "{} on {} requires an explicit permission",
                requirement.operation, requirement.resource
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_strips_prefix() {
        assert_eq!(bearer_token(Some("Bearer abc.def")), Some("abc.def"));
    }

    #[test]
    fn bearer_token_rejects_other_schemes() {
        assert_eq!(bearer_token(Some("Basic dXNlcg==")), None);
        assert_eq!(bearer_token(Some("bearer abc")), None);
        assert_eq!(bearer_token(None), None);
    }
}
