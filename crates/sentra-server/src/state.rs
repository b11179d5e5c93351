//! Shared application state.

use std::sync::Arc;

use sentra_auth::{AuthConfig, IdentityResolver, MfaService, RbacEngine, RequestGate};
use sentra_db::repository::{
    SurrealAccountRepository, SurrealPermissionRepository, SurrealResourceRepository,
    SurrealRoleRepository,
};
use surrealdb::{Connection, Surreal};

pub type Engine<C> = RbacEngine<
    SurrealAccountRepository<C>,
    SurrealRoleRepository<C>,
    SurrealResourceRepository<C>,
    SurrealPermissionRepository<C>,
>;

pub type Gate<C> = RequestGate<
    SurrealAccountRepository<C>,
    SurrealRoleRepository<C>,
    SurrealResourceRepository<C>,
    SurrealPermissionRepository<C>,
>;

pub type Resolver<C> = IdentityResolver<SurrealAccountRepository<C>, SurrealRoleRepository<C>>;

pub type Mfa<C> = MfaService<SurrealAccountRepository<C>>;

/// Application state shared by every handler.
///
/// Generic over the SurrealDB connection type so the router can be
/// exercised against the in-memory engine in tests.
pub struct AppState<C: Connection> {
    pub gate: Arc<Gate<C>>,
    pub resolver: Arc<Resolver<C>>,
    pub mfa: Arc<Mfa<C>>,
    pub auth_config: AuthConfig,
}

impl<C: Connection> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            gate: Arc::clone(&self.gate),
            resolver: Arc::clone(&self.resolver),
            mfa: Arc::clone(&self.mfa),
            auth_config: self.auth_config.clone(),
        }
    }
}

impl<C: Connection> AppState<C> {
    pub fn new(db: Surreal<C>, auth_config: AuthConfig) -> Self {
        let engine = RbacEngine::new(
            SurrealAccountRepository::new(db.clone()),
            SurrealRoleRepository::new(db.clone()),
            SurrealResourceRepository::new(db.clone()),
            SurrealPermissionRepository::new(db.clone()),
        );

        Self {
            gate: Arc::new(RequestGate::new(engine, auth_config.clone())),
            resolver: Arc::new(IdentityResolver::new(
                SurrealAccountRepository::new(db.clone()),
                SurrealRoleRepository::new(db.clone()),
            )),
            mfa: Arc::new(MfaService::new(
                SurrealAccountRepository::new(db),
                auth_config.clone(),
            )),
            auth_config,
        }
    }
}
