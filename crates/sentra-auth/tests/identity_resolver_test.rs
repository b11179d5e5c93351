//! Integration tests for identity cluster resolution.

use sentra_auth::IdentityResolver;
use sentra_auth::RbacEngine;
use sentra_core::error::SentraError;
use sentra_core::identity::{IdentityAssertion, IdentityProvider};
use sentra_core::models::account::MfaUpdate;
use sentra_core::repository::{AccountRepository, RoleRepository};
use sentra_db::repository::{
    SurrealAccountRepository, SurrealPermissionRepository, SurrealResourceRepository,
    SurrealRoleRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

type Db = surrealdb::engine::local::Db;

/// Spin up in-memory DB, run migrations, and seed the built-in roles.
async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    sentra_db::run_migrations(&db).await.unwrap();

    let engine = RbacEngine::new(
        SurrealAccountRepository::new(db.clone()),
        SurrealRoleRepository::new(db.clone()),
        SurrealResourceRepository::new(db.clone()),
        SurrealPermissionRepository::new(db.clone()),
    );
    engine.ensure_builtin_roles().await.unwrap();

    db
}

fn resolver(db: &Surreal<Db>) -> IdentityResolver<SurrealAccountRepository<Db>, SurrealRoleRepository<Db>> {
    IdentityResolver::new(
        SurrealAccountRepository::new(db.clone()),
        SurrealRoleRepository::new(db.clone()),
    )
}

fn assertion(
    provider: IdentityProvider,
    subject_id: &str,
    email: &str,
) -> IdentityAssertion {
    IdentityAssertion {
        provider,
        subject_id: subject_id.into(),
        email: email.into(),
        display_name: "Test User".into(),
    }
}

#[tokio::test]
async fn first_account_ever_becomes_admin() {
    let db = setup().await;
    let resolver = resolver(&db);
    let account_repo = SurrealAccountRepository::new(db);

    let account = resolver
        .resolve(assertion(IdentityProvider::Google, "g-1", "a@x.com"))
        .await
        .unwrap();

    assert_eq!(account.email, "a@x.com");
    assert!(!account.mfa_enabled);

    // Role set is exactly {ADMIN}, the USER default notwithstanding.
    let roles = account_repo.get_roles(account.id).await.unwrap();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0].name, "ADMIN");
}

#[tokio::test]
async fn later_accounts_get_the_default_user_role() {
    let db = setup().await;
    let resolver = resolver(&db);
    let account_repo = SurrealAccountRepository::new(db);

    resolver
        .resolve(assertion(IdentityProvider::Google, "g-1", "first@x.com"))
        .await
        .unwrap();

    let second = resolver
        .resolve(assertion(IdentityProvider::Google, "g-2", "second@x.com"))
        .await
        .unwrap();

    let roles = account_repo.get_roles(second.id).await.unwrap();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0].name, "USER");
}

#[tokio::test]
async fn repeated_login_returns_the_stored_account() {
    let db = setup().await;
    let resolver = resolver(&db);
    let account_repo = SurrealAccountRepository::new(db);

    let first = resolver
        .resolve(assertion(IdentityProvider::Github, "gh-7", "a@x.com"))
        .await
        .unwrap();
    let again = resolver
        .resolve(assertion(IdentityProvider::Github, "gh-7", "a@x.com"))
        .await
        .unwrap();

    assert_eq!(first.id, again.id);
    assert_eq!(account_repo.count().await.unwrap(), 1);
}

#[tokio::test]
async fn new_cluster_member_inherits_mfa_state_and_roles() {
    let db = setup().await;
    let resolver = resolver(&db);
    let account_repo = SurrealAccountRepository::new(db);

    let first = resolver
        .resolve(assertion(IdentityProvider::Google, "g-1", "shared@x.com"))
        .await
        .unwrap();

    // Enable MFA on the existing cluster member.
    account_repo
        .update_mfa_by_email(
            "shared@x.com",
            MfaUpdate {
                mfa_enabled: Some(true),
                using_mfa: Some(true),
                mfa_secret: Some(Some("JBSWY3DPEHPK3PXP".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // Same email, different provider and subject id.
    let second = resolver
        .resolve(assertion(IdentityProvider::Github, "gh-2", "shared@x.com"))
        .await
        .unwrap();

    assert_ne!(first.id, second.id);
    assert!(second.mfa_enabled);
    assert!(second.using_mfa);
    assert_eq!(second.mfa_secret.as_deref(), Some("JBSWY3DPEHPK3PXP"));

    // Roles are seeded from the oldest cluster member at creation.
    let first_roles = account_repo.get_roles(first.id).await.unwrap();
    let second_roles = account_repo.get_roles(second.id).await.unwrap();
    let mut first_names: Vec<String> = first_roles.into_iter().map(|r| r.name).collect();
    let mut second_names: Vec<String> = second_roles.into_iter().map(|r| r.name).collect();
    first_names.sort();
    second_names.sort();
    assert_eq!(first_names, second_names);
}

#[tokio::test]
async fn roles_are_not_resynchronized_after_creation() {
    let db = setup().await;
    let resolver = resolver(&db);
    let account_repo = SurrealAccountRepository::new(db.clone());
    let role_repo = SurrealRoleRepository::new(db);

    let first = resolver
        .resolve(assertion(IdentityProvider::Google, "g-1", "shared@x.com"))
        .await
        .unwrap();
    let second = resolver
        .resolve(assertion(IdentityProvider::Github, "gh-2", "shared@x.com"))
        .await
        .unwrap();

    // Granting a role to one member afterwards stays local to it.
    let user_role = role_repo.get_by_name("USER").await.unwrap();
    account_repo
        .assign_role(second.id, user_role.id)
        .await
        .unwrap();

    let first_roles = account_repo.get_roles(first.id).await.unwrap();
    assert!(first_roles.iter().all(|r| r.name != "USER"));
}

#[tokio::test]
async fn missing_user_role_is_a_fatal_configuration_error() {
    // No role seeding at all.
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    sentra_db::run_migrations(&db).await.unwrap();

    // Avoid the first-account ADMIN branch: the USER lookup fails
    // before it is reached.
    let resolver = resolver(&db);
    let err = resolver
        .resolve(assertion(IdentityProvider::Google, "g-1", "a@x.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, SentraError::Configuration(_)), "got {err:?}");
}

#[tokio::test]
async fn missing_admin_role_is_a_fatal_configuration_error() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    sentra_db::run_migrations(&db).await.unwrap();

    // Seed only USER so resolution reaches the first-account branch.
    use sentra_core::models::role::CreateRole;
    SurrealRoleRepository::new(db.clone())
        .create(CreateRole {
            name: "USER".into(),
            description: "Regular user".into(),
        })
        .await
        .unwrap();

    let resolver = resolver(&db);
    let err = resolver
        .resolve(assertion(IdentityProvider::Google, "g-1", "a@x.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, SentraError::Configuration(_)), "got {err:?}");
}
