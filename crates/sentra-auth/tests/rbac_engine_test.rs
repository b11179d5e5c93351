//! Integration tests for the RBAC authorization engine.

use sentra_auth::RbacEngine;
use sentra_core::error::SentraError;
use sentra_core::identity::IdentityProvider;
use sentra_core::models::account::{Account, CreateAccount};
use sentra_core::models::operation::Operation;
use sentra_core::models::permission::CreatePermission;
use sentra_core::models::resource::CreateResource;
use sentra_core::models::role::CreateRole;
use sentra_core::repository::AccountRepository;
use sentra_db::repository::{
    SurrealAccountRepository, SurrealPermissionRepository, SurrealResourceRepository,
    SurrealRoleRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

type Db = surrealdb::engine::local::Db;
type Engine = RbacEngine<
    SurrealAccountRepository<Db>,
    SurrealRoleRepository<Db>,
    SurrealResourceRepository<Db>,
    SurrealPermissionRepository<Db>,
>;

async fn setup() -> (Surreal<Db>, Engine) {
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

    (db, engine)
}

async fn create_account(db: &Surreal<Db>, email: &str, subject_id: &str) -> Account {
    SurrealAccountRepository::new(db.clone())
        .create(CreateAccount {
            email: email.into(),
            display_name: "Test User".into(),
            provider: IdentityProvider::Google,
            subject_id: subject_id.into(),
            mfa_enabled: false,
            mfa_secret: None,
            using_mfa: false,
            mfa_verified_at: None,
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn unknown_email_has_no_permissions_and_is_not_admin() {
    let (_db, engine) = setup().await;

    assert!(
        !engine
            .has_permission("ghost@x.com", "orders", Operation::Read)
            .await
            .unwrap()
    );
    assert!(!engine.is_admin("ghost@x.com").await.unwrap());
}

#[tokio::test]
async fn grant_allows_and_revoke_denies() {
    let (db, engine) = setup().await;
    let account = create_account(&db, "user@x.com", "g-1").await;

    let resource = engine
        .create_resource(CreateResource {
            name: "Orders".into(),
            path: "orders".into(),
            description: "Customer orders".into(),
        })
        .await
        .unwrap();

    let permission = engine
        .create_permission(CreatePermission {
            resource_id: resource.id,
            operation: Operation::Read,
        })
        .await
        .unwrap();

    let role = engine
        .create_role(CreateRole {
            name: "Viewer".into(),
            description: "Read-only access".into(),
        })
        .await
        .unwrap();

    engine
        .assign_permission_to_role(role.id, permission.id)
        .await
        .unwrap();
    engine
        .assign_role_to_account(account.id, role.id)
        .await
        .unwrap();

    assert!(
        engine
            .has_permission("user@x.com", "orders", Operation::Read)
            .await
            .unwrap()
    );
    // Only the granted operation is allowed.
    assert!(
        !engine
            .has_permission("user@x.com", "orders", Operation::Update)
            .await
            .unwrap()
    );

    // Revoking the permission flips the check.
    engine
        .remove_permission_from_role(role.id, permission.id)
        .await
        .unwrap();
    assert!(
        !engine
            .has_permission("user@x.com", "orders", Operation::Read)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn removing_the_role_denies_access() {
    let (db, engine) = setup().await;
    let account = create_account(&db, "user@x.com", "g-1").await;

    let resource = engine
        .create_resource(CreateResource {
            name: "Orders".into(),
            path: "orders".into(),
            description: "Customer orders".into(),
        })
        .await
        .unwrap();
    let permission = engine
        .create_permission(CreatePermission {
            resource_id: resource.id,
            operation: Operation::Read,
        })
        .await
        .unwrap();
    let role = engine
        .create_role(CreateRole {
            name: "Viewer".into(),
            description: "Read-only access".into(),
        })
        .await
        .unwrap();
    engine
        .assign_permission_to_role(role.id, permission.id)
        .await
        .unwrap();
    engine
        .assign_role_to_account(account.id, role.id)
        .await
        .unwrap();

    engine
        .remove_role_from_account(account.id, role.id)
        .await
        .unwrap();
    assert!(
        !engine
            .has_permission("user@x.com", "orders", Operation::Read)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn deleting_a_role_revokes_previously_granted_access() {
    let (db, engine) = setup().await;
    let account = create_account(&db, "user@x.com", "g-1").await;

    let resource = engine
        .create_resource(CreateResource {
            name: "Orders".into(),
            path: "orders".into(),
            description: "Customer orders".into(),
        })
        .await
        .unwrap();
    let permission = engine
        .create_permission(CreatePermission {
            resource_id: resource.id,
            operation: Operation::Read,
        })
        .await
        .unwrap();
    let role = engine
        .create_role(CreateRole {
            name: "Viewer".into(),
            description: "Read-only access".into(),
        })
        .await
        .unwrap();
    engine
        .assign_permission_to_role(role.id, permission.id)
        .await
        .unwrap();
    engine
        .assign_role_to_account(account.id, role.id)
        .await
        .unwrap();
    assert!(
        engine
            .has_permission("user@x.com", "orders", Operation::Read)
            .await
            .unwrap()
    );

    engine.delete_role(role.id).await.unwrap();

    assert!(
        !engine
            .has_permission("user@x.com", "orders", Operation::Read)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn unregistered_resource_path_is_fail_open() {
    let (db, engine) = setup().await;
    create_account(&db, "user@x.com", "g-1").await;

    // Any operation on a path with no registered resource is allowed,
    // even for an account with no roles at all.
    for operation in Operation::ALL {
        assert!(
            engine
                .has_permission("user@x.com", "not-registered", operation)
                .await
                .unwrap()
        );
    }

    // But never for an email with no accounts.
    assert!(
        !engine
            .has_permission("ghost@x.com", "not-registered", Operation::Read)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn admin_role_is_detected_across_the_cluster() {
    let (db, engine) = setup().await;
    let account = create_account(&db, "admin@x.com", "g-1").await;
    // A second provider account sharing the email but without roles.
    create_account(&db, "admin@x.com", "g-2").await;

    let repo = SurrealAccountRepository::new(db.clone());
    let admin = SurrealRoleRepository::new(db);
    use sentra_core::repository::RoleRepository;
    let admin_role = admin.get_by_name("ADMIN").await.unwrap();
    repo.assign_role(account.id, admin_role.id).await.unwrap();

    assert!(engine.is_admin("admin@x.com").await.unwrap());
    assert!(!engine.is_admin("user@x.com").await.unwrap());
}

#[tokio::test]
async fn duplicate_names_and_pairs_conflict() {
    let (_db, engine) = setup().await;

    engine
        .create_role(CreateRole {
            name: "Viewer".into(),
            description: "first".into(),
        })
        .await
        .unwrap();
    let err = engine
        .create_role(CreateRole {
            name: "Viewer".into(),
            description: "second".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, SentraError::AlreadyExists { .. }));

    let resource = engine
        .create_resource(CreateResource {
            name: "Orders".into(),
            path: "orders".into(),
            description: "Orders".into(),
        })
        .await
        .unwrap();
    let err = engine
        .create_resource(CreateResource {
            name: "Orders".into(),
            path: "orders-2".into(),
            description: "dup".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, SentraError::AlreadyExists { .. }));

    engine
        .create_permission(CreatePermission {
            resource_id: resource.id,
            operation: Operation::Read,
        })
        .await
        .unwrap();
    let err = engine
        .create_permission(CreatePermission {
            resource_id: resource.id,
            operation: Operation::Read,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, SentraError::AlreadyExists { .. }));
}

#[tokio::test]
async fn permission_for_missing_resource_is_not_found() {
    let (_db, engine) = setup().await;

    let err = engine
        .create_permission(CreatePermission {
            resource_id: Uuid::new_v4(),
            operation: Operation::Read,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, SentraError::NotFound { .. }));
}

#[tokio::test]
async fn assignments_are_idempotent_and_check_ids() {
    let (db, engine) = setup().await;
    let account = create_account(&db, "user@x.com", "g-1").await;

    let role = engine
        .create_role(CreateRole {
            name: "Viewer".into(),
            description: "Read-only".into(),
        })
        .await
        .unwrap();

    engine
        .assign_role_to_account(account.id, role.id)
        .await
        .unwrap();
    engine
        .assign_role_to_account(account.id, role.id)
        .await
        .unwrap();

    let roles = engine.account_roles(account.id).await.unwrap();
    assert_eq!(roles.len(), 1);

    // Removing twice is also a no-op.
    engine
        .remove_role_from_account(account.id, role.id)
        .await
        .unwrap();
    engine
        .remove_role_from_account(account.id, role.id)
        .await
        .unwrap();

    // A dangling id, however, is an error.
    let err = engine
        .assign_role_to_account(Uuid::new_v4(), role.id)
        .await
        .unwrap_err();
    assert!(matches!(err, SentraError::NotFound { .. }));

    let err = engine
        .assign_role_to_account(account.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, SentraError::NotFound { .. }));
}

#[tokio::test]
async fn ensure_builtin_roles_is_idempotent() {
    let (_db, engine) = setup().await;

    // setup() already ran it once; a second run must not conflict.
    engine.ensure_builtin_roles().await.unwrap();

    let roles = engine
        .roles(sentra_core::repository::Pagination::default())
        .await
        .unwrap();
    let names: Vec<&str> = roles.items.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names.iter().filter(|n| **n == "ADMIN").count(),
        1,
        "ADMIN seeded exactly once"
    );
    assert_eq!(names.iter().filter(|n| **n == "USER").count(), 1);
}
