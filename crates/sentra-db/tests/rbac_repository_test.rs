//! Integration tests for Role, Resource, and Permission repositories
//! using in-memory SurrealDB.

use sentra_core::models::operation::Operation;
use sentra_core::models::permission::CreatePermission;
use sentra_core::models::resource::CreateResource;
use sentra_core::models::role::CreateRole;
use sentra_core::repository::{
    Pagination, PermissionRepository, ResourceRepository, RoleRepository,
};
use sentra_db::repository::{
    SurrealPermissionRepository, SurrealResourceRepository, SurrealRoleRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    sentra_db::run_migrations(&db).await.unwrap();
    db
}

// ---------------------------------------------------------------------------
// Role tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_and_get_role() {
    let db = setup().await;
    let repo = SurrealRoleRepository::new(db);

    let role = repo
        .create(CreateRole {
            name: "Viewer".into(),
            description: "Read-only access".into(),
        })
        .await
        .unwrap();

    assert_eq!(role.name, "Viewer");

    let fetched = repo.get_by_id(role.id).await.unwrap();
    assert_eq!(fetched.id, role.id);
    assert_eq!(fetched.name, "Viewer");

    let by_name = repo.get_by_name("Viewer").await.unwrap();
    assert_eq!(by_name.id, role.id);
}

#[tokio::test]
async fn exists_by_name() {
    let db = setup().await;
    let repo = SurrealRoleRepository::new(db);

    assert!(!repo.exists_by_name("Auditor").await.unwrap());

    repo.create(CreateRole {
        name: "Auditor".into(),
        description: "Audit access".into(),
    })
    .await
    .unwrap();

    assert!(repo.exists_by_name("Auditor").await.unwrap());
}

#[tokio::test]
async fn duplicate_role_name_rejected() {
    let db = setup().await;
    let repo = SurrealRoleRepository::new(db);

    repo.create(CreateRole {
        name: "Unique".into(),
        description: "first".into(),
    })
    .await
    .unwrap();

    let result = repo
        .create(CreateRole {
            name: "Unique".into(),
            description: "second".into(),
        })
        .await;

    assert!(result.is_err(), "duplicate role name should be rejected");
}

#[tokio::test]
async fn delete_role_is_idempotent() {
    let db = setup().await;
    let repo = SurrealRoleRepository::new(db);

    let role = repo
        .create(CreateRole {
            name: "Temp".into(),
            description: "temp".into(),
        })
        .await
        .unwrap();

    repo.delete(role.id).await.unwrap();
    assert!(repo.get_by_id(role.id).await.is_err());

    // Second delete of the same id is a no-op.
    repo.delete(role.id).await.unwrap();
}

#[tokio::test]
async fn list_roles_with_pagination() {
    let db = setup().await;
    let repo = SurrealRoleRepository::new(db);

    for i in 0..5 {
        repo.create(CreateRole {
            name: format!("role-{i}"),
            description: format!("Role {i}"),
        })
        .await
        .unwrap();
    }

    let page1 = repo
        .list(Pagination {
            offset: 0,
            limit: 3,
        })
        .await
        .unwrap();

    assert_eq!(page1.items.len(), 3);
    assert_eq!(page1.total, 5);

    let page2 = repo
        .list(Pagination {
            offset: 3,
            limit: 3,
        })
        .await
        .unwrap();

    assert_eq!(page2.items.len(), 2);
}

// ---------------------------------------------------------------------------
// Resource tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_and_get_resource() {
    let db = setup().await;
    let repo = SurrealResourceRepository::new(db);

    let resource = repo
        .create(CreateResource {
            name: "Orders".into(),
            path: "orders".into(),
            description: "Customer orders".into(),
        })
        .await
        .unwrap();

    let by_path = repo.get_by_path("orders").await.unwrap();
    assert_eq!(by_path.id, resource.id);
    assert_eq!(by_path.name, "Orders");

    assert!(repo.exists_by_name("Orders").await.unwrap());
    assert!(repo.get_by_path("unknown").await.is_err());
}

#[tokio::test]
async fn duplicate_resource_name_rejected() {
    let db = setup().await;
    let repo = SurrealResourceRepository::new(db);

    repo.create(CreateResource {
        name: "Orders".into(),
        path: "orders".into(),
        description: "first".into(),
    })
    .await
    .unwrap();

    let result = repo
        .create(CreateResource {
            name: "Orders".into(),
            path: "orders-2".into(),
            description: "second".into(),
        })
        .await;

    assert!(result.is_err(), "duplicate resource name should be rejected");
}

#[tokio::test]
async fn delete_resource_cascades_permissions() {
    let db = setup().await;
    let resource_repo = SurrealResourceRepository::new(db.clone());
    let perm_repo = SurrealPermissionRepository::new(db.clone());
    let role_repo = SurrealRoleRepository::new(db);

    let resource = resource_repo
        .create(CreateResource {
            name: "Documents".into(),
            path: "documents".into(),
            description: "Docs".into(),
        })
        .await
        .unwrap();

    let perm = perm_repo
        .create(CreatePermission {
            resource_id: resource.id,
            operation: Operation::Read,
        })
        .await
        .unwrap();

    // Grant it to a role so the cascade also covers grants edges.
    let role = role_repo
        .create(CreateRole {
            name: "DocReader".into(),
            description: "Reads docs".into(),
        })
        .await
        .unwrap();
    perm_repo.grant_to_role(role.id, perm.id).await.unwrap();

    resource_repo.delete(resource.id).await.unwrap();

    assert!(resource_repo.get_by_id(resource.id).await.is_err());
    assert!(perm_repo.get_by_id(perm.id).await.is_err());
    let remaining = perm_repo.get_role_permissions(role.id).await.unwrap();
    assert!(remaining.is_empty());
}

// ---------------------------------------------------------------------------
// Permission tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_and_lookup_permission() {
    let db = setup().await;
    let resource_repo = SurrealResourceRepository::new(db.clone());
    let perm_repo = SurrealPermissionRepository::new(db);

    let resource = resource_repo
        .create(CreateResource {
            name: "Invoices".into(),
            path: "invoices".into(),
            description: "Invoices".into(),
        })
        .await
        .unwrap();

    let perm = perm_repo
        .create(CreatePermission {
            resource_id: resource.id,
            operation: Operation::Update,
        })
        .await
        .unwrap();

    assert_eq!(perm.resource_id, resource.id);
    assert_eq!(perm.operation, Operation::Update);

    let found = perm_repo
        .get_by_resource_operation(resource.id, Operation::Update)
        .await
        .unwrap();
    assert_eq!(found.id, perm.id);

    assert!(
        perm_repo
            .get_by_resource_operation(resource.id, Operation::Delete)
            .await
            .is_err()
    );
}

#[tokio::test]
async fn duplicate_resource_operation_pair_rejected() {
    let db = setup().await;
    let resource_repo = SurrealResourceRepository::new(db.clone());
    let perm_repo = SurrealPermissionRepository::new(db);

    let resource = resource_repo
        .create(CreateResource {
            name: "Invoices".into(),
            path: "invoices".into(),
            description: "Invoices".into(),
        })
        .await
        .unwrap();

    perm_repo
        .create(CreatePermission {
            resource_id: resource.id,
            operation: Operation::Read,
        })
        .await
        .unwrap();

    let result = perm_repo
        .create(CreatePermission {
            resource_id: resource.id,
            operation: Operation::Read,
        })
        .await;

    assert!(result.is_err(), "duplicate pair should be rejected");
}

#[tokio::test]
async fn grant_and_revoke_role_permissions() {
    let db = setup().await;
    let resource_repo = SurrealResourceRepository::new(db.clone());
    let perm_repo = SurrealPermissionRepository::new(db.clone());
    let role_repo = SurrealRoleRepository::new(db);

    let resource = resource_repo
        .create(CreateResource {
            name: "Reports".into(),
            path: "reports".into(),
            description: "Reports".into(),
        })
        .await
        .unwrap();

    let role = role_repo
        .create(CreateRole {
            name: "Analyst".into(),
            description: "Analyzes reports".into(),
        })
        .await
        .unwrap();

    let perm_read = perm_repo
        .create(CreatePermission {
            resource_id: resource.id,
            operation: Operation::Read,
        })
        .await
        .unwrap();
    let perm_create = perm_repo
        .create(CreatePermission {
            resource_id: resource.id,
            operation: Operation::Create,
        })
        .await
        .unwrap();

    perm_repo.grant_to_role(role.id, perm_read.id).await.unwrap();
    perm_repo
        .grant_to_role(role.id, perm_create.id)
        .await
        .unwrap();

    let perms = perm_repo.get_role_permissions(role.id).await.unwrap();
    assert_eq!(perms.len(), 2);

    perm_repo
        .revoke_from_role(role.id, perm_read.id)
        .await
        .unwrap();

    let perms = perm_repo.get_role_permissions(role.id).await.unwrap();
    assert_eq!(perms.len(), 1);
    assert_eq!(perms[0].operation, Operation::Create);
}

#[tokio::test]
async fn repeated_grant_keeps_single_edge() {
    let db = setup().await;
    let resource_repo = SurrealResourceRepository::new(db.clone());
    let perm_repo = SurrealPermissionRepository::new(db.clone());
    let role_repo = SurrealRoleRepository::new(db);

    let resource = resource_repo
        .create(CreateResource {
            name: "Reports".into(),
            path: "reports".into(),
            description: "Reports".into(),
        })
        .await
        .unwrap();

    let role = role_repo
        .create(CreateRole {
            name: "Analyst".into(),
            description: "Analyzes reports".into(),
        })
        .await
        .unwrap();

    let perm = perm_repo
        .create(CreatePermission {
            resource_id: resource.id,
            operation: Operation::Read,
        })
        .await
        .unwrap();

    perm_repo.grant_to_role(role.id, perm.id).await.unwrap();
    perm_repo.grant_to_role(role.id, perm.id).await.unwrap();

    let perms = perm_repo.get_role_permissions(role.id).await.unwrap();
    assert_eq!(perms.len(), 1);

    // Revoking something never granted is a no-op.
    perm_repo.revoke_from_role(role.id, perm.id).await.unwrap();
    perm_repo.revoke_from_role(role.id, perm.id).await.unwrap();
}
