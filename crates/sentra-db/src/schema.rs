//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Accounts
--
-- One row per (provider, subject_id) pair. Email is indexed but NOT
-- unique: accounts sharing an email form an identity cluster.
-- =======================================================================
DEFINE TABLE account SCHEMAFULL;
DEFINE FIELD email ON TABLE account TYPE string;
DEFINE FIELD display_name ON TABLE account TYPE string;
DEFINE FIELD provider ON TABLE account TYPE string \
    ASSERT $value IN ['GOOGLE', 'GITHUB', 'FACEBOOK'];
DEFINE FIELD subject_id ON TABLE account TYPE string;
DEFINE FIELD mfa_enabled ON TABLE account TYPE bool DEFAULT false;
DEFINE FIELD mfa_secret ON TABLE account TYPE option<string>;
DEFINE FIELD using_mfa ON TABLE account TYPE bool DEFAULT false;
DEFINE FIELD mfa_verified_at ON TABLE account TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE account TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE account TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_account_provider_subject ON TABLE account \
    COLUMNS provider, subject_id UNIQUE;
DEFINE INDEX idx_account_email ON TABLE account COLUMNS email;

-- =======================================================================
-- Roles
-- =======================================================================
DEFINE TABLE role SCHEMAFULL;
DEFINE FIELD name ON TABLE role TYPE string;
DEFINE FIELD description ON TABLE role TYPE string;
DEFINE FIELD created_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_role_name ON TABLE role COLUMNS name UNIQUE;

-- =======================================================================
-- Resources (business entities gated by permissions)
-- =======================================================================
DEFINE TABLE resource SCHEMAFULL;
DEFINE FIELD name ON TABLE resource TYPE string;
DEFINE FIELD path ON TABLE resource TYPE string;
DEFINE FIELD description ON TABLE resource TYPE string;
DEFINE FIELD created_at ON TABLE resource TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE resource TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_resource_name ON TABLE resource COLUMNS name UNIQUE;
DEFINE INDEX idx_resource_path ON TABLE resource COLUMNS path UNIQUE;

-- =======================================================================
-- Permissions (one per resource × operation)
-- =======================================================================
DEFINE TABLE permission SCHEMAFULL;
DEFINE FIELD resource_id ON TABLE permission TYPE string;
DEFINE FIELD operation ON TABLE permission TYPE string \
    ASSERT $value IN ['CREATE', 'READ', 'UPDATE', 'DELETE'];
DEFINE FIELD created_at ON TABLE permission TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_permission_resource_operation ON TABLE permission \
    COLUMNS resource_id, operation UNIQUE;

-- =======================================================================
-- Graph Edge Tables (relations)
-- =======================================================================

-- Account -> Role assignment
DEFINE TABLE has_role TYPE RELATION SCHEMAFULL;
DEFINE INDEX idx_has_role_edge ON TABLE has_role COLUMNS in, out UNIQUE;

-- Role -> Permission grants
DEFINE TABLE grants TYPE RELATION SCHEMAFULL;
DEFINE INDEX idx_grants_edge ON TABLE grants COLUMNS in, out UNIQUE;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
