//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode. UUIDs are stored as
//! strings; enums are stored as their lowercase wire names with ASSERT
//! constraints. Every table carries the same four audit fields.

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
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Categories
-- =======================================================================
DEFINE TABLE category SCHEMAFULL;
DEFINE FIELD name ON TABLE category TYPE option<string>;
DEFINE FIELD created_by ON TABLE category TYPE string;
DEFINE FIELD created_at ON TABLE category TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD last_modified_by ON TABLE category TYPE string;
DEFINE FIELD updated_at ON TABLE category TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Tags
-- =======================================================================
DEFINE TABLE tag SCHEMAFULL;
DEFINE FIELD name ON TABLE tag TYPE option<string>;
DEFINE FIELD created_by ON TABLE tag TYPE string;
DEFINE FIELD created_at ON TABLE tag TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD last_modified_by ON TABLE tag TYPE string;
DEFINE FIELD updated_at ON TABLE tag TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Pets
-- =======================================================================
DEFINE TABLE pet SCHEMAFULL;
DEFINE FIELD name ON TABLE pet TYPE string;
DEFINE FIELD status ON TABLE pet TYPE string \
    ASSERT $value IN ['available', 'pending', 'sold'];
DEFINE FIELD category_id ON TABLE pet TYPE option<string>;
DEFINE FIELD tag_ids ON TABLE pet TYPE array<string> DEFAULT [];
DEFINE FIELD photo_urls ON TABLE pet TYPE array<string> DEFAULT [];
DEFINE FIELD created_by ON TABLE pet TYPE string;
DEFINE FIELD created_at ON TABLE pet TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD last_modified_by ON TABLE pet TYPE string;
DEFINE FIELD updated_at ON TABLE pet TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_pet_status ON TABLE pet COLUMNS status;

-- =======================================================================
-- Orders
-- =======================================================================
DEFINE TABLE store_order SCHEMAFULL;
DEFINE FIELD pet_id ON TABLE store_order TYPE string;
DEFINE FIELD quantity ON TABLE store_order TYPE option<int>;
DEFINE FIELD ship_date ON TABLE store_order TYPE option<string>;
DEFINE FIELD status ON TABLE store_order TYPE string \
    ASSERT $value IN ['placed', 'approved', 'delivered'];
DEFINE FIELD complete ON TABLE store_order TYPE bool DEFAULT false;
DEFINE FIELD created_by ON TABLE store_order TYPE string;
DEFINE FIELD created_at ON TABLE store_order TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD last_modified_by ON TABLE store_order TYPE string;
DEFINE FIELD updated_at ON TABLE store_order TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_order_pet ON TABLE store_order COLUMNS pet_id;

-- =======================================================================
-- Users
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD login ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD first_name ON TABLE user TYPE option<string>;
DEFINE FIELD last_name ON TABLE user TYPE option<string>;
DEFINE FIELD email ON TABLE user TYPE option<string>;
DEFINE FIELD phone ON TABLE user TYPE option<string>;
DEFINE FIELD activated ON TABLE user TYPE bool DEFAULT true;
DEFINE FIELD authorities ON TABLE user TYPE array<string> DEFAULT [];
DEFINE FIELD created_by ON TABLE user TYPE string;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD last_modified_by ON TABLE user TYPE string;
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_login ON TABLE user COLUMNS login UNIQUE;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

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

        db.query("CREATE _migration SET version = $version, name = $name")
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

        info!(version = migration.version, "Migration applied successfully");
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_v1_defines_every_table() {
        for table in ["category", "tag", "pet", "store_order", "user"] {
            assert!(
                SCHEMA_V1.contains(&format!("DEFINE TABLE {table} SCHEMAFULL")),
                "missing table {table}"
            );
        }
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }
}
