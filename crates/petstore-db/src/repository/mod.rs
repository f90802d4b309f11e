//! SurrealDB repository implementations.

mod category;
mod order;
mod pet;
mod tag;
mod user;

pub use category::SurrealCategoryRepository;
pub use order::SurrealOrderRepository;
pub use pet::SurrealPetRepository;
pub use tag::SurrealTagRepository;
pub use user::SurrealUserRepository;

use chrono::{DateTime, Utc};
use petstore_core::models::audit::AuditInfo;
use petstore_core::pagination::Sort;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// Sortable API properties shared by every table.
const AUDIT_SORT_COLUMNS: &[(&str, &str)] = &[
    // Record ids are random UUIDs; creation order is what `id` sorting means to clients.
    ("id", "created_at"),
    ("createdDate", "created_at"),
    ("lastModifiedDate", "updated_at"),
    ("createdBy", "created_by"),
    ("lastModifiedBy", "last_modified_by"),
];

/// Build an `ORDER BY` clause from a client-supplied sort.
///
/// Only whitelisted properties reach the query text; anything else
/// falls back to creation order.
fn order_clause(sort: &Sort, extra: &[(&str, &str)]) -> String {
    let column = AUDIT_SORT_COLUMNS
        .iter()
        .chain(extra)
        .find(|(property, _)| *property == sort.property)
        .map(|(_, column)| *column)
        .unwrap_or("created_at");
    format!("ORDER BY {column} {}", sort.direction.as_sql())
}

async fn count_table<C: Connection>(db: &Surreal<C>, table: &str) -> Result<u64, DbError> {
    let mut result = db
        .query("SELECT count() AS total FROM type::table($table) GROUP ALL")
        .bind(("table", table.to_string()))
        .await?;
    let rows: Vec<CountRow> = result.take(0)?;
    Ok(rows.first().map(|r| r.total).unwrap_or(0))
}

fn parse_uuid(raw: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::Decode(format!("invalid {what} UUID: {e}")))
}

fn audit_info(
    created_by: String,
    created_at: DateTime<Utc>,
    last_modified_by: String,
    updated_at: DateTime<Utc>,
) -> AuditInfo {
    AuditInfo {
        created_by,
        created_date: created_at,
        last_modified_by,
        last_modified_date: updated_at,
    }
}

/// `true` when a SurrealDB error was raised by a UNIQUE index.
fn is_unique_violation(message: &str) -> bool {
    message.contains("already contains")
}
