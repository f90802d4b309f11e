//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    petstore_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    for table in ["category", "tag", "pet", "store_order", "user", "_migration"] {
        assert!(info_str.contains(table), "missing {table} table");
    }
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    petstore_db::run_migrations(&db).await.unwrap();
    // Second run must skip the already-applied version.
    petstore_db::run_migrations(&db).await.unwrap();
}

#[tokio::test]
async fn pet_status_is_constrained() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    petstore_db::run_migrations(&db).await.unwrap();

    let result = db
        .query(
            "CREATE pet SET name = 'rex', status = 'lost', \
             created_by = 'system', last_modified_by = 'system'",
        )
        .await
        .unwrap()
        .check();
    assert!(result.is_err(), "status outside the enum must be rejected");
}
