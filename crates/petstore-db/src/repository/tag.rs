//! SurrealDB implementation of the Tag repository.

use chrono::{DateTime, Utc};
use petstore_core::error::PetstoreResult;
use petstore_core::models::tag::{Tag, CreateTag, UpdateTag};
use petstore_core::pagination::{Page, PageRequest};
use petstore_core::repository::CrudRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{audit_info, count_table, order_clause, parse_uuid};
use crate::error::DbError;

/// DB-side row struct; the record ID comes back via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct TagRow {
    record_id: String,
    name: Option<String>,
    created_by: String,
    created_at: DateTime<Utc>,
    last_modified_by: String,
    updated_at: DateTime<Utc>,
}

impl TagRow {
    fn try_into_tag(self) -> Result<Tag, DbError> {
        Ok(Tag {
            id: parse_uuid(&self.record_id, "tag")?,
            name: self.name,
            audit: audit_info(
                self.created_by,
                self.created_at,
                self.last_modified_by,
                self.updated_at,
            ),
        })
    }
}

const SORT_COLUMNS: &[(&str, &str)] = &[("name", "name")];

/// SurrealDB implementation of the Tag repository.
#[derive(Clone)]
pub struct SurrealTagRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTagRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CrudRepository for SurrealTagRepository<C> {
    type Entity = Tag;
    type Create = CreateTag;
    type Update = UpdateTag;

    async fn create(&self, input: CreateTag, actor: &str) -> PetstoreResult<Tag> {
        let id_str = Uuid::new_v4().to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('tag', $id) SET \
                 name = $name, created_by = $actor, last_modified_by = $actor; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('tag', $id)",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("actor", actor.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TagRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tag".into(),
            id: id_str,
        })?;

        Ok(row.try_into_tag()?)
    }

    async fn get_by_id(&self, id: Uuid) -> PetstoreResult<Tag> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('tag', $id)",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TagRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tag".into(),
            id: id_str,
        })?;

        Ok(row.try_into_tag()?)
    }

    async fn update(&self, id: Uuid, input: UpdateTag, actor: &str) -> PetstoreResult<Tag> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        sets.push("last_modified_by = $actor");
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('tag', $id) SET {}; \
             SELECT meta::id(id) AS record_id, * \
             FROM type::record('tag', $id)",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("actor", actor.to_string()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TagRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tag".into(),
            id: id_str,
        })?;

        Ok(row.try_into_tag()?)
    }

    async fn delete(&self, id: Uuid) -> PetstoreResult<()> {
        self.db
            .query("DELETE type::record('tag', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self, page: PageRequest) -> PetstoreResult<Page<Tag>> {
        let total = count_table(&self.db, "tag").await?;

        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM tag {} \
             LIMIT $limit START $offset",
            order_clause(&page.sort, SORT_COLUMNS)
        );
        let mut result = self
            .db
            .query(&query)
            .bind(("limit", page.size))
            .bind(("offset", page.offset()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TagRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(TagRow::try_into_tag)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(Page {
            items,
            total,
            page: page.page,
            size: page.size,
        })
    }
}
