//! SurrealDB implementation of [`PetRepository`].

use chrono::{DateTime, Utc};
use petstore_core::error::PetstoreResult;
use petstore_core::models::pet::{CreatePet, Pet, PetStatus, UpdatePet};
use petstore_core::pagination::{Page, PageRequest};
use petstore_core::repository::{CrudRepository, PetRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{audit_info, count_table, order_clause, parse_uuid};
use crate::error::DbError;

/// DB-side row struct; the record ID comes back via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct PetRow {
    record_id: String,
    name: String,
    status: String,
    category_id: Option<String>,
    tag_ids: Vec<String>,
    photo_urls: Vec<String>,
    created_by: String,
    created_at: DateTime<Utc>,
    last_modified_by: String,
    updated_at: DateTime<Utc>,
}

impl PetRow {
    fn try_into_pet(self) -> Result<Pet, DbError> {
        let status = self
            .status
            .parse::<PetStatus>()
            .map_err(|e| DbError::Decode(e.to_string()))?;
        let category_id = self
            .category_id
            .as_deref()
            .map(|c| parse_uuid(c, "category"))
            .transpose()?;
        let tag_ids = self
            .tag_ids
            .iter()
            .map(|t| parse_uuid(t, "tag"))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Pet {
            id: parse_uuid(&self.record_id, "pet")?,
            name: self.name,
            status,
            category_id,
            tag_ids,
            photo_urls: self.photo_urls,
            audit: audit_info(
                self.created_by,
                self.created_at,
                self.last_modified_by,
                self.updated_at,
            ),
        })
    }
}

#[derive(Debug, SurrealValue)]
struct StatusRow {
    status: String,
}

const SORT_COLUMNS: &[(&str, &str)] = &[("name", "name"), ("status", "status")];

fn uuid_strings(ids: &[Uuid]) -> Vec<String> {
    ids.iter().map(Uuid::to_string).collect()
}

/// SurrealDB implementation of the Pet repository.
#[derive(Clone)]
pub struct SurrealPetRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPetRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

/// Current status of a pet, or `None` if the pet does not exist.
pub(super) async fn status_of<C: Connection>(
    db: &Surreal<C>,
    id: Uuid,
) -> Result<Option<PetStatus>, DbError> {
    let mut result = db
        .query("SELECT status FROM type::record('pet', $id)")
        .bind(("id", id.to_string()))
        .await?;
    let rows: Vec<StatusRow> = result.take(0)?;
    rows.into_iter()
        .next()
        .map(|row| {
            row.status
                .parse::<PetStatus>()
                .map_err(|e| DbError::Decode(e.to_string()))
        })
        .transpose()
}

impl<C: Connection> CrudRepository for SurrealPetRepository<C> {
    type Entity = Pet;
    type Create = CreatePet;
    type Update = UpdatePet;

    async fn create(&self, input: CreatePet, actor: &str) -> PetstoreResult<Pet> {
        let id_str = Uuid::new_v4().to_string();
        let status = input.status.unwrap_or(PetStatus::Available);

        let result = self
            .db
            .query(
                "CREATE type::record('pet', $id) SET \
                 name = $name, status = $status, \
                 category_id = $category_id, tag_ids = $tag_ids, \
                 photo_urls = $photo_urls, \
                 created_by = $actor, last_modified_by = $actor; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('pet', $id)",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("status", status.as_str().to_string()))
            .bind(("category_id", input.category_id.map(|c| c.to_string())))
            .bind(("tag_ids", uuid_strings(&input.tag_ids)))
            .bind(("photo_urls", input.photo_urls))
            .bind(("actor", actor.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<PetRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "pet".into(),
            id: id_str,
        })?;

        Ok(row.try_into_pet()?)
    }

    async fn get_by_id(&self, id: Uuid) -> PetstoreResult<Pet> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('pet', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PetRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "pet".into(),
            id: id_str,
        })?;

        Ok(row.try_into_pet()?)
    }

    async fn update(&self, id: Uuid, input: UpdatePet, actor: &str) -> PetstoreResult<Pet> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.category_id.is_some() {
            sets.push("category_id = $category_id");
        }
        if input.tag_ids.is_some() {
            sets.push("tag_ids = $tag_ids");
        }
        if input.photo_urls.is_some() {
            sets.push("photo_urls = $photo_urls");
        }
        sets.push("last_modified_by = $actor");
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('pet', $id) SET {}; \
             SELECT meta::id(id) AS record_id, * FROM type::record('pet', $id)",
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
        if let Some(status) = input.status {
            builder = builder.bind(("status", status.as_str().to_string()));
        }
        if let Some(category_id) = input.category_id {
            // Some(None) binds NONE and clears the reference.
            builder = builder.bind(("category_id", category_id.map(|c| c.to_string())));
        }
        if let Some(tag_ids) = input.tag_ids {
            builder = builder.bind(("tag_ids", uuid_strings(&tag_ids)));
        }
        if let Some(photo_urls) = input.photo_urls {
            builder = builder.bind(("photo_urls", photo_urls));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<PetRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "pet".into(),
            id: id_str,
        })?;

        Ok(row.try_into_pet()?)
    }

    async fn delete(&self, id: Uuid) -> PetstoreResult<()> {
        self.db
            .query("DELETE type::record('pet', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self, page: PageRequest) -> PetstoreResult<Page<Pet>> {
        let total = count_table(&self.db, "pet").await?;

        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM pet {} \
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

        let rows: Vec<PetRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(PetRow::try_into_pet)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(Page {
            items,
            total,
            page: page.page,
            size: page.size,
        })
    }
}

impl<C: Connection> PetRepository for SurrealPetRepository<C> {
    async fn find_by_status(&self, statuses: &[PetStatus]) -> PetstoreResult<(Vec<Pet>, u64)> {
        let statuses: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM pet \
                 WHERE status IN $statuses ORDER BY created_at ASC",
            )
            .bind(("statuses", statuses))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PetRow> = result.take(0).map_err(DbError::from)?;
        let pets = rows
            .into_iter()
            .map(PetRow::try_into_pet)
            .collect::<Result<Vec<_>, DbError>>()?;
        let count = pets.len() as u64;

        Ok((pets, count))
    }
}
