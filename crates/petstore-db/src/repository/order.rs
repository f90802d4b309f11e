//! SurrealDB implementation of [`OrderRepository`].
//!
//! Orders live in the `store_order` table (`order` is a SurrealQL
//! keyword). Placement writes the order and flips the pet to `sold` in a
//! single transaction whose pet update is guarded on `status =
//! 'available'`, so a pet can back at most one placed order.

use chrono::{DateTime, Utc};
use petstore_core::error::{PetstoreError, PetstoreResult};
use petstore_core::models::order::{CreateOrder, Order, OrderStatus, UpdateOrder};
use petstore_core::models::pet::PetStatus;
use petstore_core::pagination::{Page, PageRequest};
use petstore_core::repository::{CrudRepository, OrderRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, warn};
use uuid::Uuid;

use super::pet::status_of;
use super::{audit_info, count_table, order_clause, parse_uuid};
use crate::error::DbError;

/// DB-side row struct; the record ID comes back via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct OrderRow {
    record_id: String,
    pet_id: String,
    quantity: Option<i64>,
    ship_date: Option<String>,
    status: String,
    complete: bool,
    created_by: String,
    created_at: DateTime<Utc>,
    last_modified_by: String,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn try_into_order(self) -> Result<Order, DbError> {
        let status = self
            .status
            .parse::<OrderStatus>()
            .map_err(|e| DbError::Decode(e.to_string()))?;

        Ok(Order {
            id: parse_uuid(&self.record_id, "order")?,
            pet_id: parse_uuid(&self.pet_id, "pet")?,
            quantity: self.quantity,
            ship_date: self.ship_date,
            status,
            complete: self.complete,
            audit: audit_info(
                self.created_by,
                self.created_at,
                self.last_modified_by,
                self.updated_at,
            ),
        })
    }
}

const SORT_COLUMNS: &[(&str, &str)] = &[
    ("petId", "pet_id"),
    ("quantity", "quantity"),
    ("shipDate", "ship_date"),
    ("status", "status"),
    ("complete", "complete"),
];

const CREATE_ORDER: &str = "\
CREATE type::record('store_order', $id) SET \
    pet_id = $pet_id, quantity = $quantity, ship_date = $ship_date, \
    status = $status, complete = $complete, \
    created_by = $actor, last_modified_by = $actor;";

/// Order insert followed by the guarded pet transition. The THROW aborts
/// the transaction (and with it the order) when the pet was not available.
const PLACE_ORDER: &str = "\
BEGIN TRANSACTION;
CREATE type::record('store_order', $id) SET \
    pet_id = $pet_id, quantity = $quantity, ship_date = $ship_date, \
    status = $status, complete = $complete, \
    created_by = $actor, last_modified_by = $actor;
LET $sold = (UPDATE type::record('pet', $pet_id) SET \
    status = 'sold', last_modified_by = $actor, updated_at = time::now() \
    WHERE status = 'available');
IF array::len($sold) = 0 { THROW 'pet is no longer available' };
COMMIT TRANSACTION;";

/// SurrealDB implementation of the Order repository.
#[derive(Clone)]
pub struct SurrealOrderRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOrderRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn insert(&self, sql: &str, id: Uuid, input: CreateOrder, actor: &str) -> Result<(), surrealdb::Error> {
        self.db
            .query(sql)
            .bind(("id", id.to_string()))
            .bind(("pet_id", input.pet_id.to_string()))
            .bind(("quantity", input.quantity))
            .bind(("ship_date", input.ship_date))
            .bind(("status", input.status.unwrap_or_default().as_str().to_string()))
            .bind(("complete", input.complete.unwrap_or(false)))
            .bind(("actor", actor.to_string()))
            .await?
            .check()?;
        Ok(())
    }
}

impl<C: Connection> CrudRepository for SurrealOrderRepository<C> {
    type Entity = Order;
    type Create = CreateOrder;
    type Update = UpdateOrder;

    /// Plain insert without touching the pet. Order placement goes
    /// through [`OrderRepository::place`].
    async fn create(&self, input: CreateOrder, actor: &str) -> PetstoreResult<Order> {
        let id = Uuid::new_v4();
        self.insert(CREATE_ORDER, id, input, actor)
            .await
            .map_err(|e| DbError::Query(e.to_string()))?;
        self.get_by_id(id).await
    }

    async fn get_by_id(&self, id: Uuid) -> PetstoreResult<Order> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('store_order', $id)",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrderRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "order".into(),
            id: id_str,
        })?;

        Ok(row.try_into_order()?)
    }

    async fn update(&self, id: Uuid, input: UpdateOrder, actor: &str) -> PetstoreResult<Order> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.pet_id.is_some() {
            sets.push("pet_id = $pet_id");
        }
        if input.quantity.is_some() {
            sets.push("quantity = $quantity");
        }
        if input.ship_date.is_some() {
            sets.push("ship_date = $ship_date");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.complete.is_some() {
            sets.push("complete = $complete");
        }
        sets.push("last_modified_by = $actor");
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('store_order', $id) SET {}; \
             SELECT meta::id(id) AS record_id, * \
             FROM type::record('store_order', $id)",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("actor", actor.to_string()));

        if let Some(pet_id) = input.pet_id {
            builder = builder.bind(("pet_id", pet_id.to_string()));
        }
        if let Some(quantity) = input.quantity {
            builder = builder.bind(("quantity", quantity));
        }
        if let Some(ship_date) = input.ship_date {
            builder = builder.bind(("ship_date", ship_date));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status.as_str().to_string()));
        }
        if let Some(complete) = input.complete {
            builder = builder.bind(("complete", complete));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<OrderRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "order".into(),
            id: id_str,
        })?;

        Ok(row.try_into_order()?)
    }

    async fn delete(&self, id: Uuid) -> PetstoreResult<()> {
        self.db
            .query("DELETE type::record('store_order', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self, page: PageRequest) -> PetstoreResult<Page<Order>> {
        let total = count_table(&self.db, "store_order").await?;

        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM store_order {} \
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

        let rows: Vec<OrderRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(OrderRow::try_into_order)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(Page {
            items,
            total,
            page: page.page,
            size: page.size,
        })
    }
}

impl<C: Connection> OrderRepository for SurrealOrderRepository<C> {
    async fn place(&self, input: CreateOrder, actor: &str) -> PetstoreResult<Order> {
        let id = Uuid::new_v4();
        let pet_id = input.pet_id;

        if let Err(e) = self.insert(PLACE_ORDER, id, input, actor).await {
            // A failed transaction reports a generic error for every
            // statement, so the cause is read back from the pet itself.
            let status = status_of(&self.db, pet_id).await?;
            return match status {
                Some(PetStatus::Available) => {
                    warn!(%pet_id, error = %e, "Order placement transaction failed");
                    Err(DbError::Query(e.to_string()).into())
                }
                _ => {
                    debug!(%pet_id, ?status, "Order placement lost the pet to a concurrent writer");
                    Err(PetstoreError::Conflict {
                        entity: "pet".into(),
                        id: pet_id.to_string(),
                    })
                }
            };
        }

        self.get_by_id(id).await
    }
}
