//! Order placement and inventory.

use petstore_core::error::{PetstoreError, PetstoreResult};
use petstore_core::identity::Identity;
use petstore_core::models::order::{CreateOrder, Order, OrderStatus};
use petstore_core::models::pet::PetStatus;
use petstore_core::repository::{CrudRepository, OrderRepository, PetRepository};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

pub const PET_REQUIRED: &str = "You must specify a pet";
pub const PET_NOT_FOUND: &str = "The pet is not found";
pub const PET_SOLD: &str = "The pet was sold";
pub const PET_NOT_ON_SALE: &str = "The pet is not on sale";
pub const NEGATIVE_QUANTITY: &str = "The quantity must not be negative";

/// An order as submitted by a customer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub pet_id: Option<Uuid>,
    pub quantity: Option<i64>,
    pub ship_date: Option<String>,
    pub status: Option<OrderStatus>,
    pub complete: Option<bool>,
}

/// Pet counts reported by `GET /store/inventory`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Inventory {
    pub available: u64,
}

/// Order placement workflow.
///
/// Generic over repository implementations so the workflow can run
/// against any storage backend that offers a transactional
/// [`OrderRepository::place`].
pub struct StoreService<P: PetRepository, O: OrderRepository> {
    pets: P,
    orders: O,
}

impl<P: PetRepository, O: OrderRepository> StoreService<P, O> {
    pub fn new(pets: P, orders: O) -> Self {
        Self { pets, orders }
    }

    /// Validate the requested pet, record the order and mark the pet sold.
    ///
    /// Validation failures leave no trace. The order write and the pet
    /// transition commit together; a placement that loses a race for the
    /// same pet is reported exactly like the sequential checks would
    /// report it after the fact.
    pub async fn place_order(&self, request: OrderRequest, actor: &Identity) -> PetstoreResult<Order> {
        let pet_id = request
            .pet_id
            .ok_or_else(|| PetstoreError::invalid(PET_REQUIRED))?;
        if request.quantity.is_some_and(|q| q < 0) {
            return Err(PetstoreError::invalid(NEGATIVE_QUANTITY));
        }

        self.check_orderable(pet_id).await?;

        let input = CreateOrder {
            pet_id,
            quantity: request.quantity,
            ship_date: request.ship_date,
            status: request.status,
            complete: request.complete,
        };

        match self.orders.place(input, &actor.login).await {
            Ok(order) => {
                info!(order_id = %order.id, %pet_id, actor = %actor.login, "Order placed");
                Ok(order)
            }
            Err(PetstoreError::Conflict { .. }) => {
                debug!(%pet_id, "Pet changed between check and placement; re-checking");
                self.check_orderable(pet_id).await?;
                // Still available after losing the guard: the write itself failed.
                Err(PetstoreError::Internal(format!(
                    "order placement for pet {pet_id} was rejected"
                )))
            }
            Err(e) => Err(e),
        }
    }

    /// Number of pets currently available for sale.
    pub async fn inventory(&self) -> PetstoreResult<Inventory> {
        let (_, available) = self.pets.find_by_status(&[PetStatus::Available]).await?;
        Ok(Inventory { available })
    }

    async fn check_orderable(&self, pet_id: Uuid) -> PetstoreResult<()> {
        let pet = match self.pets.get_by_id(pet_id).await {
            Ok(pet) => pet,
            Err(PetstoreError::NotFound { .. }) => return Err(PetstoreError::invalid(PET_NOT_FOUND)),
            Err(e) => return Err(e),
        };

        match pet.status {
            PetStatus::Available => Ok(()),
            PetStatus::Sold => Err(PetstoreError::invalid(PET_SOLD)),
            PetStatus::Pending => Err(PetstoreError::invalid(PET_NOT_ON_SALE)),
        }
    }
}
