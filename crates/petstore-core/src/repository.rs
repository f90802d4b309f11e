//! Repository trait definitions for data access abstraction.
//!
//! Every entity shares the [`CrudRepository`] surface; entity-specific
//! traits extend it with the few queries the domain needs beyond plain
//! CRUD. All operations are async and write operations take the login of
//! the acting user for audit stamping.

use uuid::Uuid;

use crate::error::PetstoreResult;
use crate::models::Entity;
use crate::models::order::{CreateOrder, Order, UpdateOrder};
use crate::models::pet::{CreatePet, Pet, PetStatus, UpdatePet};
use crate::models::user::{CreateUser, UpdateUser, User};
use crate::pagination::{Page, PageRequest};

/// Uniform create/read/update/delete/list access to one entity type.
pub trait CrudRepository: Send + Sync {
    type Entity: Entity + Send;
    type Create: Send;
    type Update: Send;

    fn create(
        &self,
        input: Self::Create,
        actor: &str,
    ) -> impl Future<Output = PetstoreResult<Self::Entity>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = PetstoreResult<Self::Entity>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: Self::Update,
        actor: &str,
    ) -> impl Future<Output = PetstoreResult<Self::Entity>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = PetstoreResult<()>> + Send;
    fn list(
        &self,
        page: PageRequest,
    ) -> impl Future<Output = PetstoreResult<Page<Self::Entity>>> + Send;
}

// ---------------------------------------------------------------------------
// Pet directory
// ---------------------------------------------------------------------------

pub trait PetRepository:
    CrudRepository<Entity = Pet, Create = CreatePet, Update = UpdatePet>
{
    /// All pets whose status is one of `statuses`, plus their count.
    fn find_by_status(
        &self,
        statuses: &[PetStatus],
    ) -> impl Future<Output = PetstoreResult<(Vec<Pet>, u64)>> + Send;
}

// ---------------------------------------------------------------------------
// Order ledger
// ---------------------------------------------------------------------------

pub trait OrderRepository:
    CrudRepository<Entity = Order, Create = CreateOrder, Update = UpdateOrder>
{
    /// Record an order and mark its pet as sold in one transaction.
    ///
    /// The pet transition only applies if the pet is still
    /// [`PetStatus::Available`] at commit time; otherwise nothing is
    /// written and [`crate::error::PetstoreError::Conflict`] is returned.
    fn place(
        &self,
        input: CreateOrder,
        actor: &str,
    ) -> impl Future<Output = PetstoreResult<Order>> + Send;
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

pub trait UserRepository:
    CrudRepository<Entity = User, Create = CreateUser, Update = UpdateUser>
{
    fn get_by_login(&self, login: &str) -> impl Future<Output = PetstoreResult<User>> + Send;

    /// Existing users whose login is in `logins` (unknown logins are skipped).
    fn find_by_logins(
        &self,
        logins: &[String],
    ) -> impl Future<Output = PetstoreResult<Vec<User>>> + Send;

    /// Create several users in one transaction; either all or none are stored.
    fn create_many(
        &self,
        inputs: Vec<CreateUser>,
        actor: &str,
    ) -> impl Future<Output = PetstoreResult<Vec<User>>> + Send;
}
