//! Domain models for the pet store.

pub mod audit;
pub mod category;
pub mod order;
pub mod pet;
pub mod tag;
pub mod user;

use uuid::Uuid;

/// Common behaviour of persisted entities.
pub trait Entity {
    /// Entity name as shown to API clients (e.g. `Order`).
    const NAME: &'static str;

    fn id(&self) -> Uuid;
}

impl Entity for category::Category {
    const NAME: &'static str = "Category";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Entity for tag::Tag {
    const NAME: &'static str = "Tag";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Entity for pet::Pet {
    const NAME: &'static str = "Pet";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Entity for order::Order {
    const NAME: &'static str = "Order";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Entity for user::User {
    const NAME: &'static str = "User";

    fn id(&self) -> Uuid {
        self.id
    }
}
