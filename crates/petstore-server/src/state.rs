//! Shared application state handed to every handler.

use std::sync::Arc;

use axum::extract::FromRef;
use petstore_auth::{AuthConfig, AuthService};
use petstore_db::repository::{
    SurrealCategoryRepository, SurrealOrderRepository, SurrealPetRepository, SurrealTagRepository,
    SurrealUserRepository,
};
use petstore_store::StoreService;
use surrealdb::Surreal;
use surrealdb::engine::any::Any;

pub type Db = Surreal<Any>;

pub type CategoryRepo = SurrealCategoryRepository<Any>;
pub type TagRepo = SurrealTagRepository<Any>;
pub type PetRepo = SurrealPetRepository<Any>;
pub type OrderRepo = SurrealOrderRepository<Any>;
pub type UserRepo = SurrealUserRepository<Any>;
pub type Store = StoreService<PetRepo, OrderRepo>;
pub type Auth = AuthService<UserRepo>;

#[derive(Clone)]
pub struct AppState {
    pub categories: Arc<CategoryRepo>,
    pub tags: Arc<TagRepo>,
    pub pets: Arc<PetRepo>,
    pub orders: Arc<OrderRepo>,
    pub users: Arc<UserRepo>,
    pub store: Arc<Store>,
    pub auth: Arc<Auth>,
    pub auth_config: Arc<AuthConfig>,
}

impl AppState {
    /// Wire every repository and service over one database handle.
    pub fn new(db: Db, auth_config: AuthConfig) -> Self {
        let users = match &auth_config.pepper {
            Some(pepper) => SurrealUserRepository::with_pepper(db.clone(), pepper.clone()),
            None => SurrealUserRepository::new(db.clone()),
        };
        let pets = SurrealPetRepository::new(db.clone());
        let orders = SurrealOrderRepository::new(db.clone());

        Self {
            categories: Arc::new(SurrealCategoryRepository::new(db.clone())),
            tags: Arc::new(SurrealTagRepository::new(db)),
            store: Arc::new(StoreService::new(pets.clone(), orders.clone())),
            auth: Arc::new(AuthService::new(users.clone(), auth_config.clone())),
            pets: Arc::new(pets),
            orders: Arc::new(orders),
            users: Arc::new(users),
            auth_config: Arc::new(auth_config),
        }
    }
}

macro_rules! state_part {
    ($field:ident: $ty:ty) => {
        impl FromRef<AppState> for Arc<$ty> {
            fn from_ref(state: &AppState) -> Self {
                Arc::clone(&state.$field)
            }
        }
    };
}

state_part!(categories: CategoryRepo);
state_part!(tags: TagRepo);
state_part!(pets: PetRepo);
state_part!(orders: OrderRepo);
state_part!(users: UserRepo);
state_part!(store: Store);
state_part!(auth: Auth);
state_part!(auth_config: AuthConfig);
