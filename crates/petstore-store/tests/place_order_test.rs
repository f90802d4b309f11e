//! Integration tests for the order placement workflow against
//! in-memory SurrealDB.

use std::sync::Arc;

use petstore_core::error::PetstoreError;
use petstore_core::identity::{Authority, Identity};
use petstore_core::models::pet::{CreatePet, Pet, PetStatus};
use petstore_core::pagination::PageRequest;
use petstore_core::repository::CrudRepository;
use petstore_db::repository::{SurrealOrderRepository, SurrealPetRepository};
use petstore_store::service::{PET_NOT_FOUND, PET_NOT_ON_SALE, PET_REQUIRED, PET_SOLD};
use petstore_store::{Inventory, OrderRequest, StoreService};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

type Service = StoreService<SurrealPetRepository<Db>, SurrealOrderRepository<Db>>;

struct Fixture {
    pets: SurrealPetRepository<Db>,
    orders: SurrealOrderRepository<Db>,
    service: Arc<Service>,
}

async fn setup() -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    petstore_db::run_migrations(&db).await.unwrap();

    let pets = SurrealPetRepository::new(db.clone());
    let orders = SurrealOrderRepository::new(db);
    let service = Arc::new(StoreService::new(pets.clone(), orders.clone()));
    Fixture {
        pets,
        orders,
        service,
    }
}

fn customer() -> Identity {
    Identity {
        user_id: Uuid::new_v4(),
        login: "user".into(),
        authorities: vec![Authority::User],
    }
}

async fn pet_with(fx: &Fixture, status: PetStatus) -> Pet {
    fx.pets
        .create(
            CreatePet {
                name: "doggie".into(),
                status: Some(status),
                category_id: None,
                tag_ids: vec![],
                photo_urls: vec![],
            },
            "admin",
        )
        .await
        .unwrap()
}

fn request_for(pet_id: Uuid) -> OrderRequest {
    OrderRequest {
        pet_id: Some(pet_id),
        quantity: Some(1),
        ..Default::default()
    }
}

async fn order_count(fx: &Fixture) -> u64 {
    fx.orders.list(PageRequest::default()).await.unwrap().total
}

fn assert_invalid(err: PetstoreError, expected: &str) {
    match err {
        PetstoreError::InvalidRequest(message) => assert_eq!(message, expected),
        other => panic!("expected InvalidRequest({expected:?}), got {other:?}"),
    }
}

#[tokio::test]
async fn available_pet_is_sold_on_order() {
    let fx = setup().await;
    let pet = pet_with(&fx, PetStatus::Available).await;

    let order = fx
        .service
        .place_order(request_for(pet.id), &customer())
        .await
        .unwrap();

    assert_eq!(order.pet_id, pet.id);
    assert_eq!(order.audit.created_by, "user");
    assert_eq!(order_count(&fx).await, 1);

    let pet = fx.pets.get_by_id(pet.id).await.unwrap();
    assert_eq!(pet.status, PetStatus::Sold);
    assert_eq!(pet.audit.last_modified_by, "user");
}

#[tokio::test]
async fn missing_pet_id_is_rejected_without_side_effects() {
    let fx = setup().await;
    let pet = pet_with(&fx, PetStatus::Available).await;

    let err = fx
        .service
        .place_order(OrderRequest::default(), &customer())
        .await
        .unwrap_err();
    assert_invalid(err, PET_REQUIRED);

    assert_eq!(order_count(&fx).await, 0);
    assert_eq!(
        fx.pets.get_by_id(pet.id).await.unwrap().status,
        PetStatus::Available
    );
}

#[tokio::test]
async fn unknown_pet_is_rejected() {
    let fx = setup().await;
    let err = fx
        .service
        .place_order(request_for(Uuid::new_v4()), &customer())
        .await
        .unwrap_err();
    assert_invalid(err, PET_NOT_FOUND);
    assert_eq!(order_count(&fx).await, 0);
}

#[tokio::test]
async fn sold_pet_is_rejected() {
    let fx = setup().await;
    let pet = pet_with(&fx, PetStatus::Sold).await;

    let err = fx
        .service
        .place_order(request_for(pet.id), &customer())
        .await
        .unwrap_err();
    assert_invalid(err, PET_SOLD);
    assert_eq!(order_count(&fx).await, 0);
}

#[tokio::test]
async fn pending_pet_is_rejected() {
    let fx = setup().await;
    let pet = pet_with(&fx, PetStatus::Pending).await;

    let err = fx
        .service
        .place_order(request_for(pet.id), &customer())
        .await
        .unwrap_err();
    assert_invalid(err, PET_NOT_ON_SALE);
    assert_eq!(
        fx.pets.get_by_id(pet.id).await.unwrap().status,
        PetStatus::Pending
    );
}

#[tokio::test]
async fn rejected_requests_are_repeatable() {
    let fx = setup().await;
    let sold = pet_with(&fx, PetStatus::Sold).await;
    let pending = pet_with(&fx, PetStatus::Pending).await;

    for _ in 0..3 {
        assert_invalid(
            fx.service
                .place_order(request_for(sold.id), &customer())
                .await
                .unwrap_err(),
            PET_SOLD,
        );
        assert_invalid(
            fx.service
                .place_order(request_for(pending.id), &customer())
                .await
                .unwrap_err(),
            PET_NOT_ON_SALE,
        );
        assert_invalid(
            fx.service
                .place_order(OrderRequest::default(), &customer())
                .await
                .unwrap_err(),
            PET_REQUIRED,
        );
    }

    assert_eq!(order_count(&fx).await, 0);
    assert_eq!(fx.pets.get_by_id(sold.id).await.unwrap().status, PetStatus::Sold);
    assert_eq!(
        fx.pets.get_by_id(pending.id).await.unwrap().status,
        PetStatus::Pending
    );
}

#[tokio::test]
async fn second_order_for_same_pet_reports_sold() {
    let fx = setup().await;
    let pet = pet_with(&fx, PetStatus::Available).await;

    fx.service
        .place_order(request_for(pet.id), &customer())
        .await
        .unwrap();
    let err = fx
        .service
        .place_order(request_for(pet.id), &customer())
        .await
        .unwrap_err();
    assert_invalid(err, PET_SOLD);
    assert_eq!(order_count(&fx).await, 1);
}

#[tokio::test]
async fn concurrent_orders_sell_the_pet_once() {
    let fx = setup().await;
    let pet = pet_with(&fx, PetStatus::Available).await;

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let service = Arc::clone(&fx.service);
            let pet_id = pet.id;
            tokio::spawn(async move { service.place_order(request_for(pet_id), &customer()).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(err) => assert_invalid(err, PET_SOLD),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(order_count(&fx).await, 1);
    assert_eq!(fx.pets.get_by_id(pet.id).await.unwrap().status, PetStatus::Sold);
}

#[tokio::test]
async fn negative_quantity_is_rejected() {
    let fx = setup().await;
    let pet = pet_with(&fx, PetStatus::Available).await;

    let request = OrderRequest {
        quantity: Some(-1),
        ..request_for(pet.id)
    };
    assert!(matches!(
        fx.service.place_order(request, &customer()).await,
        Err(PetstoreError::InvalidRequest(_))
    ));
    assert_eq!(order_count(&fx).await, 0);
}

#[tokio::test]
async fn inventory_counts_available_pets() {
    let fx = setup().await;
    pet_with(&fx, PetStatus::Available).await;
    pet_with(&fx, PetStatus::Available).await;
    let for_sale = pet_with(&fx, PetStatus::Available).await;
    pet_with(&fx, PetStatus::Pending).await;

    assert_eq!(fx.service.inventory().await.unwrap(), Inventory { available: 3 });

    fx.service
        .place_order(request_for(for_sale.id), &customer())
        .await
        .unwrap();
    assert_eq!(fx.service.inventory().await.unwrap(), Inventory { available: 2 });
}
