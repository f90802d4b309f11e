//! Integration tests for the Order repository, including transactional
//! placement against concurrent buyers.

use petstore_core::error::PetstoreError;
use petstore_core::models::order::{CreateOrder, OrderStatus, UpdateOrder};
use petstore_core::models::pet::{CreatePet, Pet, PetStatus};
use petstore_core::pagination::PageRequest;
use petstore_core::repository::{CrudRepository, OrderRepository};
use petstore_db::repository::{SurrealOrderRepository, SurrealPetRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> (SurrealPetRepository<Db>, SurrealOrderRepository<Db>) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    petstore_db::run_migrations(&db).await.unwrap();
    (
        SurrealPetRepository::new(db.clone()),
        SurrealOrderRepository::new(db),
    )
}

async fn pet_with(pets: &SurrealPetRepository<Db>, status: PetStatus) -> Pet {
    pets.create(
        CreatePet {
            name: "rex".into(),
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

fn order_for(pet_id: Uuid) -> CreateOrder {
    CreateOrder {
        pet_id,
        quantity: Some(1),
        ship_date: None,
        status: None,
        complete: None,
    }
}

#[tokio::test]
async fn place_marks_pet_sold() {
    let (pets, orders) = setup().await;
    let pet = pet_with(&pets, PetStatus::Available).await;

    let order = orders.place(order_for(pet.id), "buyer").await.unwrap();
    assert_eq!(order.pet_id, pet.id);
    assert_eq!(order.status, OrderStatus::Placed);
    assert!(!order.complete);
    assert_eq!(order.audit.created_by, "buyer");

    let pet = pets.get_by_id(pet.id).await.unwrap();
    assert_eq!(pet.status, PetStatus::Sold);
    assert_eq!(pet.audit.last_modified_by, "buyer");
}

#[tokio::test]
async fn place_on_unavailable_pet_conflicts_without_writing() {
    let (pets, orders) = setup().await;
    let pet = pet_with(&pets, PetStatus::Pending).await;

    let err = orders.place(order_for(pet.id), "buyer").await.unwrap_err();
    assert!(matches!(err, PetstoreError::Conflict { .. }));

    let page = orders.list(PageRequest::default()).await.unwrap();
    assert_eq!(page.total, 0, "rolled-back placement must leave no order");
    assert_eq!(
        pets.get_by_id(pet.id).await.unwrap().status,
        PetStatus::Pending
    );
}

#[tokio::test]
async fn place_on_missing_pet_conflicts() {
    let (_, orders) = setup().await;
    let err = orders
        .place(order_for(Uuid::new_v4()), "buyer")
        .await
        .unwrap_err();
    assert!(matches!(err, PetstoreError::Conflict { .. }));
}

#[tokio::test]
async fn concurrent_placements_sell_once() {
    let (pets, orders) = setup().await;
    let pet = pet_with(&pets, PetStatus::Available).await;

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let orders = orders.clone();
            let pet_id = pet.id;
            tokio::spawn(async move { orders.place(order_for(pet_id), &format!("buyer{i}")).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(e) => assert!(matches!(e, PetstoreError::Conflict { .. }), "unexpected {e:?}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(orders.list(PageRequest::default()).await.unwrap().total, 1);
    assert_eq!(pets.get_by_id(pet.id).await.unwrap().status, PetStatus::Sold);
}

#[tokio::test]
async fn plain_create_leaves_pet_untouched() {
    let (pets, orders) = setup().await;
    let pet = pet_with(&pets, PetStatus::Available).await;

    let order = orders.create(order_for(pet.id), "admin").await.unwrap();
    assert_eq!(order.pet_id, pet.id);
    assert_eq!(
        pets.get_by_id(pet.id).await.unwrap().status,
        PetStatus::Available
    );
}

#[tokio::test]
async fn update_order_fields() {
    let (pets, orders) = setup().await;
    let pet = pet_with(&pets, PetStatus::Available).await;
    let order = orders.place(order_for(pet.id), "buyer").await.unwrap();

    let updated = orders
        .update(
            order.id,
            UpdateOrder {
                status: Some(OrderStatus::Delivered),
                complete: Some(true),
                ship_date: Some("2024-05-01T10:00:00Z".into()),
                ..Default::default()
            },
            "admin",
        )
        .await
        .unwrap();

    assert_eq!(updated.status, OrderStatus::Delivered);
    assert!(updated.complete);
    assert_eq!(updated.quantity, Some(1));
    assert_eq!(updated.ship_date.as_deref(), Some("2024-05-01T10:00:00Z"));

    orders.delete(order.id).await.unwrap();
    assert!(matches!(
        orders.get_by_id(order.id).await.unwrap_err(),
        PetstoreError::NotFound { .. }
    ));
}
