//! Integration tests for the Pet repository using in-memory SurrealDB.

use petstore_core::error::PetstoreError;
use petstore_core::models::pet::{CreatePet, PetStatus, UpdatePet};
use petstore_core::pagination::PageRequest;
use petstore_core::repository::{CrudRepository, PetRepository};
use petstore_db::repository::SurrealPetRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> SurrealPetRepository<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    petstore_db::run_migrations(&db).await.unwrap();
    SurrealPetRepository::new(db)
}

fn pet(name: &str, status: Option<PetStatus>) -> CreatePet {
    CreatePet {
        name: name.into(),
        status,
        category_id: None,
        tag_ids: vec![],
        photo_urls: vec![],
    }
}

#[tokio::test]
async fn create_defaults_to_available() {
    let repo = setup().await;
    let created = repo.create(pet("rex", None), "admin").await.unwrap();
    assert_eq!(created.status, PetStatus::Available);
    assert!(created.is_orderable());

    let fetched = repo.get_by_id(created.id).await.unwrap();
    assert_eq!(fetched.name, "rex");
    assert_eq!(fetched.audit.created_by, "admin");
}

#[tokio::test]
async fn references_are_stored_as_ids() {
    let repo = setup().await;
    let category_id = Uuid::new_v4();
    let tag_ids = vec![Uuid::new_v4(), Uuid::new_v4()];

    let created = repo
        .create(
            CreatePet {
                name: "tom".into(),
                status: Some(PetStatus::Pending),
                category_id: Some(category_id),
                tag_ids: tag_ids.clone(),
                photo_urls: vec!["http://img/1.png".into()],
            },
            "admin",
        )
        .await
        .unwrap();

    assert_eq!(created.category_id, Some(category_id));
    assert_eq!(created.tag_ids, tag_ids);
    assert_eq!(created.photo_urls, vec!["http://img/1.png".to_string()]);
}

#[tokio::test]
async fn update_can_clear_category() {
    let repo = setup().await;
    let created = repo
        .create(
            CreatePet {
                category_id: Some(Uuid::new_v4()),
                ..pet("rex", None)
            },
            "admin",
        )
        .await
        .unwrap();

    let updated = repo
        .update(
            created.id,
            UpdatePet {
                category_id: Some(None),
                status: Some(PetStatus::Sold),
                ..Default::default()
            },
            "editor",
        )
        .await
        .unwrap();

    assert_eq!(updated.category_id, None);
    assert_eq!(updated.status, PetStatus::Sold);
    assert_eq!(updated.name, "rex");
    assert_eq!(updated.audit.last_modified_by, "editor");
}

#[tokio::test]
async fn find_by_status_filters_and_counts() {
    let repo = setup().await;
    repo.create(pet("a", Some(PetStatus::Available)), "admin").await.unwrap();
    repo.create(pet("b", Some(PetStatus::Pending)), "admin").await.unwrap();
    repo.create(pet("c", Some(PetStatus::Sold)), "admin").await.unwrap();
    repo.create(pet("d", Some(PetStatus::Available)), "admin").await.unwrap();

    let (pets, count) = repo.find_by_status(&[PetStatus::Available]).await.unwrap();
    assert_eq!(count, 2);
    assert!(pets.iter().all(|p| p.status == PetStatus::Available));

    let (_, count) = repo
        .find_by_status(&[PetStatus::Pending, PetStatus::Sold])
        .await
        .unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn list_reports_total_beyond_page() {
    let repo = setup().await;
    for name in ["a", "b", "c"] {
        repo.create(pet(name, None), "admin").await.unwrap();
    }

    let page = repo
        .list(PageRequest::from_query(Some("0"), Some("2"), None))
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].name, "a");
}

#[tokio::test]
async fn get_missing_pet_is_not_found() {
    let repo = setup().await;
    let err = repo.get_by_id(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, PetstoreError::NotFound { ref entity, .. } if entity == "pet"));
}
