//! Integration tests for the organization repository using in-memory
//! SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use ukm_core::error::UkmError;
use ukm_core::models::organization::{
    CreateOrganization, OrganizationStatus, RoleSlotUpdate, SlotRole, UpdateOrganization,
};
use ukm_core::repository::OrganizationRepository;
use ukm_db::repository::SurrealOrganizationRepository;
use uuid::Uuid;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    ukm_db::run_migrations(&db).await.unwrap();
    db
}

fn robotics() -> CreateOrganization {
    CreateOrganization {
        name: "Robotics Club".into(),
        description: "Builds robots".into(),
        status: OrganizationStatus::Active,
    }
}

#[tokio::test]
async fn create_and_get_organization() {
    let db = setup().await;
    let repo = SurrealOrganizationRepository::new(db);

    let org = repo.create(robotics()).await.unwrap();

    assert_eq!(org.name, "Robotics Club");
    assert_eq!(org.description, "Builds robots");
    assert_eq!(org.status, OrganizationStatus::Active);
    assert_eq!(org.member_count, 0);
    assert!(org.advisor.is_none());
    assert!(org.chair.is_none());
    assert!(org.secretary.is_none());

    let fetched = repo.get_by_id(org.id).await.unwrap();
    assert_eq!(fetched.id, org.id);
    assert_eq!(fetched.created_at, org.created_at);
}

#[tokio::test]
async fn get_missing_organization_is_not_found() {
    let db = setup().await;
    let repo = SurrealOrganizationRepository::new(db);

    let err = repo.get_by_id(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, UkmError::NotFound { .. }), "got: {err:?}");
}

#[tokio::test]
async fn merge_update_leaves_other_fields_untouched() {
    let db = setup().await;
    let repo = SurrealOrganizationRepository::new(db);
    let org = repo.create(robotics()).await.unwrap();
    let advisor_id = Uuid::new_v4();

    repo.update(
        org.id,
        UpdateOrganization::for_slot(
            SlotRole::Advisor,
            RoleSlotUpdate::linked("Dr. Sari".into(), advisor_id, "sari@example.com".into()),
        ),
    )
    .await
    .unwrap();

    let updated = repo
        .update(
            org.id,
            UpdateOrganization {
                status: Some(OrganizationStatus::Inactive),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Robotics Club");
    assert_eq!(updated.description, "Builds robots");
    assert_eq!(updated.status, OrganizationStatus::Inactive);
    let advisor = updated.advisor.expect("advisor slot kept");
    assert_eq!(advisor.linked_account_id, Some(advisor_id));
    assert_eq!(advisor.contact_email.as_deref(), Some("sari@example.com"));
    assert!(updated.chair.is_none());
    assert!(updated.updated_at >= org.updated_at);
}

#[tokio::test]
async fn update_missing_organization_is_not_found() {
    let db = setup().await;
    let repo = SurrealOrganizationRepository::new(db);

    let err = repo
        .update(
            Uuid::new_v4(),
            UpdateOrganization {
                name: Some("Ghost".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, UkmError::NotFound { .. }), "got: {err:?}");
}

#[tokio::test]
async fn increment_member_count_is_applied_store_side() {
    let db = setup().await;
    let repo = SurrealOrganizationRepository::new(db);
    let org = repo.create(robotics()).await.unwrap();

    repo.increment_member_count(org.id, 1).await.unwrap();
    let after = repo.increment_member_count(org.id, 2).await.unwrap();

    assert_eq!(after.member_count, 3);
    assert_eq!(repo.get_by_id(org.id).await.unwrap().member_count, 3);
}

#[tokio::test]
async fn increment_missing_organization_is_not_found() {
    let db = setup().await;
    let repo = SurrealOrganizationRepository::new(db);

    let err = repo
        .increment_member_count(Uuid::new_v4(), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, UkmError::NotFound { .. }), "got: {err:?}");
}

#[tokio::test]
async fn find_by_name_returns_every_match() {
    let db = setup().await;
    let repo = SurrealOrganizationRepository::new(db);

    let first = repo.create(robotics()).await.unwrap();
    let second = repo.create(robotics()).await.unwrap();
    repo.create(CreateOrganization {
        name: "Chess Club".into(),
        description: String::new(),
        status: OrganizationStatus::Active,
    })
    .await
    .unwrap();

    let found = repo.find_by_name("Robotics Club").await.unwrap();
    let ids: Vec<Uuid> = found.iter().map(|o| o.id).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&first.id));
    assert!(ids.contains(&second.id));

    assert!(repo.find_by_name("Drama Club").await.unwrap().is_empty());
    assert_eq!(repo.list().await.unwrap().len(), 3);
}

#[tokio::test]
async fn delete_organization() {
    let db = setup().await;
    let repo = SurrealOrganizationRepository::new(db);
    let org = repo.create(robotics()).await.unwrap();

    repo.delete(org.id).await.unwrap();

    let result = repo.get_by_id(org.id).await;
    assert!(result.is_err(), "should not find deleted organization");
}
