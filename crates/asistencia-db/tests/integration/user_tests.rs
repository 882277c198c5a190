use asistencia_core::AppError;

use crate::integration::common::setup_test_db;

#[tokio::test]
async fn create_and_find_by_username() {
    let (db, _tmp) = setup_test_db().await;
    let repo = db.user_repo();

    let created = repo.create("profesora", "hash-abc").await.unwrap();
    assert_eq!(created.username, "profesora");

    let found = repo
        .find_by_username("profesora")
        .await
        .unwrap()
        .expect("User should exist");
    assert_eq!(found.id, created.id);
    assert_eq!(found.password_hash, "hash-abc");

    assert!(repo.find_by_username("nadie").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_username_is_a_conflict() {
    let (db, _tmp) = setup_test_db().await;
    let repo = db.user_repo();

    repo.create("profesora", "hash-abc").await.unwrap();
    let err = repo.create("profesora", "hash-def").await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn get_unknown_returns_none() {
    let (db, _tmp) = setup_test_db().await;

    assert!(db.user_repo().get(123).await.unwrap().is_none());
}
