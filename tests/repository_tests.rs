//! PostgreSQL 存储测试
//! 需要数据库：TEST_DATABASE_URL，运行 `cargo test -- --ignored`

use account_service::{
    db,
    repository::{AccountUpdate, CredentialStore, PgCredentialStore, StoreError},
};
use chrono::{Duration, Utc};
use serial_test::serial;
use sqlx::PgPool;
use std::sync::Arc;

mod common;

async fn setup_store() -> (PgPool, PgCredentialStore) {
    let config = common::create_test_config();
    let pool = db::create_pool(&config.database)
        .await
        .expect("Failed to create test database pool");

    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    sqlx::query("TRUNCATE TABLE accounts")
        .execute(&pool)
        .await
        .expect("Failed to clean accounts table");

    (pool.clone(), PgCredentialStore::new(pool))
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_create_and_find_account() {
    let (_pool, store) = setup_store().await;

    let created = store
        .create_account("Alice", "alice123", "$argon2id$hash")
        .await
        .unwrap();
    assert_eq!(created.username, "alice123");
    assert!(created.token.is_none());

    let found = store.find_by_username("alice123").await.unwrap().unwrap();
    assert_eq!(found.id, created.id);

    let public = store
        .find_public_info_by_username("alice123")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(public.id, created.id);
    assert_eq!(public.display_name, "Alice");

    assert!(store.username_exists("alice123").await.unwrap());
    assert!(!store.username_exists("bob456").await.unwrap());
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_unique_violation_is_conflict() {
    let (_pool, store) = setup_store().await;

    store.create_account("Alice", "alice123", "h1").await.unwrap();
    let result = store.create_account("Again", "alice123", "h2").await;

    assert!(matches!(result, Err(StoreError::Conflict)));
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_concurrent_create_single_winner() {
    let (_pool, store) = setup_store().await;
    let store = Arc::new(store);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .create_account(&format!("racer {}", i), "racer01", "hash")
                    .await
            })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(StoreError::Conflict) => {}
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(successes, 1);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_update_account_outcomes() {
    let (_pool, store) = setup_store().await;
    store.create_account("Alice", "alice123", "h1").await.unwrap();

    assert_eq!(
        store.update_account("alice123", "Alice", "h1").await.unwrap(),
        AccountUpdate::Unchanged
    );
    assert_eq!(
        store.update_account("alice123", "Alice B", "h2").await.unwrap(),
        AccountUpdate::Updated
    );
    assert_eq!(
        store.update_account("nobody99", "X", "h").await.unwrap(),
        AccountUpdate::NotFound
    );
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_save_token() {
    let (pool, store) = setup_store().await;
    store.create_account("Alice", "alice123", "h1").await.unwrap();

    // TIMESTAMPTZ keeps microseconds
    let expires_at = Utc::now() + Duration::hours(1);
    store.save_token("alice123", "tok", expires_at).await.unwrap();

    let account = store.find_by_username("alice123").await.unwrap().unwrap();
    assert_eq!(account.token.as_deref(), Some("tok"));
    let stored = account.token_expires_at.unwrap();
    assert!((stored - expires_at).num_milliseconds().abs() < 1);

    store.ping().await.unwrap();
    db::ping(&pool).await.unwrap();
}
