use chrono::{DateTime, TimeZone, Utc};
use sea_orm::Database;
use uuid::Uuid;

use engine::{Currency, Engine, EngineError, TransactionPatch, User, Wallet};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

async fn seed(engine: &Engine) -> (User, Wallet) {
    let alice = engine.get_or_create_user("1", "alice").await.unwrap();
    let cash = engine
        .get_or_create_wallet("Cash", Currency::Eur)
        .await
        .unwrap();
    (alice, cash)
}

fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

#[tokio::test]
async fn add_stores_the_signed_amount() {
    let engine = engine_with_db().await;
    let (alice, cash) = seed(&engine).await;

    let tx = engine
        .add_transaction(
            alice.id,
            cash.id,
            -1250,
            "groceries",
            "market",
            "food",
            day(2025, 3, 10),
        )
        .await
        .unwrap();

    let read = engine.transaction(alice.id, tx.id).await.unwrap();
    assert_eq!(read, tx);
    assert_eq!(read.amount_minor, -1250);
}

#[tokio::test]
async fn add_requires_existing_user_and_wallet() {
    let engine = engine_with_db().await;
    let (alice, cash) = seed(&engine).await;

    let result = engine
        .add_transaction(Uuid::new_v4(), cash.id, -100, "x", "", "", day(2025, 3, 10))
        .await;
    assert!(matches!(result, Err(EngineError::NotFound(_))));

    let result = engine
        .add_transaction(alice.id, Uuid::new_v4(), -100, "x", "", "", day(2025, 3, 10))
        .await;
    assert!(matches!(result, Err(EngineError::NotFound(_))));
}

#[tokio::test]
async fn patch_changes_only_the_set_fields() {
    let engine = engine_with_db().await;
    let (alice, cash) = seed(&engine).await;

    let tx = engine
        .add_transaction(
            alice.id,
            cash.id,
            -1250,
            "groceries",
            "market",
            "food",
            day(2025, 3, 10),
        )
        .await
        .unwrap();

    let patch = TransactionPatch {
        amount_minor: Some(-1300),
        category: Some("grocery".to_string()),
        ..TransactionPatch::default()
    };
    let updated = engine.update_transaction(alice.id, tx.id, patch).await.unwrap();

    assert_eq!(updated.amount_minor, -1300);
    assert_eq!(updated.category, "grocery");
    assert_eq!(updated.description, "groceries");
    assert_eq!(updated.location, "market");
    assert_eq!(updated.occurred_at, tx.occurred_at);
}

#[tokio::test]
async fn empty_patch_is_a_noop() {
    let engine = engine_with_db().await;
    let (alice, cash) = seed(&engine).await;

    let tx = engine
        .add_transaction(alice.id, cash.id, 500, "refund", "", "", day(2025, 3, 10))
        .await
        .unwrap();

    let unchanged = engine
        .update_transaction(alice.id, tx.id, TransactionPatch::default())
        .await
        .unwrap();
    assert_eq!(unchanged, tx);
}

#[tokio::test]
async fn moving_to_a_missing_wallet_fails() {
    let engine = engine_with_db().await;
    let (alice, cash) = seed(&engine).await;

    let tx = engine
        .add_transaction(alice.id, cash.id, 500, "refund", "", "", day(2025, 3, 10))
        .await
        .unwrap();

    let patch = TransactionPatch {
        wallet_id: Some(Uuid::new_v4()),
        ..TransactionPatch::default()
    };
    let result = engine.update_transaction(alice.id, tx.id, patch).await;
    assert!(matches!(result, Err(EngineError::NotFound(_))));
}

#[tokio::test]
async fn only_the_owner_can_update_or_delete() {
    let engine = engine_with_db().await;
    let (alice, cash) = seed(&engine).await;
    let bob = engine.get_or_create_user("2", "bob").await.unwrap();

    let tx = engine
        .add_transaction(alice.id, cash.id, -100, "coffee", "", "", day(2025, 3, 10))
        .await
        .unwrap();

    // A share edge grants read access only.
    engine.grant_access(alice.id, bob.id).await.unwrap();

    let patch = TransactionPatch {
        amount_minor: Some(-200),
        ..TransactionPatch::default()
    };
    let result = engine.update_transaction(bob.id, tx.id, patch).await;
    assert!(matches!(result, Err(EngineError::NotFound(_))));

    let result = engine.delete_transaction(bob.id, tx.id).await;
    assert!(matches!(result, Err(EngineError::NotFound(_))));

    let untouched = engine.transaction(alice.id, tx.id).await.unwrap();
    assert_eq!(untouched.amount_minor, -100);
}

#[tokio::test]
async fn delete_removes_the_record() {
    let engine = engine_with_db().await;
    let (alice, cash) = seed(&engine).await;

    let tx = engine
        .add_transaction(alice.id, cash.id, -100, "coffee", "", "", day(2025, 3, 10))
        .await
        .unwrap();

    engine.delete_transaction(alice.id, tx.id).await.unwrap();

    let result = engine.transaction(alice.id, tx.id).await;
    assert!(matches!(result, Err(EngineError::NotFound(_))));
}

#[tokio::test]
async fn point_read_follows_the_share_graph() {
    let engine = engine_with_db().await;
    let (alice, cash) = seed(&engine).await;
    let bob = engine.get_or_create_user("2", "bob").await.unwrap();

    let tx = engine
        .add_transaction(alice.id, cash.id, -100, "coffee", "", "", day(2025, 3, 10))
        .await
        .unwrap();

    let result = engine.transaction(bob.id, tx.id).await;
    assert!(matches!(result, Err(EngineError::NotFound(_))));

    engine.grant_access(alice.id, bob.id).await.unwrap();
    let read = engine.transaction(bob.id, tx.id).await.unwrap();
    assert_eq!(read, tx);
}
