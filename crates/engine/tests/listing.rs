use std::collections::HashSet;

use chrono::{DateTime, TimeZone, Utc};
use sea_orm::Database;
use uuid::Uuid;

use engine::{Currency, Engine, EngineError, User, Wallet};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

async fn seed(engine: &Engine) -> (User, User, Wallet) {
    let alice = engine.get_or_create_user("1", "alice").await.unwrap();
    let bob = engine.get_or_create_user("2", "bob").await.unwrap();
    let cash = engine
        .get_or_create_wallet("Cash", Currency::Eur)
        .await
        .unwrap();
    (alice, bob, cash)
}

fn day(year: i32, month: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, d, 12, 0, 0).unwrap()
}

async fn record(engine: &Engine, owner: &User, wallet: &Wallet, at: DateTime<Utc>) -> Uuid {
    engine
        .add_transaction(owner.id, wallet.id, -100, "item", "", "", at)
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn zero_limit_is_rejected() {
    let engine = engine_with_db().await;
    let (alice, _, _) = seed(&engine).await;

    let result = engine.list_transactions(alice.id, 0, 0).await;
    assert!(matches!(result, Err(EngineError::InvalidInput(_))));
}

#[tokio::test]
async fn newest_first() {
    let engine = engine_with_db().await;
    let (alice, _, cash) = seed(&engine).await;

    let oldest = record(&engine, &alice, &cash, day(2025, 3, 1)).await;
    let newest = record(&engine, &alice, &cash, day(2025, 3, 20)).await;
    let middle = record(&engine, &alice, &cash, day(2025, 3, 10)).await;

    let page = engine.list_transactions(alice.id, 0, 10).await.unwrap();
    let ids: Vec<Uuid> = page.items.iter().map(|i| i.transaction.id).collect();
    assert_eq!(ids, vec![newest, middle, oldest]);
    assert!(!page.has_prev);
    assert!(!page.has_next);
}

#[tokio::test]
async fn equal_timestamps_keep_a_stable_order() {
    let engine = engine_with_db().await;
    let (alice, _, cash) = seed(&engine).await;

    let at = day(2025, 3, 10);
    for _ in 0..4 {
        record(&engine, &alice, &cash, at).await;
    }

    let first = engine.list_transactions(alice.id, 0, 10).await.unwrap();
    let second = engine.list_transactions(alice.id, 0, 10).await.unwrap();
    assert_eq!(first, second);

    let mut ids: Vec<String> = first
        .items
        .iter()
        .map(|i| i.transaction.id.to_string())
        .collect();
    ids.sort();
    ids.reverse();
    let listed: Vec<String> = first
        .items
        .iter()
        .map(|i| i.transaction.id.to_string())
        .collect();
    assert_eq!(listed, ids);
}

#[tokio::test]
async fn offset_sweep_covers_every_visible_record_once() {
    let engine = engine_with_db().await;
    let (alice, bob, cash) = seed(&engine).await;

    let mut expected = HashSet::new();
    for d in 1..=5 {
        expected.insert(record(&engine, &alice, &cash, day(2025, 3, d)).await);
    }
    for d in 1..=3 {
        expected.insert(record(&engine, &bob, &cash, day(2025, 3, d)).await);
    }
    engine.grant_access(bob.id, alice.id).await.unwrap();

    let mut seen = HashSet::new();
    let mut offset = 0;
    loop {
        let page = engine.list_transactions(alice.id, offset, 3).await.unwrap();
        assert_eq!(page.has_prev, offset > 0);
        for item in &page.items {
            assert!(seen.insert(item.transaction.id), "duplicate across pages");
        }
        if !page.has_next {
            break;
        }
        offset += 3;
    }

    assert_eq!(seen, expected);
}

#[tokio::test]
async fn items_carry_owner_and_ownership_flag() {
    let engine = engine_with_db().await;
    let (alice, bob, cash) = seed(&engine).await;

    record(&engine, &alice, &cash, day(2025, 3, 2)).await;
    record(&engine, &bob, &cash, day(2025, 3, 1)).await;
    engine.grant_access(bob.id, alice.id).await.unwrap();

    let page = engine.list_transactions(alice.id, 0, 10).await.unwrap();
    assert_eq!(page.items.len(), 2);

    let own = &page.items[0];
    assert!(own.is_own);
    assert_eq!(own.owner, alice);

    let shared = &page.items[1];
    assert!(!shared.is_own);
    assert_eq!(shared.owner, bob);
}

#[tokio::test]
async fn unshared_records_stay_hidden() {
    let engine = engine_with_db().await;
    let (alice, bob, cash) = seed(&engine).await;

    record(&engine, &bob, &cash, day(2025, 3, 1)).await;

    let page = engine.list_transactions(alice.id, 0, 10).await.unwrap();
    assert!(page.items.is_empty());
    assert!(!page.has_next);
}

#[tokio::test]
async fn has_next_is_exact_at_the_boundary() {
    let engine = engine_with_db().await;
    let (alice, _, cash) = seed(&engine).await;

    for d in 1..=3 {
        record(&engine, &alice, &cash, day(2025, 3, d)).await;
    }

    let page = engine.list_transactions(alice.id, 0, 3).await.unwrap();
    assert_eq!(page.items.len(), 3);
    assert!(!page.has_next);

    let page = engine.list_transactions(alice.id, 0, 2).await.unwrap();
    assert_eq!(page.items.len(), 2);
    assert!(page.has_next);
}
