use chrono::{DateTime, TimeZone, Utc};
use sea_orm::Database;

use engine::{Currency, Engine, EngineError, User, Wallet};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

async fn user(engine: &Engine, telegram_id: &str, username: &str) -> User {
    engine.get_or_create_user(telegram_id, username).await.unwrap()
}

async fn wallet(engine: &Engine, name: &str, currency: Currency) -> Wallet {
    engine.get_or_create_wallet(name, currency).await.unwrap()
}

fn day(year: i32, month: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, d, 12, 0, 0).unwrap()
}

async fn record(
    engine: &Engine,
    owner: &User,
    w: &Wallet,
    amount_minor: i64,
    category: &str,
    at: DateTime<Utc>,
) {
    engine
        .add_transaction(owner.id, w.id, amount_minor, "item", "", category, at)
        .await
        .unwrap();
}

#[tokio::test]
async fn monthly_bounds_are_half_open() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "1", "alice").await;
    let cash = wallet(&engine, "Cash", Currency::Eur).await;

    record(&engine, &alice, &cash, -100, "food", day(2025, 3, 1)).await;
    record(&engine, &alice, &cash, -200, "food", day(2025, 3, 31)).await;
    record(&engine, &alice, &cash, -400, "food", day(2025, 4, 1)).await;

    let reports = engine.report(alice.id, "03/2025").await.unwrap();
    assert_eq!(reports.len(), 1);

    let report = &reports[0];
    assert_eq!(report.currency, Currency::Eur);
    assert_eq!(report.transaction_count, 2);
    assert_eq!(report.total_minor, -300);

    let bucket = report.overall.get("03/2025").unwrap();
    assert_eq!(bucket.total_minor, -300);
    assert_eq!(bucket.count, 2);
}

#[tokio::test]
async fn daily_expression_selects_a_single_day() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "1", "alice").await;
    let cash = wallet(&engine, "Cash", Currency::Eur).await;

    record(&engine, &alice, &cash, -100, "food", day(2025, 3, 10)).await;
    record(&engine, &alice, &cash, -200, "food", day(2025, 3, 11)).await;

    let reports = engine.report(alice.id, "10/03/2025").await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].total_minor, -100);

    let bucket = reports[0].overall.get("10/03/2025").unwrap();
    assert_eq!(bucket.count, 1);
}

#[tokio::test]
async fn yearly_report_collapses_to_one_bucket() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "1", "alice").await;
    let cash = wallet(&engine, "Cash", Currency::Eur).await;

    record(&engine, &alice, &cash, -100, "food", day(2025, 3, 10)).await;
    record(&engine, &alice, &cash, -200, "food", day(2025, 11, 2)).await;

    let reports = engine.report(alice.id, "2025").await.unwrap();
    let report = &reports[0];
    assert_eq!(report.overall.len(), 1);
    assert_eq!(report.overall.get("2025").unwrap().total_minor, -300);
}

#[tokio::test]
async fn currencies_never_mix() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "1", "alice").await;
    let cash = wallet(&engine, "Cash", Currency::Eur).await;
    let stack = wallet(&engine, "Stack", Currency::Sat).await;

    record(&engine, &alice, &cash, -500, "food", day(2025, 3, 10)).await;
    record(&engine, &alice, &stack, 21_000, "tips", day(2025, 3, 10)).await;

    let reports = engine.report(alice.id, "2025").await.unwrap();
    assert_eq!(reports.len(), 2);

    assert_eq!(reports[0].currency, Currency::Eur);
    assert_eq!(reports[0].total_minor, -500);
    assert_eq!(reports[1].currency, Currency::Sat);
    assert_eq!(reports[1].total_minor, 21_000);
}

#[tokio::test]
async fn ranking_orders_categories_by_magnitude() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "1", "alice").await;
    let cash = wallet(&engine, "Cash", Currency::Eur).await;

    record(&engine, &alice, &cash, 100_000, "salary", day(2025, 3, 1)).await;
    record(&engine, &alice, &cash, -30_000, "food", day(2025, 3, 10)).await;

    let reports = engine.report(alice.id, "03/2025").await.unwrap();
    let ranking = &reports[0].ranking;
    assert_eq!(ranking[0].category, "salary");
    assert_eq!(ranking[1].category, "food");

    let total: f64 = ranking.iter().map(|r| r.percentage).sum();
    assert!((total - 100.0).abs() < 1e-9);

    assert_eq!(reports[0].income_minor, 100_000);
    assert_eq!(reports[0].expense_minor, 30_000);
}

#[tokio::test]
async fn shared_history_is_included() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "1", "alice").await;
    let bob = user(&engine, "2", "bob").await;
    let cash = wallet(&engine, "Cash", Currency::Eur).await;

    record(&engine, &alice, &cash, -100, "food", day(2025, 3, 10)).await;
    record(&engine, &bob, &cash, -200, "food", day(2025, 3, 10)).await;

    let own_only = engine.report(alice.id, "03/2025").await.unwrap();
    assert_eq!(own_only[0].total_minor, -100);

    engine.grant_access(bob.id, alice.id).await.unwrap();
    let merged = engine.report(alice.id, "03/2025").await.unwrap();
    assert_eq!(merged[0].total_minor, -300);
}

#[tokio::test]
async fn single_owner_report_respects_the_share_graph() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "1", "alice").await;
    let bob = user(&engine, "2", "bob").await;
    let cash = wallet(&engine, "Cash", Currency::Eur).await;

    record(&engine, &bob, &cash, -200, "food", day(2025, 3, 10)).await;

    let denied = engine.report_for_owner(alice.id, bob.id, "03/2025").await;
    assert!(matches!(denied, Err(EngineError::NotFound(_))));

    engine.grant_access(bob.id, alice.id).await.unwrap();
    let reports = engine
        .report_for_owner(alice.id, bob.id, "03/2025")
        .await
        .unwrap();
    assert_eq!(reports[0].total_minor, -200);

    // Owners may always report on themselves.
    let own = engine.report_for_owner(bob.id, bob.id, "03/2025").await.unwrap();
    assert_eq!(own[0].total_minor, -200);
}

#[tokio::test]
async fn invalid_expressions_are_rejected() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "1", "alice").await;

    for raw in ["13/2025", "32/01/2025", "*/*", "soon", ""] {
        let result = engine.report(alice.id, raw).await;
        assert!(
            matches!(result, Err(EngineError::InvalidPeriod(_))),
            "expected InvalidPeriod for {raw:?}"
        );
    }
}

#[tokio::test]
async fn empty_period_yields_no_reports() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "1", "alice").await;
    let cash = wallet(&engine, "Cash", Currency::Eur).await;

    record(&engine, &alice, &cash, -100, "food", day(2025, 3, 10)).await;

    let reports = engine.report(alice.id, "1999").await.unwrap();
    assert!(reports.is_empty());
}
