use sea_orm::Database;
use uuid::Uuid;

use engine::{Engine, EngineError, User};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

async fn user(engine: &Engine, telegram_id: &str, username: &str) -> User {
    engine.get_or_create_user(telegram_id, username).await.unwrap()
}

#[tokio::test]
async fn grant_makes_the_owner_visible() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "1", "alice").await;
    let bob = user(&engine, "2", "bob").await;

    engine.grant_access(alice.id, bob.id).await.unwrap();

    let owners = engine.owners_visible_to(bob.id).await.unwrap();
    assert_eq!(owners, vec![alice.clone()]);

    let viewers = engine.viewers_of(alice.id).await.unwrap();
    assert_eq!(viewers, vec![bob]);
}

#[tokio::test]
async fn grants_are_directional() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "1", "alice").await;
    let bob = user(&engine, "2", "bob").await;

    engine.grant_access(alice.id, bob.id).await.unwrap();

    // Alice gained nothing from sharing her own history.
    assert!(engine.owners_visible_to(alice.id).await.unwrap().is_empty());

    // The opposite edge is a distinct grant, not a duplicate.
    engine.grant_access(bob.id, alice.id).await.unwrap();
}

#[tokio::test]
async fn self_grant_is_rejected() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "1", "alice").await;

    let result = engine.grant_access(alice.id, alice.id).await;
    assert!(matches!(result, Err(EngineError::InvalidGrant(_))));
}

#[tokio::test]
async fn repeated_grant_is_rejected() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "1", "alice").await;
    let bob = user(&engine, "2", "bob").await;

    engine.grant_access(alice.id, bob.id).await.unwrap();
    let result = engine.grant_access(alice.id, bob.id).await;
    assert!(matches!(result, Err(EngineError::DuplicateGrant(_))));
}

#[tokio::test]
async fn grant_requires_both_users() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "1", "alice").await;

    let result = engine.grant_access(alice.id, Uuid::new_v4()).await;
    assert!(matches!(result, Err(EngineError::NotFound(_))));

    let result = engine.grant_access(Uuid::new_v4(), alice.id).await;
    assert!(matches!(result, Err(EngineError::NotFound(_))));
}

#[tokio::test]
async fn revoke_removes_visibility() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "1", "alice").await;
    let bob = user(&engine, "2", "bob").await;

    engine.grant_access(alice.id, bob.id).await.unwrap();
    engine.revoke_access(alice.id, bob.id).await.unwrap();

    assert!(engine.owners_visible_to(bob.id).await.unwrap().is_empty());
    assert!(engine.viewers_of(alice.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn revoking_a_missing_edge_is_not_found() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "1", "alice").await;
    let bob = user(&engine, "2", "bob").await;

    let result = engine.revoke_access(alice.id, bob.id).await;
    assert!(matches!(result, Err(EngineError::NotFound(_))));
}
