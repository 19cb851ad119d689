use sea_orm::{DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*, sea_query::OnConflict};
use uuid::Uuid;

use crate::{Currency, EngineError, ResultEngine, User, Wallet, users, wallets};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    /// Returns the user for `telegram_id`, creating it on first contact.
    ///
    /// Idempotent: on repeat calls the stored record is returned unchanged,
    /// `username` included — the first-seen label sticks. The insert uses an
    /// upsert so concurrent first contact from the same identity cannot
    /// produce duplicates.
    pub async fn get_or_create_user(
        &self,
        telegram_id: &str,
        username: &str,
    ) -> ResultEngine<User> {
        let telegram_id = normalize_required_name(telegram_id, "telegram id")?;
        with_tx!(self, |db_tx| {
            let existing = users::Entity::find()
                .filter(users::Column::TelegramId.eq(telegram_id.as_str()))
                .one(&db_tx)
                .await?;
            let model = match existing {
                Some(model) => model,
                None => {
                    let user = User::new(telegram_id.clone(), username.to_string());
                    users::Entity::insert(users::ActiveModel::from(&user))
                        .on_conflict(
                            OnConflict::column(users::Column::TelegramId)
                                .do_nothing()
                                .to_owned(),
                        )
                        .exec_without_returning(&db_tx)
                        .await?;
                    // Re-read either our row or the one a concurrent first
                    // contact won the race with.
                    users::Entity::find()
                        .filter(users::Column::TelegramId.eq(telegram_id.as_str()))
                        .one(&db_tx)
                        .await?
                        .ok_or_else(|| EngineError::NotFound("user".to_string()))?
                }
            };
            User::try_from(model)
        })
    }

    /// Looks up a user by external id without creating it.
    pub async fn user_by_telegram_id(&self, telegram_id: &str) -> ResultEngine<User> {
        let model = users::Entity::find()
            .filter(users::Column::TelegramId.eq(telegram_id.trim()))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("user".to_string()))?;
        User::try_from(model)
    }

    /// Returns the wallet named `name`, creating it with `currency` if absent.
    ///
    /// The name is the true key: if the wallet already exists, its stored
    /// currency wins even when the caller passed a different one.
    pub async fn get_or_create_wallet(
        &self,
        name: &str,
        currency: Currency,
    ) -> ResultEngine<Wallet> {
        let name = normalize_required_name(name, "wallet name")?;
        with_tx!(self, |db_tx| {
            let existing = wallets::Entity::find()
                .filter(wallets::Column::Name.eq(name.as_str()))
                .one(&db_tx)
                .await?;
            let model = match existing {
                Some(model) => {
                    if model.currency != currency.code() {
                        tracing::warn!(
                            wallet = %name,
                            stored = %model.currency,
                            requested = %currency,
                            "wallet already exists with a different currency; keeping the stored one"
                        );
                    }
                    model
                }
                None => {
                    let wallet = Wallet::new(name.clone(), currency);
                    wallets::Entity::insert(wallets::ActiveModel::from(&wallet))
                        .on_conflict(
                            OnConflict::column(wallets::Column::Name)
                                .do_nothing()
                                .to_owned(),
                        )
                        .exec_without_returning(&db_tx)
                        .await?;
                    wallets::Entity::find()
                        .filter(wallets::Column::Name.eq(name.as_str()))
                        .one(&db_tx)
                        .await?
                        .ok_or_else(|| EngineError::NotFound("wallet".to_string()))?
                }
            };
            Wallet::try_from(model)
        })
    }

    /// Looks up a wallet by name without creating it.
    pub async fn wallet_by_name(&self, name: &str) -> ResultEngine<Wallet> {
        let name = normalize_required_name(name, "wallet name")?;
        let model = wallets::Entity::find()
            .filter(wallets::Column::Name.eq(name.as_str()))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("wallet".to_string()))?;
        Wallet::try_from(model)
    }

    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("user".to_string()))
    }

    pub(super) async fn require_wallet(
        &self,
        db: &DatabaseTransaction,
        wallet_id: Uuid,
    ) -> ResultEngine<wallets::Model> {
        wallets::Entity::find_by_id(wallet_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("wallet".to_string()))
    }
}
