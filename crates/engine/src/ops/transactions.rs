use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, Transaction, transactions};

use super::{Engine, with_tx};

/// Field-wise update for an existing transaction.
///
/// Only set fields change; everything else is left untouched. An empty patch
/// is a no-op that returns the stored record.
#[derive(Clone, Debug, Default)]
pub struct TransactionPatch {
    pub amount_minor: Option<i64>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub wallet_id: Option<Uuid>,
    pub occurred_at: Option<DateTime<Utc>>,
}

impl TransactionPatch {
    fn is_empty(&self) -> bool {
        self.amount_minor.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.category.is_none()
            && self.wallet_id.is_none()
            && self.occurred_at.is_none()
    }
}

impl Engine {
    /// Records a new signed transaction owned by `user_id`.
    ///
    /// Negative amounts are expenses, positive income; zero is accepted.
    #[allow(clippy::too_many_arguments)]
    pub async fn add_transaction(
        &self,
        user_id: Uuid,
        wallet_id: Uuid,
        amount_minor: i64,
        description: &str,
        location: &str,
        category: &str,
        occurred_at: DateTime<Utc>,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            self.require_wallet(&db_tx, wallet_id).await?;

            let tx = Transaction::new(
                user_id,
                wallet_id,
                amount_minor,
                description.to_string(),
                location.to_string(),
                category.to_string(),
                occurred_at,
            );
            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            Ok(tx)
        })
    }

    /// Applies `patch` to a transaction owned by `user_id`.
    ///
    /// A non-owner caller gets `NotFound`, same as for a missing id: the
    /// engine does not reveal whether someone else's record exists.
    pub async fn update_transaction(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
        patch: TransactionPatch,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let model = self.require_owned(&db_tx, user_id, transaction_id).await?;
            if patch.is_empty() {
                Transaction::try_from(model)
            } else {
                if let Some(wallet_id) = patch.wallet_id {
                    self.require_wallet(&db_tx, wallet_id).await?;
                }

                let mut active = transactions::ActiveModel {
                    id: ActiveValue::Set(model.id),
                    ..Default::default()
                };
                if let Some(amount_minor) = patch.amount_minor {
                    active.amount_minor = ActiveValue::Set(amount_minor);
                }
                if let Some(description) = patch.description {
                    active.description = ActiveValue::Set(description);
                }
                if let Some(location) = patch.location {
                    active.location = ActiveValue::Set(location);
                }
                if let Some(category) = patch.category {
                    active.category = ActiveValue::Set(category);
                }
                if let Some(wallet_id) = patch.wallet_id {
                    active.wallet_id = ActiveValue::Set(wallet_id.to_string());
                }
                if let Some(occurred_at) = patch.occurred_at {
                    active.occurred_at = ActiveValue::Set(occurred_at);
                }

                let updated = active.update(&db_tx).await?;
                Transaction::try_from(updated)
            }
        })
    }

    /// Deletes a transaction owned by `user_id`. Destructive: no soft delete.
    pub async fn delete_transaction(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_owned(&db_tx, user_id, transaction_id).await?;
            model.delete(&db_tx).await?;
            Ok(())
        })
    }

    /// Point read of a single transaction.
    ///
    /// Readable by the owner and by any viewer the owner granted access to;
    /// everyone else gets `NotFound`.
    pub async fn transaction(
        &self,
        viewer_id: Uuid,
        transaction_id: Uuid,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let model = transactions::Entity::find_by_id(transaction_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("transaction".to_string()))?;
            let tx = Transaction::try_from(model)?;
            if tx.user_id != viewer_id {
                self.require_share(&db_tx, tx.user_id, viewer_id)
                    .await
                    .map_err(|_| EngineError::NotFound("transaction".to_string()))?;
            }
            Ok(tx)
        })
    }

    async fn require_owned(
        &self,
        db: &sea_orm::DatabaseTransaction,
        user_id: Uuid,
        transaction_id: Uuid,
    ) -> ResultEngine<transactions::Model> {
        let model = transactions::Entity::find_by_id(transaction_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("transaction".to_string()))?;
        if model.user_id != user_id.to_string() {
            return Err(EngineError::NotFound("transaction".to_string()));
        }
        Ok(model)
    }
}
