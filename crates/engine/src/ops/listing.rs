use std::collections::HashMap;

use sea_orm::{QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, Transaction, User, transactions, users};

use super::{Engine, with_tx};

/// One listed record, annotated with its owner.
#[derive(Clone, Debug, PartialEq)]
pub struct ListedTransaction {
    pub transaction: Transaction,
    pub owner: User,
    /// True when the viewer owns the record; downstream uses this to decide
    /// whether edit/delete actions are offered.
    pub is_own: bool,
}

/// One page of the visibility-resolved transaction list.
#[derive(Clone, Debug, PartialEq)]
pub struct TransactionPage {
    pub items: Vec<ListedTransaction>,
    pub offset: u64,
    pub has_prev: bool,
    pub has_next: bool,
}

impl Engine {
    /// Lists the transactions visible to `viewer_id`, newest first.
    ///
    /// The source set is the viewer's own records plus everything granted to
    /// them, merged and ordered by `(occurred_at DESC, id DESC)` — the id
    /// tiebreak keeps pages stable under equal timestamps. `has_next` comes
    /// from fetching `limit + 1` rows and trimming the sentinel, avoiding a
    /// separate count query.
    pub async fn list_transactions(
        &self,
        viewer_id: Uuid,
        offset: u64,
        limit: u64,
    ) -> ResultEngine<TransactionPage> {
        if limit == 0 {
            return Err(EngineError::InvalidInput("limit must be > 0".to_string()));
        }
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, viewer_id).await?;
            let owner_ids = self.visible_owner_ids(&db_tx, viewer_id).await?;

            let rows: Vec<transactions::Model> = transactions::Entity::find()
                .filter(transactions::Column::UserId.is_in(owner_ids))
                .order_by_desc(transactions::Column::OccurredAt)
                .order_by_desc(transactions::Column::Id)
                .offset(offset)
                .limit(limit.saturating_add(1))
                .all(&db_tx)
                .await?;

            let has_next = rows.len() > limit as usize;
            let has_prev = offset > 0;

            let mut page: Vec<Transaction> = Vec::with_capacity(rows.len().min(limit as usize));
            for model in rows.into_iter().take(limit as usize) {
                page.push(Transaction::try_from(model)?);
            }

            let owners = self.owners_for(&db_tx, &page).await?;
            let mut items = Vec::with_capacity(page.len());
            for tx in page {
                let owner = owners
                    .get(&tx.user_id)
                    .cloned()
                    .ok_or_else(|| EngineError::NotFound("user".to_string()))?;
                let is_own = tx.user_id == viewer_id;
                items.push(ListedTransaction {
                    transaction: tx,
                    owner,
                    is_own,
                });
            }

            Ok(TransactionPage {
                items,
                offset,
                has_prev,
                has_next,
            })
        })
    }

    async fn owners_for(
        &self,
        db: &sea_orm::DatabaseTransaction,
        page: &[Transaction],
    ) -> ResultEngine<HashMap<Uuid, User>> {
        let mut ids: Vec<String> = page.iter().map(|tx| tx.user_id.to_string()).collect();
        ids.sort();
        ids.dedup();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let models = users::Entity::find()
            .filter(users::Column::Id.is_in(ids))
            .all(db)
            .await?;
        let mut owners = HashMap::with_capacity(models.len());
        for model in models {
            let user = User::try_from(model)?;
            owners.insert(user.id, user);
        }
        Ok(owners)
    }
}
