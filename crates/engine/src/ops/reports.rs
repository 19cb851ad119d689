use sea_orm::{QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Currency, CurrencyReport, EngineError, Period, ReportRow, ResultEngine, report, transactions,
    wallets,
};

use super::{Engine, with_tx};

impl Engine {
    /// Builds the aggregated report for everything visible to `viewer_id`
    /// within the resolved period.
    ///
    /// One [`CurrencyReport`] per currency present in the bounded set, in
    /// `Currency::ALL` order; currencies are never summed together. An empty
    /// period yields an empty vector.
    pub async fn report(
        &self,
        viewer_id: Uuid,
        period_expression: &str,
    ) -> ResultEngine<Vec<CurrencyReport>> {
        let period = Period::resolve(period_expression)?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, viewer_id).await?;
            let owner_ids = self.visible_owner_ids(&db_tx, viewer_id).await?;
            self.report_for_owner_ids(&db_tx, owner_ids, &period).await
        })
    }

    /// Builds the report for a single owner's transactions.
    ///
    /// Allowed for the owner themselves and for viewers holding an
    /// `owner -> viewer` share edge; everyone else gets `NotFound`.
    pub async fn report_for_owner(
        &self,
        viewer_id: Uuid,
        owner_id: Uuid,
        period_expression: &str,
    ) -> ResultEngine<Vec<CurrencyReport>> {
        let period = Period::resolve(period_expression)?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, viewer_id).await?;
            if owner_id != viewer_id {
                self.require_share(&db_tx, owner_id, viewer_id).await?;
            }
            self.report_for_owner_ids(&db_tx, vec![owner_id.to_string()], &period)
                .await
        })
    }

    async fn report_for_owner_ids(
        &self,
        db: &sea_orm::DatabaseTransaction,
        owner_ids: Vec<String>,
        period: &Period,
    ) -> ResultEngine<Vec<CurrencyReport>> {
        let rows: Vec<(transactions::Model, Option<wallets::Model>)> =
            transactions::Entity::find()
                .find_also_related(wallets::Entity)
                .filter(transactions::Column::UserId.is_in(owner_ids))
                .filter(transactions::Column::OccurredAt.gte(period.start_at()))
                .filter(transactions::Column::OccurredAt.lt(period.end_at()))
                .all(db)
                .await?;

        // Partition by wallet currency; each partition aggregates alone.
        let mut partitions: Vec<(Currency, Vec<ReportRow>)> = Currency::ALL
            .iter()
            .map(|currency| (*currency, Vec::new()))
            .collect();
        for (tx_model, wallet_model) in rows {
            let wallet_model =
                wallet_model.ok_or_else(|| EngineError::NotFound("wallet".to_string()))?;
            let currency = Currency::try_from(wallet_model.currency.as_str())?;
            let row = ReportRow {
                amount_minor: tx_model.amount_minor,
                category: tx_model.category,
                wallet_name: wallet_model.name,
                occurred_at: tx_model.occurred_at,
            };
            if let Some((_, partition)) = partitions.iter_mut().find(|(c, _)| *c == currency) {
                partition.push(row);
            }
        }

        Ok(partitions
            .into_iter()
            .filter(|(_, rows)| !rows.is_empty())
            .map(|(currency, rows)| report::aggregate(&rows, currency, period))
            .collect())
    }
}
