//! Report aggregation.
//!
//! Pure computation over a set of transactions that has already been
//! filtered to one currency and one resolved period. Currencies are never
//! mixed: the engine runs one aggregation per currency present in the
//! bounded query and returns one [`CurrencyReport`] each.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::{Currency, Period};

/// One input row: a transaction joined with its wallet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportRow {
    pub amount_minor: i64,
    pub category: String,
    pub wallet_name: String,
    pub occurred_at: DateTime<Utc>,
}

/// Running total for one bucket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bucket {
    pub total_minor: i64,
    pub count: u64,
}

impl Bucket {
    fn add(&mut self, amount_minor: i64) {
        self.total_minor += amount_minor;
        self.count += 1;
    }
}

/// A category with its share of the report total.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryRank {
    pub category: String,
    pub total_minor: i64,
    pub count: u64,
    /// `total / report total * 100`; 0 when the report total is 0.
    pub percentage: f64,
}

/// Aggregated report for a single currency.
#[derive(Clone, Debug, PartialEq)]
pub struct CurrencyReport {
    pub currency: Currency,
    /// Per-period totals, keyed by period label.
    pub overall: BTreeMap<String, Bucket>,
    /// Totals per `(period, category)` pair.
    pub by_category: BTreeMap<(String, String), Bucket>,
    /// Totals per `(period, wallet name)` pair.
    pub by_wallet: BTreeMap<(String, String), Bucket>,
    /// `by_category` collapsed across periods.
    pub category_totals: BTreeMap<String, Bucket>,
    /// Categories sorted by descending `abs(total)`; ties stay in name order.
    pub ranking: Vec<CategoryRank>,
    pub total_minor: i64,
    pub transaction_count: u64,
    /// Sum of positive amounts.
    pub income_minor: i64,
    /// Sum of the absolute values of negative amounts.
    pub expense_minor: i64,
    /// `total / count` in minor units; 0 when there are no transactions.
    pub average_minor: f64,
}

/// Aggregates `rows` (already filtered to `currency` and to the period's
/// range) into a [`CurrencyReport`].
#[must_use]
pub fn aggregate(rows: &[ReportRow], currency: Currency, period: &Period) -> CurrencyReport {
    let mut overall: BTreeMap<String, Bucket> = BTreeMap::new();
    let mut by_category: BTreeMap<(String, String), Bucket> = BTreeMap::new();
    let mut by_wallet: BTreeMap<(String, String), Bucket> = BTreeMap::new();
    let mut income_minor = 0;
    let mut expense_minor = 0;

    for row in rows {
        let key = period.period_key(row.occurred_at);
        overall.entry(key.clone()).or_default().add(row.amount_minor);
        by_category
            .entry((key.clone(), row.category.clone()))
            .or_default()
            .add(row.amount_minor);
        by_wallet
            .entry((key, row.wallet_name.clone()))
            .or_default()
            .add(row.amount_minor);

        if row.amount_minor > 0 {
            income_minor += row.amount_minor;
        } else {
            expense_minor += row.amount_minor.abs();
        }
    }

    let mut category_totals: BTreeMap<String, Bucket> = BTreeMap::new();
    for ((_, category), bucket) in &by_category {
        let entry = category_totals.entry(category.clone()).or_default();
        entry.total_minor += bucket.total_minor;
        entry.count += bucket.count;
    }

    let total_minor: i64 = overall.values().map(|b| b.total_minor).sum();
    let transaction_count: u64 = overall.values().map(|b| b.count).sum();
    let average_minor = if transaction_count == 0 {
        0.0
    } else {
        total_minor as f64 / transaction_count as f64
    };

    // BTreeMap iteration is name-ascending and the sort is stable, so equal
    // absolute totals keep their name order.
    let mut ranking: Vec<CategoryRank> = category_totals
        .iter()
        .map(|(category, bucket)| CategoryRank {
            category: category.clone(),
            total_minor: bucket.total_minor,
            count: bucket.count,
            percentage: if total_minor == 0 {
                0.0
            } else {
                bucket.total_minor as f64 / total_minor as f64 * 100.0
            },
        })
        .collect();
    ranking.sort_by(|a, b| b.total_minor.abs().cmp(&a.total_minor.abs()));

    CurrencyReport {
        currency,
        overall,
        by_category,
        by_wallet,
        category_totals,
        ranking,
        total_minor,
        transaction_count,
        income_minor,
        expense_minor,
        average_minor,
    }
}
