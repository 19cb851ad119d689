//! Core engine for Quaderno: shared expense tracking.
//!
//! The engine owns the registries (users, wallets), the transaction store,
//! the share graph that controls who may read whose history, the period
//! resolver, the aggregation engine and the listing paginator. Presentation
//! layers (bot, HTTP, CLI) call into [`Engine`] and render its outputs.

pub use currency::Currency;
pub use error::EngineError;
pub use money::MoneyMinor;
pub use ops::{Engine, EngineBuilder, ListedTransaction, TransactionPage, TransactionPatch};
pub use period::{Granularity, Period};
pub use report::{Bucket, CategoryRank, CurrencyReport, ReportRow, aggregate};
pub use shares::ShareEdge;
pub use transactions::Transaction;
pub use users::User;
pub use wallets::Wallet;

mod currency;
mod error;
mod money;
mod ops;
mod period;
mod report;
mod shares;
mod transactions;
mod users;
mod wallets;

type ResultEngine<T> = Result<T, EngineError>;
