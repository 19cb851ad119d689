//! The module contains the `Wallet` struct and its entity.
//!
//! A wallet is a named ledger container pinned to a single currency. The
//! name is the true key: get-or-create is idempotent on it, and the currency
//! is fixed at first creation.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError};

/// A currency-tagged ledger container.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    /// Stable identifier for this wallet.
    pub id: Uuid,
    /// Unique name; the key used by get-or-create.
    pub name: String,
    /// Immutable once the wallet exists.
    pub currency: Currency,
}

impl Wallet {
    pub fn new(name: String, currency: Currency) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            currency,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub name: String,
    pub currency: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Wallet> for ActiveModel {
    fn from(wallet: &Wallet) -> Self {
        Self {
            id: ActiveValue::Set(wallet.id.to_string()),
            name: ActiveValue::Set(wallet.name.clone()),
            currency: ActiveValue::Set(wallet.currency.code().to_string()),
        }
    }
}

impl TryFrom<Model> for Wallet {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("wallet".to_string()))?,
            name: model.name,
            currency: Currency::try_from(model.currency.as_str())?,
        })
    }
}
