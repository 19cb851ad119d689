//! Transaction primitives.
//!
//! A `Transaction` is a single signed monetary record: negative amounts are
//! expenses, positive amounts income, zero is accepted. Each transaction
//! belongs to exactly one wallet and therefore exactly one currency.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    /// Owning user; the only identity allowed to edit or delete the record.
    pub user_id: Uuid,
    pub wallet_id: Uuid,
    /// Signed amount in minor units of the wallet currency.
    pub amount_minor: i64,
    pub description: String,
    pub location: String,
    /// Free text, deliberately not normalized ("Food" != "food").
    pub category: String,
    pub occurred_at: DateTime<Utc>,
}

impl Transaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: Uuid,
        wallet_id: Uuid,
        amount_minor: i64,
        description: String,
        location: String,
        category: String,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            wallet_id,
            amount_minor,
            description,
            location,
            category,
            occurred_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub wallet_id: String,
    pub amount_minor: i64,
    pub description: String,
    pub location: String,
    pub category: String,
    pub occurred_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::WalletId",
        to = "super::wallets::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Wallets,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            user_id: ActiveValue::Set(tx.user_id.to_string()),
            wallet_id: ActiveValue::Set(tx.wallet_id.to_string()),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            description: ActiveValue::Set(tx.description.clone()),
            location: ActiveValue::Set(tx.location.clone()),
            category: ActiveValue::Set(tx.category.clone()),
            occurred_at: ActiveValue::Set(tx.occurred_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("transaction".to_string()))?,
            user_id: Uuid::parse_str(&model.user_id)
                .map_err(|_| EngineError::NotFound("user".to_string()))?,
            wallet_id: Uuid::parse_str(&model.wallet_id)
                .map_err(|_| EngineError::NotFound("wallet".to_string()))?,
            amount_minor: model.amount_minor,
            description: model.description,
            location: model.location,
            category: model.category,
            occurred_at: model.occurred_at,
        })
    }
}
