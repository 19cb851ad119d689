//! Users table.
//!
//! A user is created on first contact, keyed by the opaque external
//! `telegram_id`. The display label (`username`) is whatever the first
//! contact carried and is never updated afterwards: identity is stable once
//! established.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

/// A registered user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable internal identifier, generated once and persisted.
    pub id: Uuid,
    /// Opaque external account identifier (unique).
    pub telegram_id: String,
    /// Display label, frozen at first contact.
    pub username: String,
}

impl User {
    pub fn new(telegram_id: String, username: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            telegram_id,
            username,
        }
    }

    /// Label shown to other users: the username, falling back to the
    /// external id when the username is empty.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.username.is_empty() {
            &self.telegram_id
        } else {
            &self.username
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub telegram_id: String,
    pub username: String,
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

impl From<&User> for ActiveModel {
    fn from(user: &User) -> Self {
        Self {
            id: ActiveValue::Set(user.id.to_string()),
            telegram_id: ActiveValue::Set(user.telegram_id.clone()),
            username: ActiveValue::Set(user.username.clone()),
        }
    }
}

impl TryFrom<Model> for User {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("user".to_string()))?,
            telegram_id: model.telegram_id,
            username: model.username,
        })
    }
}
