//! Share edges: the directed access-control relation between users.
//!
//! An edge `(owner, viewer)` grants the viewer read-only access to the whole
//! of the owner's transaction history. There is no per-category or per-wallet
//! scoping: access is all-or-nothing per grant. Revocation deletes the edge
//! outright; nothing is archived.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

/// A directed read grant from `owner_id` to `viewer_id`.
///
/// Invariants: `owner_id != viewer_id`, at most one edge per ordered pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareEdge {
    pub owner_id: Uuid,
    pub viewer_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "shared_access")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub owner_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub viewer_id: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ShareEdge> for ActiveModel {
    fn from(edge: &ShareEdge) -> Self {
        Self {
            owner_id: ActiveValue::Set(edge.owner_id.to_string()),
            viewer_id: ActiveValue::Set(edge.viewer_id.to_string()),
            created_at: ActiveValue::Set(edge.created_at),
        }
    }
}

impl TryFrom<Model> for ShareEdge {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            owner_id: Uuid::parse_str(&model.owner_id)
                .map_err(|_| EngineError::NotFound("user".to_string()))?,
            viewer_id: Uuid::parse_str(&model.viewer_id)
                .map_err(|_| EngineError::NotFound("user".to_string()))?,
            created_at: model.created_at,
        })
    }
}
