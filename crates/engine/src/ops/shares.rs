use chrono::Utc;
use sea_orm::{DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, ShareEdge, User, shares, users};

use super::{Engine, with_tx};

impl Engine {
    /// Grants `viewer` read access to the whole of `owner`'s transactions.
    ///
    /// Fails with `InvalidGrant` on a self-share and with `DuplicateGrant`
    /// when the ordered edge already exists. Both users must be registered.
    pub async fn grant_access(&self, owner_id: Uuid, viewer_id: Uuid) -> ResultEngine<ShareEdge> {
        if owner_id == viewer_id {
            return Err(EngineError::InvalidGrant(
                "cannot share transactions with yourself".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, owner_id).await?;
            self.require_user(&db_tx, viewer_id).await?;

            let existing =
                shares::Entity::find_by_id((owner_id.to_string(), viewer_id.to_string()))
                    .one(&db_tx)
                    .await?;
            if existing.is_some() {
                return Err(EngineError::DuplicateGrant(format!(
                    "access already granted to {viewer_id}"
                )));
            }

            let edge = ShareEdge {
                owner_id,
                viewer_id,
                created_at: Utc::now(),
            };
            shares::ActiveModel::from(&edge).insert(&db_tx).await?;
            Ok(edge)
        })
    }

    /// Revokes a previously granted edge.
    ///
    /// Takes effect on the next visibility computation; the edge is deleted,
    /// not archived. Fails with `NotFound` when no such edge exists.
    pub async fn revoke_access(&self, owner_id: Uuid, viewer_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let edge = shares::Entity::find_by_id((owner_id.to_string(), viewer_id.to_string()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("share".to_string()))?;
            edge.delete(&db_tx).await?;
            Ok(())
        })
    }

    /// Users the owner has granted access to.
    pub async fn viewers_of(&self, owner_id: Uuid) -> ResultEngine<Vec<User>> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, owner_id).await?;
            let viewer_ids: Vec<String> = shares::Entity::find()
                .filter(shares::Column::OwnerId.eq(owner_id.to_string()))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|edge| edge.viewer_id)
                .collect();
            self.users_by_ids(&db_tx, viewer_ids).await
        })
    }

    /// Users that granted the viewer access to their transactions.
    pub async fn owners_visible_to(&self, viewer_id: Uuid) -> ResultEngine<Vec<User>> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, viewer_id).await?;
            let owner_ids: Vec<String> = shares::Entity::find()
                .filter(shares::Column::ViewerId.eq(viewer_id.to_string()))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|edge| edge.owner_id)
                .collect();
            self.users_by_ids(&db_tx, owner_ids).await
        })
    }

    /// The visibility set: the viewer itself plus every owner with an inbound
    /// share edge.
    ///
    /// Recomputed on every request, inside the same DB transaction as the
    /// query it feeds, so grants and revocations take effect immediately.
    pub(super) async fn visible_owner_ids(
        &self,
        db: &DatabaseTransaction,
        viewer_id: Uuid,
    ) -> ResultEngine<Vec<String>> {
        let mut owner_ids = vec![viewer_id.to_string()];
        let edges = shares::Entity::find()
            .filter(shares::Column::ViewerId.eq(viewer_id.to_string()))
            .all(db)
            .await?;
        owner_ids.extend(edges.into_iter().map(|edge| edge.owner_id));
        Ok(owner_ids)
    }

    /// Ensures an `owner -> viewer` edge exists.
    pub(super) async fn require_share(
        &self,
        db: &DatabaseTransaction,
        owner_id: Uuid,
        viewer_id: Uuid,
    ) -> ResultEngine<()> {
        let exists = shares::Entity::find_by_id((owner_id.to_string(), viewer_id.to_string()))
            .one(db)
            .await?
            .is_some();
        if !exists {
            return Err(EngineError::NotFound("share".to_string()));
        }
        Ok(())
    }

    async fn users_by_ids(
        &self,
        db: &DatabaseTransaction,
        ids: Vec<String>,
    ) -> ResultEngine<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = users::Entity::find()
            .filter(users::Column::Id.is_in(ids))
            .all(db)
            .await?;
        models.into_iter().map(User::try_from).collect()
    }
}
