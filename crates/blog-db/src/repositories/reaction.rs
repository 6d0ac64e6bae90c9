//! PostgreSQL implementation of ReactionRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use blog_core::entities::{Reaction, ReactionType, TargetType};
use blog_core::traits::{ReactionRepository, RepoResult};
use blog_core::value_objects::Snowflake;

use crate::models::{ReactionModel, UpsertedReactionModel};

use super::error::{map_db_error, reaction_not_found};

/// PostgreSQL implementation of ReactionRepository
#[derive(Clone)]
pub struct PgReactionRepository {
    pool: PgPool,
}

impl PgReactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReactionRepository for PgReactionRepository {
    #[instrument(skip(self))]
    async fn upsert(
        &self,
        id: Snowflake,
        user_id: Snowflake,
        target_id: Snowflake,
        target_type: TargetType,
        reaction_type: ReactionType,
    ) -> RepoResult<(Reaction, bool)> {
        // xmax is zero only for a row this statement inserted
        let row = sqlx::query_as::<_, UpsertedReactionModel>(
            r"
            INSERT INTO reactions (id, user_id, target_id, target_type, reaction_type, is_deleted, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, FALSE, NOW(), NOW())
            ON CONFLICT (user_id, target_id, target_type) DO UPDATE
            SET reaction_type = EXCLUDED.reaction_type,
                is_deleted = FALSE,
                updated_at = NOW()
            RETURNING id, user_id, target_id, target_type, reaction_type, is_deleted,
                      created_at, updated_at, (xmax = 0) AS inserted
            ",
        )
        .bind(id.into_inner())
        .bind(user_id.into_inner())
        .bind(target_id.into_inner())
        .bind(target_type.as_str())
        .bind(reaction_type.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        let inserted = row.inserted;
        Ok((Reaction::try_from(row.reaction)?, inserted))
    }

    #[instrument(skip(self))]
    async fn soft_delete(&self, reaction_id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE reactions
            SET is_deleted = TRUE, updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            ",
        )
        .bind(reaction_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(reaction_not_found(reaction_id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_active(
        &self,
        user_id: Snowflake,
        target_id: Snowflake,
    ) -> RepoResult<Option<Reaction>> {
        let result = sqlx::query_as::<_, ReactionModel>(
            r"
            SELECT id, user_id, target_id, target_type, reaction_type, is_deleted, created_at, updated_at
            FROM reactions
            WHERE user_id = $1 AND target_id = $2 AND is_deleted = FALSE
            ",
        )
        .bind(user_id.into_inner())
        .bind(target_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Reaction::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn count_by_type(
        &self,
        target_id: Snowflake,
        reaction_type: ReactionType,
    ) -> RepoResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*)
            FROM reactions
            WHERE target_id = $1 AND reaction_type = $2 AND is_deleted = FALSE
            ",
        )
        .bind(target_id.into_inner())
        .bind(reaction_type.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(count)
    }

    #[instrument(skip(self))]
    async fn purge_deleted(&self, before: DateTime<Utc>) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            DELETE FROM reactions
            WHERE is_deleted = TRUE AND updated_at < $1
            ",
        )
        .bind(before)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
