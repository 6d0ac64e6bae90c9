//! PostgreSQL implementation of ContentRepository
//!
//! Only touches the engagement columns of `posts`.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use blog_core::entities::{ContentPatch, CounterField, EngagementCounters};
use blog_core::traits::{ContentRepository, RepoResult};
use blog_core::value_objects::Snowflake;

use crate::models::ContentCountersModel;

use super::error::{content_not_found, map_db_error};

/// PostgreSQL implementation of ContentRepository
#[derive(Clone)]
pub struct PgContentRepository {
    pool: PgPool,
}

impl PgContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentRepository for PgContentRepository {
    #[instrument(skip(self))]
    async fn get_counters(&self, id: Snowflake) -> RepoResult<Option<EngagementCounters>> {
        let result = sqlx::query_as::<_, ContentCountersModel>(
            r"
            SELECT view_count, like_count, dislike_count, comment_count
            FROM posts
            WHERE id = $1 AND is_deleted = FALSE
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(EngagementCounters::from))
    }

    #[instrument(skip(self))]
    async fn exists(&self, id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1 AND is_deleted = FALSE)
            ",
        )
        .bind(id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result)
    }

    #[instrument(skip(self))]
    async fn increment_counter(
        &self,
        id: Snowflake,
        field: CounterField,
        delta: i64,
    ) -> RepoResult<()> {
        // Column names come from a closed enum, never from input
        let column = field.column();
        let sql = format!(
            "UPDATE posts SET {column} = {column} + $2 WHERE id = $1 AND is_deleted = FALSE"
        );

        let result = sqlx::query(&sql)
            .bind(id.into_inner())
            .bind(delta)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(content_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn patch_fields(&self, id: Snowflake, patch: &ContentPatch) -> RepoResult<()> {
        if patch.is_empty() {
            return Ok(());
        }

        let result = sqlx::query(
            r"
            UPDATE posts
            SET view_count    = COALESCE($2, view_count),
                like_count    = COALESCE($3, like_count),
                dislike_count = COALESCE($4, dislike_count),
                comment_count = COALESCE($5, comment_count),
                popularity    = COALESCE($6, popularity),
                updated_at    = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            ",
        )
        .bind(id.into_inner())
        .bind(patch.view_count)
        .bind(patch.like_count)
        .bind(patch.dislike_count)
        .bind(patch.comment_count)
        .bind(patch.popularity)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(content_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_ids(&self, after: Option<Snowflake>, limit: i64) -> RepoResult<Vec<Snowflake>> {
        let limit = limit.clamp(1, 1000);

        let results = sqlx::query_scalar::<_, i64>(
            r"
            SELECT id
            FROM posts
            WHERE is_deleted = FALSE AND ($1::BIGINT IS NULL OR id > $1)
            ORDER BY id
            LIMIT $2
            ",
        )
        .bind(after.map(Snowflake::into_inner))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Snowflake::new).collect())
    }
}
