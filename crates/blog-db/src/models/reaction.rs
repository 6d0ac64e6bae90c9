//! Reaction database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for reactions table
#[derive(Debug, Clone, FromRow)]
pub struct ReactionModel {
    pub id: i64,
    pub user_id: i64,
    pub target_id: i64,
    /// 'post' or 'comment'
    pub target_type: String,
    /// 'like' or 'dislike'
    pub reaction_type: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row returned by the upsert, plus whether it was freshly inserted
#[derive(Debug, Clone, FromRow)]
pub struct UpsertedReactionModel {
    #[sqlx(flatten)]
    pub reaction: ReactionModel,
    pub inserted: bool,
}
