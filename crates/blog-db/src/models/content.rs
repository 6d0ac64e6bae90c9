//! Post engagement columns

use sqlx::FromRow;

/// Counter columns only (popularity input)
#[derive(Debug, Clone, Copy, FromRow)]
pub struct ContentCountersModel {
    pub view_count: i64,
    pub like_count: i64,
    pub dislike_count: i64,
    pub comment_count: i64,
}
