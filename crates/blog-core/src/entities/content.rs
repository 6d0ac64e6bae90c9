//! Content item - the post whose engagement counters the engine maintains
//!
//! The content-management subsystem owns the rest of the post; the engine only
//! reads and patches the counter and popularity fields defined here.

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Counter and popularity projection of a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: Snowflake,
    pub view_count: i64,
    pub like_count: i64,
    pub dislike_count: i64,
    pub comment_count: i64,
    pub popularity: f64,
    pub is_deleted: bool,
}

impl ContentItem {
    /// Create an item with zeroed counters
    pub fn new(id: Snowflake) -> Self {
        Self {
            id,
            view_count: 0,
            like_count: 0,
            dislike_count: 0,
            comment_count: 0,
            popularity: 0.0,
            is_deleted: false,
        }
    }

    pub fn counters(&self) -> EngagementCounters {
        EngagementCounters {
            views: self.view_count,
            likes: self.like_count,
            dislikes: self.dislike_count,
            comments: self.comment_count,
        }
    }

    /// Apply a patch in place (used by in-memory stores and tests)
    pub fn apply(&mut self, patch: &ContentPatch) {
        if let Some(views) = patch.view_count {
            self.view_count = views;
        }
        if let Some(likes) = patch.like_count {
            self.like_count = likes;
        }
        if let Some(dislikes) = patch.dislike_count {
            self.dislike_count = dislikes;
        }
        if let Some(comments) = patch.comment_count {
            self.comment_count = comments;
        }
        if let Some(popularity) = patch.popularity {
            self.popularity = popularity;
        }
    }
}

/// Raw engagement counts for one target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementCounters {
    pub views: i64,
    pub likes: i64,
    pub dislikes: i64,
    pub comments: i64,
}

/// Counter columns that support atomic increment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterField {
    Views,
    Likes,
    Dislikes,
    Comments,
}

impl CounterField {
    /// Column name in the posts table
    pub fn column(self) -> &'static str {
        match self {
            Self::Views => "view_count",
            Self::Likes => "like_count",
            Self::Dislikes => "dislike_count",
            Self::Comments => "comment_count",
        }
    }
}

/// Partial update of counter/popularity fields. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentPatch {
    pub view_count: Option<i64>,
    pub like_count: Option<i64>,
    pub dislike_count: Option<i64>,
    pub comment_count: Option<i64>,
    pub popularity: Option<f64>,
}

impl ContentPatch {
    pub fn popularity(score: f64) -> Self {
        Self {
            popularity: Some(score),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_reaction_counts(mut self, likes: i64, dislikes: i64) -> Self {
        self.like_count = Some(likes);
        self.dislike_count = Some(dislikes);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.view_count.is_none()
            && self.like_count.is_none()
            && self.dislike_count.is_none()
            && self.comment_count.is_none()
            && self.popularity.is_none()
    }
}
