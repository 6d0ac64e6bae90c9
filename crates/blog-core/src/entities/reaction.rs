//! Reaction entity - one user's like or dislike on a post or comment
//!
//! A (user, target) pair has at most one active reaction. Changing sentiment flips
//! `reaction_type` in place and retracting it sets `is_deleted`; rows are never
//! duplicated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::Snowflake;

/// Kind of entity being reacted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Post,
    Comment,
}

impl TargetType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Comment => "comment",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TargetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            // "blog" is the legacy name for posts
            "post" | "blog" => Ok(Self::Post),
            "comment" => Ok(Self::Comment),
            _ => Err(format!("Invalid target type: {s}")),
        }
    }
}

/// Sentiment of a reaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionType {
    Like,
    Dislike,
}

impl ReactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Dislike => "dislike",
        }
    }
}

impl fmt::Display for ReactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "like" => Ok(Self::Like),
            "dislike" => Ok(Self::Dislike),
            _ => Err(format!("Invalid reaction type: {s}")),
        }
    }
}

/// Reaction entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub id: Snowflake,
    pub user_id: Snowflake,
    pub target_id: Snowflake,
    pub target_type: TargetType,
    pub reaction_type: ReactionType,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reaction {
    /// Create a new active reaction
    pub fn new(
        id: Snowflake,
        user_id: Snowflake,
        target_id: Snowflake,
        target_type: TargetType,
        reaction_type: ReactionType,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            target_id,
            target_type,
            reaction_type,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }

    /// State this reaction puts its (user, target) pair in
    pub fn state(&self) -> ReactionState {
        if self.is_deleted {
            ReactionState::None
        } else {
            ReactionState::from(self.reaction_type)
        }
    }
}

/// Like/dislike totals for one target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionCounts {
    pub likes: i64,
    pub dislikes: i64,
}

impl ReactionCounts {
    pub fn new(likes: i64, dislikes: i64) -> Self {
        Self { likes, dislikes }
    }
}

/// Per-(user, target) reaction state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionState {
    None,
    Liked,
    Disliked,
}

impl From<ReactionType> for ReactionState {
    fn from(kind: ReactionType) -> Self {
        match kind {
            ReactionType::Like => Self::Liked,
            ReactionType::Dislike => Self::Disliked,
        }
    }
}

impl From<Option<&Reaction>> for ReactionState {
    fn from(reaction: Option<&Reaction>) -> Self {
        reaction.map_or(Self::None, Reaction::state)
    }
}

/// Store mutation required to move between states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionTransition {
    /// No active row: insert (or revive) one with this type
    Create(ReactionType),
    /// Active row of the other type: flip it in place
    ChangeType(ReactionType),
    /// Active row of the same type: retract it
    Remove,
}

impl ReactionState {
    /// Toggle `kind` from this state.
    ///
    /// | state    | Like            | Dislike            |
    /// |----------|-----------------|--------------------|
    /// | None     | Create(Like)    | Create(Dislike)    |
    /// | Liked    | Remove          | ChangeType(Dislike)|
    /// | Disliked | ChangeType(Like)| Remove             |
    pub fn toggle(self, kind: ReactionType) -> (ReactionTransition, ReactionState) {
        match (self, kind) {
            (Self::None, kind) => (ReactionTransition::Create(kind), Self::from(kind)),
            (Self::Liked, ReactionType::Like) | (Self::Disliked, ReactionType::Dislike) => {
                (ReactionTransition::Remove, Self::None)
            }
            (Self::Liked, ReactionType::Dislike) | (Self::Disliked, ReactionType::Like) => {
                (ReactionTransition::ChangeType(kind), Self::from(kind))
            }
        }
    }

    /// Active reaction type, if any
    pub fn reaction_type(self) -> Option<ReactionType> {
        match self {
            Self::None => None,
            Self::Liked => Some(ReactionType::Like),
            Self::Disliked => Some(ReactionType::Dislike),
        }
    }
}
