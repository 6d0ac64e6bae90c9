//! Popularity weights - linear scoring of engagement counters

use serde::Deserialize;

use crate::entities::EngagementCounters;

/// Weights applied to each counter when computing popularity.
///
/// `popularity = views*view + likes*like - dislikes*dislike + comments*comment`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PopularityWeights {
    #[serde(default = "default_view_weight")]
    pub view: f64,
    #[serde(default = "default_like_weight")]
    pub like: f64,
    /// Subtracted per dislike
    #[serde(default = "default_dislike_weight")]
    pub dislike: f64,
    #[serde(default = "default_comment_weight")]
    pub comment: f64,
}

impl Default for PopularityWeights {
    fn default() -> Self {
        Self {
            view: default_view_weight(),
            like: default_like_weight(),
            dislike: default_dislike_weight(),
            comment: default_comment_weight(),
        }
    }
}

impl PopularityWeights {
    /// Score a set of counters. Pure; no rounding or clamping.
    pub fn score(&self, counters: &EngagementCounters) -> f64 {
        counters.views as f64 * self.view + counters.likes as f64 * self.like
            - counters.dislikes as f64 * self.dislike
            + counters.comments as f64 * self.comment
    }
}

fn default_view_weight() -> f64 {
    1.0
}

fn default_like_weight() -> f64 {
    3.0
}

fn default_dislike_weight() -> f64 {
    2.0
}

fn default_comment_weight() -> f64 {
    2.0
}
