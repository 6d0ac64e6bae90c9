//! Content model -> entity mapper

use blog_core::entities::EngagementCounters;

use crate::models::ContentCountersModel;

impl From<ContentCountersModel> for EngagementCounters {
    fn from(model: ContentCountersModel) -> Self {
        EngagementCounters {
            views: model.view_count,
            likes: model.like_count,
            dislikes: model.dislike_count,
            comments: model.comment_count,
        }
    }
}
