//! Reaction model -> entity mapper

use blog_core::entities::{Reaction, ReactionType, TargetType};
use blog_core::error::DomainError;
use blog_core::value_objects::Snowflake;

use crate::models::ReactionModel;

impl TryFrom<ReactionModel> for Reaction {
    type Error = DomainError;

    fn try_from(model: ReactionModel) -> Result<Self, Self::Error> {
        let target_type: TargetType = model
            .target_type
            .parse()
            .map_err(DomainError::DatabaseError)?;
        let reaction_type: ReactionType = model
            .reaction_type
            .parse()
            .map_err(DomainError::DatabaseError)?;

        Ok(Reaction {
            id: Snowflake::new(model.id),
            user_id: Snowflake::new(model.user_id),
            target_id: Snowflake::new(model.target_id),
            target_type,
            reaction_type,
            is_deleted: model.is_deleted,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
