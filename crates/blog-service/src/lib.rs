//! # blog-service
//!
//! Application layer: the reaction engine, the view authenticity pipeline and
//! the popularity aggregator, all wired through a [`ServiceContext`].

pub mod dto;
pub mod services;

pub use dto::{IgnoreReason, ReconcileReport, TrackViewRequest, ViewOutcome};
pub use services::{
    BotFilter, PopularityService, ReactionService, ServiceContext, ServiceContextBuilder,
    ServiceError, ServiceResult, SuspicionReason, ViewService,
};
