//! Request DTOs

use blog_core::Snowflake;
use serde::Deserialize;

/// One page view as reported by the transport layer
#[derive(Debug, Clone, Deserialize)]
pub struct TrackViewRequest {
    pub target_id: Snowflake,
    /// Absent (or zero) for anonymous viewers
    #[serde(default)]
    pub user_id: Option<Snowflake>,
    #[serde(default)]
    pub ip_address: String,
    #[serde(default)]
    pub user_agent: String,
}

impl TrackViewRequest {
    pub fn new(
        target_id: Snowflake,
        user_id: Option<Snowflake>,
        ip_address: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            target_id,
            user_id: user_id.filter(|id| !id.is_zero()),
            ip_address: ip_address.into().trim().to_string(),
            user_agent: user_agent.into(),
        }
    }

    /// Anonymous view, attributed to the client IP
    pub fn anonymous(
        target_id: Snowflake,
        ip_address: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self::new(target_id, None, ip_address, user_agent)
    }

    /// Signed-in user id, treating zero as anonymous
    pub fn viewer(&self) -> Option<Snowflake> {
        self.user_id.filter(|id| !id.is_zero())
    }

    /// Client IP, empty when unknown
    pub fn ip(&self) -> &str {
        self.ip_address.trim()
    }
}
