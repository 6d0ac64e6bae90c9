//! View event - one recorded visit, kept only for the retention window

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::Snowflake;

/// Recorded view of a target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewEvent {
    pub target_id: Snowflake,
    /// `None` for anonymous viewers
    pub user_id: Option<Snowflake>,
    pub ip_address: String,
    pub user_agent: String,
    pub viewed_at: DateTime<Utc>,
}

impl ViewEvent {
    pub fn new(
        target_id: Snowflake,
        user_id: Option<Snowflake>,
        ip_address: impl Into<String>,
        user_agent: impl Into<String>,
        viewed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            target_id,
            user_id: user_id.filter(|id| !id.is_zero()),
            ip_address: ip_address.into(),
            user_agent: user_agent.into(),
            viewed_at,
        }
    }

    /// Identity used for recency dedup
    pub fn identity(&self) -> ViewIdentity {
        ViewIdentity::resolve(self.user_id, &self.ip_address)
    }
}

/// Who a view is attributed to: the signed-in user, else the client IP
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ViewIdentity {
    User(Snowflake),
    Ip(String),
}

impl ViewIdentity {
    /// User id wins over IP. A zero user id counts as anonymous.
    pub fn resolve(user_id: Option<Snowflake>, ip_address: &str) -> Self {
        match user_id.filter(|id| !id.is_zero()) {
            Some(user_id) => Self::User(user_id),
            None => Self::Ip(ip_address.to_string()),
        }
    }

    /// Stable string key, namespaced so a user id never collides with an IP
    pub fn key(&self) -> String {
        match self {
            Self::User(id) => format!("u:{id}"),
            Self::Ip(ip) => format!("ip:{ip}"),
        }
    }
}

impl fmt::Display for ViewIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}
