//! Outcome DTOs

use serde::Serialize;

/// Result of a view that passed validation and abuse checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum ViewOutcome {
    /// Counted
    Accepted,
    /// Not counted, and not an error
    Ignored(IgnoreReason),
}

impl ViewOutcome {
    #[inline]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// User agent matched a bot signature
    Bot,
    /// Same identity already viewed this target within retention
    Duplicate,
}

/// Totals from one reconciliation sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub scanned: u64,
    pub updated: u64,
    pub failed: u64,
}
