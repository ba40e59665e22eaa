//! Progress snapshots published by the refresh orchestrator.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::portfolio::Portfolio;

/// Identifies one owner's refresh of one portfolio.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProgressKey {
    pub owner_id: String,
    pub portfolio_id: String,
}

impl ProgressKey {
    pub fn new(owner_id: &str, portfolio_id: &str) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            portfolio_id: portfolio_id.to_string(),
        }
    }
}

impl fmt::Display for ProgressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.owner_id, self.portfolio_id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshStatus {
    Idle,
    Processing,
    Completed,
    Error,
}

/// Point-in-time view of a running or finished refresh. Snapshots are
/// replaced whole; readers never see a partially updated one.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub status: RefreshStatus,
    pub total: usize,
    /// Lots attempted so far; equals `total` once the batch finishes.
    pub completed: usize,
    pub cached: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,
    pub errors: Vec<String>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio: Option<Portfolio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProgressSnapshot {
    pub fn processing(total: usize, cached: usize, started_at: DateTime<Utc>) -> Self {
        Self {
            status: RefreshStatus::Processing,
            total,
            completed: 0,
            cached,
            current: None,
            errors: Vec::new(),
            started_at,
            finished_at: None,
            portfolio: None,
            message: None,
        }
    }

    pub fn is_processing(&self) -> bool {
        self.status == RefreshStatus::Processing
    }
}
