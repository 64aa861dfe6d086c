use serde::Serialize;
use strum::Display;

use super::ids::HostId;
use crate::diff::HostDiff;

/// What a reconciler workflow did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OutcomeAction {
    Created,
    Updated,
    Unchanged,
    Enabled,
    Disabled,
    Archived,
    Deleted,
    /// The host did not exist and the caller asked to tolerate that.
    Missing,
}

/// Result of one reconciler workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostOutcome {
    pub action: OutcomeAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostid: Option<HostId>,
    pub message: String,
    /// Fields written by an update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<HostDiff>,
}

impl HostOutcome {
    pub fn new(action: OutcomeAction, hostid: Option<HostId>, message: impl Into<String>) -> Self {
        Self {
            action,
            hostid,
            message: message.into(),
            diff: None,
        }
    }

    #[must_use]
    pub fn with_diff(mut self, diff: HostDiff) -> Self {
        self.diff = Some(diff);
        self
    }
}
