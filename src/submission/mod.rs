pub mod controller;

pub use controller::FeedbackForm;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::persistence::FeedbackRecord;

/// Shown whenever a failure carries no detail of its own.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "state", content = "message", rename_all = "camelCase")]
pub enum SubmitState {
    Idle,
    Submitting,
    Success,
    Failed(String),
}

/// What the presentation layer renders: the submit state plus when the
/// last submission went through.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormStatus {
    pub state: SubmitState,
    pub last_submitted_at: Option<DateTime<Utc>>,
}

impl FormStatus {
    pub fn is_loading(&self) -> bool {
        self.state == SubmitState::Submitting
    }

    pub fn is_success(&self) -> bool {
        self.state == SubmitState::Success
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            SubmitState::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

impl Default for FormStatus {
    fn default() -> Self {
        Self {
            state: SubmitState::Idle,
            last_submitted_at: None,
        }
    }
}

/// Result of one submit request.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Another submission was still in flight.
    Ignored,
    /// The validator refused the form; nothing was sent.
    Rejected(String),
    Stored(Vec<FeedbackRecord>),
    Failed(String),
}
