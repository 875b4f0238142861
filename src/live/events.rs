//! Submission notifications.
//!
//! When a respondent submits a survey, whoever handled the submission
//! publishes a [`SurveySubmitted`] on the session's [`SubmissionBus`].
//! Monitors for the matching module and user re-aggregate immediately.

use crate::models::SurveyModule;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

const DEFAULT_CAPACITY: usize = 32;

/// A survey was submitted.
///
/// Fields left as `None` match every module or user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveySubmitted {
    pub module: Option<SurveyModule>,
    pub user_id: Option<String>,
}

impl SurveySubmitted {
    pub fn new(module: SurveyModule, user_id: &str) -> Self {
        Self {
            module: Some(module),
            user_id: Some(user_id.to_string()),
        }
    }

    /// Whether a monitor for `module` and `user_id` should refresh.
    pub fn matches(&self, module: SurveyModule, user_id: &str) -> bool {
        if let Some(ref event_user) = self.user_id {
            if event_user != user_id {
                return false;
            }
        }
        if let Some(event_module) = self.module {
            if event_module != module {
                return false;
            }
        }
        true
    }
}

/// Publish/subscribe channel for submissions, scoped to one session.
#[derive(Debug, Clone)]
pub struct SubmissionBus {
    sender: broadcast::Sender<SurveySubmitted>,
}

impl SubmissionBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish a submission. Returns the number of subscribers reached.
    pub fn publish(&self, event: SurveySubmitted) -> usize {
        debug!("Survey submitted: {:?}", event);
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SurveySubmitted> {
        self.sender.subscribe()
    }
}

impl Default for SubmissionBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
