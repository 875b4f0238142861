//! Reconciliation of local and authoritative module scores.
//!
//! The dashboard shows the locally aggregated percentage until the
//! backend provides an authoritative one. Polls are ticketed so that a
//! slow, older poll can never overwrite the result of a newer one.

use crate::models::{ModuleAnalytics, SurveyModule};
use crate::source::SourceError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Which value the dashboard is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReconcileState {
    /// No authoritative poll has completed yet.
    LocalOnly,
    /// An authoritative score has been received.
    Authoritative,
    /// Authoritative polls have failed and none ever succeeded.
    StaleFallback,
}

/// Sequence number of an analytics poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PollTicket(u64);

impl PollTicket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

/// What a completed poll did to the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// A new authoritative score was applied.
    Applied,
    /// The payload had no numeric score.
    NoScore,
    /// The poll failed; the previous value is kept.
    Failed,
    /// A newer poll already completed; this result was discarded.
    Superseded,
}

/// Published view of a module's displayed score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledScore {
    pub module: SurveyModule,
    /// The percentage to display.
    pub value: u8,
    pub state: ReconcileState,
    pub local: u8,
    pub authoritative: Option<u8>,
    pub last_authoritative_at: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
}

/// Per-module reconciliation state machine.
#[derive(Debug, Clone)]
pub struct AnalyticsReconciler {
    module: SurveyModule,
    local: u8,
    authoritative: Option<u8>,
    state: ReconcileState,
    issued: u64,
    applied: u64,
    consecutive_failures: u32,
    last_authoritative_at: Option<DateTime<Utc>>,
}

impl AnalyticsReconciler {
    pub fn new(module: SurveyModule, local: u8) -> Self {
        Self {
            module,
            local: local.min(100),
            authoritative: None,
            state: ReconcileState::LocalOnly,
            issued: 0,
            applied: 0,
            consecutive_failures: 0,
            last_authoritative_at: None,
        }
    }

    /// Replace the local estimate after a re-aggregation.
    pub fn set_local(&mut self, local: u8) {
        self.local = local.min(100);
    }

    /// Issue a ticket for a poll that is about to start.
    pub fn begin_poll(&mut self) -> PollTicket {
        self.issued += 1;
        PollTicket(self.issued)
    }

    /// Apply the result of a poll.
    ///
    /// Results for tickets not newer than the last applied one are
    /// discarded, whether they succeeded or failed.
    pub fn complete_poll(
        &mut self,
        ticket: PollTicket,
        result: Result<ModuleAnalytics, SourceError>,
    ) -> PollOutcome {
        if ticket.0 <= self.applied {
            debug!(
                "Discarding {} analytics poll #{} (already applied #{})",
                self.module, ticket.0, self.applied
            );
            return PollOutcome::Superseded;
        }
        self.applied = ticket.0;

        match result {
            Ok(analytics) => match analytics.score() {
                Some(score) => {
                    let value = score.round().clamp(0.0, 100.0) as u8;
                    if self.authoritative != Some(value) {
                        info!("{} authoritative score: {}%", self.module, value);
                    }
                    self.authoritative = Some(value);
                    self.state = ReconcileState::Authoritative;
                    self.consecutive_failures = 0;
                    self.last_authoritative_at = Some(Utc::now());
                    PollOutcome::Applied
                }
                None => {
                    debug!("{} analytics carried no positiveScore", self.module);
                    PollOutcome::NoScore
                }
            },
            Err(e) => {
                self.consecutive_failures += 1;
                warn!(
                    "{} analytics poll failed ({} in a row): {}",
                    self.module, self.consecutive_failures, e
                );
                if self.authoritative.is_none() {
                    self.state = ReconcileState::StaleFallback;
                }
                PollOutcome::Failed
            }
        }
    }

    pub fn state(&self) -> ReconcileState {
        self.state
    }

    /// The percentage to display.
    pub fn displayed(&self) -> u8 {
        self.authoritative.unwrap_or(self.local)
    }

    pub fn snapshot(&self) -> ReconciledScore {
        ReconciledScore {
            module: self.module,
            value: self.displayed(),
            state: self.state,
            local: self.local,
            authoritative: self.authoritative,
            last_authoritative_at: self.last_authoritative_at,
            consecutive_failures: self.consecutive_failures,
        }
    }
}
