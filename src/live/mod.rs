//! Live data: submission events, analytics reconciliation and pollers.

pub mod events;
pub mod handle;
pub mod monitor;
pub mod realtime;
pub mod reconciler;

pub use events::{SubmissionBus, SurveySubmitted};
pub use handle::{wait_or_interrupt, PollHandle};
pub use monitor::{
    load_responses, DataOrigin, LoadedResponses, ModuleMonitor, ModuleView, MonitorConfig,
};
pub use realtime::{RealtimeConfig, RealtimeStatsPoller, RealtimeView};
pub use reconciler::{AnalyticsReconciler, PollOutcome, PollTicket, ReconcileState, ReconciledScore};
