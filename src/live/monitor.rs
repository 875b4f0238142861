//! Live view of one module for one respondent.
//!
//! A monitor loads the module's responses, aggregates them, and then
//! keeps polling the backend for the authoritative score. It also
//! re-aggregates whenever a matching submission is published.
//!
//! All state is owned by a single task. Analytics polls may overlap when
//! the backend is slow; they are kept in a `FuturesUnordered` and their
//! results go through the reconciler's ticket guard.

use crate::analysis::summarize;
use crate::live::events::{SubmissionBus, SurveySubmitted};
use crate::live::handle::PollHandle;
use crate::live::reconciler::{AnalyticsReconciler, PollOutcome, PollTicket, ReconciledScore};
use crate::models::{ModuleAnalytics, ModuleSummary, ResponseSet, SurveyModule};
use crate::source::{synthetic_response_set, with_timeout, SourceError, SurveySource};
use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Where a module's answers came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataOrigin {
    /// The survey backend.
    Source,
    /// Built-in sample data, used because the backend failed.
    Fallback,
}

/// Settings for a module monitor.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub module: SurveyModule,
    pub user_id: String,
    pub analytics_interval: Duration,
    pub request_timeout: Duration,
}

impl MonitorConfig {
    pub fn new(module: SurveyModule, user_id: &str) -> Self {
        Self {
            module,
            user_id: user_id.to_string(),
            analytics_interval: Duration::from_secs(5),
            request_timeout: Duration::from_secs(3),
        }
    }
}

/// A loaded response set and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedResponses {
    pub response_set: ResponseSet,
    pub origin: DataOrigin,
}

/// Everything a dashboard needs to render one module.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleView {
    pub response_set: ResponseSet,
    pub origin: DataOrigin,
    pub summary: ModuleSummary,
    pub score: ReconciledScore,
    pub loaded_at: DateTime<Utc>,
}

/// Fetch a module's responses, falling back to sample data on failure.
pub async fn load_responses(
    source: &dyn SurveySource,
    module: SurveyModule,
    user_id: &str,
    timeout: Duration,
) -> LoadedResponses {
    match with_timeout(timeout, source.fetch_response_set(module, user_id)).await {
        Ok(response_set) => {
            debug!(
                "Loaded {} questions and {} answers for {}",
                response_set.questions.len(),
                response_set.answers.len(),
                module
            );
            LoadedResponses {
                response_set,
                origin: DataOrigin::Source,
            }
        }
        Err(e) => {
            warn!("Failed to load {} responses, using sample data: {}", module, e);
            LoadedResponses {
                response_set: synthetic_response_set(module),
                origin: DataOrigin::Fallback,
            }
        }
    }
}

/// Starts module monitors.
pub struct ModuleMonitor;

impl ModuleMonitor {
    /// Load and aggregate the module, then start polling.
    ///
    /// The returned receiver always holds the latest view. The loop stops
    /// when `cancel` is cancelled or the handle is shut down or dropped.
    pub async fn start(
        source: Arc<dyn SurveySource>,
        bus: &SubmissionBus,
        config: MonitorConfig,
        cancel: &CancellationToken,
    ) -> (PollHandle, watch::Receiver<ModuleView>) {
        // Subscribe before loading so no submission is missed.
        let events = bus.subscribe();

        let loaded = load_responses(
            source.as_ref(),
            config.module,
            &config.user_id,
            config.request_timeout,
        )
        .await;
        let summary = summarize(&loaded.response_set.questions, &loaded.response_set.answers);
        let reconciler = AnalyticsReconciler::new(config.module, summary.positive_percentage);

        info!(
            "{} monitor started: {}% positive locally ({} responses)",
            config.module, summary.positive_percentage, summary.total_responses
        );

        let view = ModuleView {
            response_set: loaded.response_set,
            origin: loaded.origin,
            summary,
            score: reconciler.snapshot(),
            loaded_at: Utc::now(),
        };
        let (tx, rx) = watch::channel(view);

        let handle = PollHandle::spawn(cancel, move |cancel| {
            run_monitor(source, config, reconciler, events, tx, cancel)
        });

        (handle, rx)
    }
}

type AnalyticsPoll = BoxFuture<'static, (PollTicket, Result<ModuleAnalytics, SourceError>)>;

async fn next_event(
    events: &mut Option<broadcast::Receiver<SurveySubmitted>>,
) -> Result<SurveySubmitted, broadcast::error::RecvError> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn run_monitor(
    source: Arc<dyn SurveySource>,
    config: MonitorConfig,
    mut reconciler: AnalyticsReconciler,
    events: broadcast::Receiver<SurveySubmitted>,
    tx: watch::Sender<ModuleView>,
    cancel: CancellationToken,
) {
    let module = config.module;
    let mut events = Some(events);
    let mut ticker = tokio::time::interval(config.analytics_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut in_flight: FuturesUnordered<AnalyticsPoll> = FuturesUnordered::new();

    loop {
        let mut reload = false;

        tokio::select! {
            biased;

            _ = cancel.cancelled() => break,

            Some((ticket, result)) = in_flight.next(), if !in_flight.is_empty() => {
                if cancel.is_cancelled() {
                    break;
                }
                if reconciler.complete_poll(ticket, result) != PollOutcome::Superseded {
                    let score = reconciler.snapshot();
                    tx.send_modify(|view| view.score = score);
                }
            }

            _ = ticker.tick() => {
                let ticket = reconciler.begin_poll();
                let source = source.clone();
                let timeout = config.request_timeout;
                debug!("{} analytics poll #{}", module, ticket.sequence());
                in_flight.push(
                    async move {
                        (ticket, with_timeout(timeout, source.fetch_module_analytics(module)).await)
                    }
                    .boxed(),
                );
            }

            event = next_event(&mut events) => match event {
                Ok(event) if event.matches(module, &config.user_id) => reload = true,
                Ok(event) => debug!("Ignoring submission for other module/user: {:?}", event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("{} monitor missed {} submission events", module, skipped);
                    reload = true;
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Submission bus closed");
                    events = None;
                }
            },
        }

        if reload {
            info!("Submission received, re-aggregating {}", module);
            let loaded = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                loaded = load_responses(
                    source.as_ref(),
                    module,
                    &config.user_id,
                    config.request_timeout,
                ) => loaded,
            };

            let summary = summarize(&loaded.response_set.questions, &loaded.response_set.answers);
            reconciler.set_local(summary.positive_percentage);
            let score = reconciler.snapshot();
            tx.send_modify(|view| {
                view.response_set = loaded.response_set;
                view.origin = loaded.origin;
                view.summary = summary;
                view.score = score;
                view.loaded_at = Utc::now();
            });
        }
    }

    debug!("{} monitor stopped", module);
}
