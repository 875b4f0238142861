//! Periodic refresh of realtime survey counters.

use crate::live::handle::PollHandle;
use crate::models::RealtimeStats;
use crate::source::{with_timeout, SurveySource};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Settings for the realtime stats poller.
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    pub survey_id: Option<String>,
    pub interval: Duration,
    pub request_timeout: Duration,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            survey_id: None,
            interval: Duration::from_secs(5),
            request_timeout: Duration::from_secs(3),
        }
    }
}

/// Latest realtime counters.
#[derive(Debug, Clone, PartialEq)]
pub struct RealtimeView {
    /// Last successfully fetched stats, kept across failures.
    pub stats: Option<RealtimeStats>,
    /// True until the first poll completes.
    pub loading: bool,
    pub last_error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for RealtimeView {
    fn default() -> Self {
        Self {
            stats: None,
            loading: true,
            last_error: None,
            updated_at: None,
        }
    }
}

/// Starts realtime stats polling.
pub struct RealtimeStatsPoller;

impl RealtimeStatsPoller {
    pub fn start(
        source: Arc<dyn SurveySource>,
        config: RealtimeConfig,
        cancel: &CancellationToken,
    ) -> (PollHandle, watch::Receiver<RealtimeView>) {
        let (tx, rx) = watch::channel(RealtimeView::default());
        let handle =
            PollHandle::spawn(cancel, move |cancel| run_poller(source, config, tx, cancel));
        (handle, rx)
    }
}

async fn run_poller(
    source: Arc<dyn SurveySource>,
    config: RealtimeConfig,
    tx: watch::Sender<RealtimeView>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let fetch = with_timeout(
            config.request_timeout,
            source.fetch_realtime_stats(config.survey_id.as_deref()),
        );
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = fetch => result,
        };

        match result {
            Ok(stats) => {
                debug!(
                    "Realtime stats: {} active, {} today",
                    stats.active_responses, stats.today_responses
                );
                tx.send_modify(|view| {
                    view.stats = Some(stats);
                    view.loading = false;
                    view.last_error = None;
                    view.updated_at = Some(Utc::now());
                });
            }
            Err(e) => {
                warn!("Realtime stats fetch failed: {}", e);
                tx.send_modify(|view| {
                    view.loading = false;
                    view.last_error = Some(e.to_string());
                });
            }
        }
    }

    debug!("Realtime stats poller stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ModuleAnalytics, ResponseSet, SurveyModule};
    use crate::source::SourceError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Succeeds on odd calls, fails on even ones.
    #[derive(Default)]
    struct FlakyStats {
        calls: AtomicU64,
    }

    #[async_trait]
    impl SurveySource for FlakyStats {
        async fn fetch_response_set(
            &self,
            _module: SurveyModule,
            _user_id: &str,
        ) -> Result<ResponseSet, SourceError> {
            Ok(ResponseSet::default())
        }

        async fn fetch_module_analytics(
            &self,
            _module: SurveyModule,
        ) -> Result<ModuleAnalytics, SourceError> {
            Ok(ModuleAnalytics::default())
        }

        async fn fetch_realtime_stats(
            &self,
            survey_id: Option<&str>,
        ) -> Result<RealtimeStats, SourceError> {
            assert_eq!(survey_id, Some("survey-1"));
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call % 2 == 0 {
                return Err(SourceError::Fetch("503".to_string()));
            }
            Ok(RealtimeStats {
                active_responses: call,
                ..Default::default()
            })
        }
    }

    fn config() -> RealtimeConfig {
        RealtimeConfig {
            survey_id: Some("survey-1".to_string()),
            interval: Duration::from_secs(5),
            request_timeout: Duration::from_secs(3),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_previous_stats() {
        let source = Arc::new(FlakyStats::default());
        let cancel = CancellationToken::new();
        let (handle, rx) = RealtimeStatsPoller::start(source.clone(), config(), &cancel);
        assert!(rx.borrow().loading);

        tokio::time::sleep(Duration::from_secs(1)).await;
        {
            let view = rx.borrow();
            assert!(!view.loading);
            assert_eq!(view.stats.as_ref().map(|s| s.active_responses), Some(1));
        }

        tokio::time::sleep(Duration::from_secs(5)).await;
        {
            let view = rx.borrow();
            assert_eq!(view.stats.as_ref().map(|s| s.active_responses), Some(1));
            assert!(view.last_error.is_some());
        }

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(rx.borrow().stats.as_ref().map(|s| s.active_responses), Some(3));
        assert!(rx.borrow().last_error.is_none());

        handle.shutdown().await;
        let calls = source.calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), calls);
    }
}
