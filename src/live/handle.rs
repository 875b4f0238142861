//! Ownership of background poll loops.

use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Handle to a running poll loop.
///
/// Cancelling the parent token, calling [`PollHandle::shutdown`] or
/// dropping the handle stops the loop. After `shutdown` returns the loop
/// has exited and will publish nothing further.
#[derive(Debug)]
pub struct PollHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Spawn `run` with a child of `parent`.
    ///
    /// `run` receives the child token and must check it after every
    /// suspension point before applying results.
    pub fn spawn<F, Fut>(parent: &CancellationToken, run: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = parent.child_token();
        let task = tokio::spawn(run(cancel.clone()));
        Self {
            cancel,
            task: Some(task),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Cancel the loop and wait for it to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if e.is_panic() {
                    error!("Poll loop panicked: {}", e);
                }
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Wait for `duration`, or until `interrupt` resolves successfully.
///
/// Returns `true` when interrupted. If `interrupt` fails (no signal
/// support) the full duration is still awaited.
pub async fn wait_or_interrupt<F>(duration: Duration, interrupt: F) -> bool
where
    F: Future<Output = io::Result<()>>,
{
    let sleep = tokio::time::sleep(duration);
    tokio::pin!(sleep);

    tokio::select! {
        _ = &mut sleep => false,
        signal = interrupt => match signal {
            Ok(()) => {
                info!("Interrupted, stopping pollers");
                true
            }
            Err(e) => {
                warn!("Failed to listen for Ctrl-C: {}", e);
                sleep.await;
                false
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    async fn count_until_cancelled(cancel: CancellationToken, ticks: Arc<AtomicUsize>) {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    ticks.fetch_add(1, Ordering::SeqCst);
                }
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_loop() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let parent = CancellationToken::new();
        let counter = ticks.clone();
        let handle =
            PollHandle::spawn(&parent, move |cancel| count_until_cancelled(cancel, counter));

        tokio::time::sleep(Duration::from_millis(2500)).await;
        handle.shutdown().await;
        let after_shutdown = ticks.load(Ordering::SeqCst);
        assert_eq!(after_shutdown, 3);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), after_shutdown);
        assert!(!parent.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_parent_cancellation_and_drop() {
        let parent = CancellationToken::new();
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let handle =
            PollHandle::spawn(&parent, move |cancel| count_until_cancelled(cancel, counter));

        parent.cancel();
        assert!(handle.is_cancelled());
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(handle.is_finished());

        let other = PollHandle::spawn(&CancellationToken::new(), |cancel| async move {
            cancel.cancelled().await;
        });
        let token = other.cancel.clone();
        drop(other);
        assert!(token.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_runs_full_duration_without_signal_support() {
        let start = tokio::time::Instant::now();
        let interrupted = wait_or_interrupt(Duration::from_secs(30), async {
            Err(io::Error::new(io::ErrorKind::Unsupported, "no signal handler"))
        })
        .await;

        assert!(!interrupted);
        assert_eq!(start.elapsed(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_stops_early_on_interrupt() {
        let start = tokio::time::Instant::now();
        let interrupted = wait_or_interrupt(Duration::from_secs(30), async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Ok(())
        })
        .await;

        assert!(interrupted);
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }
}
