// Ticker - recurring task with explicit cancellation
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TickerError {
    #[error("Ticker period must be non-zero")]
    ZeroPeriod,
}

/// Cooperative cancellation flag shared between a ticker and its owner.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    tx: Arc<watch::Sender<bool>>,
}

impl CancellationToken {
    fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        loop {
            let cancelled = *rx.borrow_and_update();
            if cancelled || rx.changed().await.is_err() {
                return;
            }
        }
    }
}

/// Runs a task immediately and then once per period until cancelled.
///
/// Every run is spawned as its own task, so a slow run never holds back the
/// next tick. Cancelling stops future ticks but leaves runs already in
/// flight alone.
#[derive(Debug)]
pub struct Ticker {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Ticker {
    pub fn spawn<F, Fut>(period: Duration, task: F) -> Result<Self, TickerError>
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if period.is_zero() {
            return Err(TickerError::ZeroPeriod);
        }

        let token = CancellationToken::new();
        let loop_token = token.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = loop_token.cancelled() => break,
                    _ = interval.tick() => {
                        if loop_token.is_cancelled() {
                            break;
                        }
                        tokio::spawn(task());
                    }
                }
            }
            tracing::debug!("Ticker stopped");
        });

        Ok(Self { token, handle })
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_ticker(period: Duration) -> (Ticker, Arc<AtomicUsize>) {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let ticker = Ticker::spawn(period, move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        })
        .unwrap();
        (ticker, runs)
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_immediately_then_every_period() {
        let (_ticker, runs) = counting_ticker(Duration::from_millis(3000));

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(6000)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_future_runs() {
        let (ticker, runs) = counting_ticker(Duration::from_millis(1000));
        tokio::time::sleep(Duration::from_millis(1500)).await;
        ticker.cancel();
        let seen = runs.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert_eq!(runs.load(Ordering::SeqCst), seen);
        assert!(ticker.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_run_does_not_delay_next_tick() {
        let started = Arc::new(AtomicUsize::new(0));
        let counter = started.clone();
        let _ticker = Ticker::spawn(Duration::from_millis(1000), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10_000)).await;
            }
        })
        .unwrap();

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(started.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let (ticker, runs) = counting_ticker(Duration::from_millis(1000));
        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(ticker);
        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_period_is_refused() {
        let result = Ticker::spawn(Duration::ZERO, || async {});
        assert_eq!(result.err(), Some(TickerError::ZeroPeriod));
    }
}
