//! Poll loop: one pass at startup, then one per scan interval.
//!
//! Passes run inline on the caller's task so they can never overlap; a tick
//! that falls due while a pass is still running is delayed, not doubled up.
//! The shutdown future is only polled between passes.

use std::future::Future;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::info;

/// Fixed-period pass scheduler.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    period: Duration,
}

impl Scheduler {
    /// Creates a scheduler. A zero period is raised to one second.
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_secs(1)),
        }
    }

    /// Time between pass starts.
    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Runs `pass` immediately and then every period until `shutdown`
    /// resolves. Returns the number of completed passes.
    pub async fn run_until<F, Fut, S>(&self, mut pass: F, shutdown: S) -> usize
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
        S: Future<Output = ()>,
    {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut completed = 0usize;
        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => {
                    info!(passes = completed, "shutdown requested, stopping scheduler");
                    break;
                }
                _ = ticker.tick() => {}
            }

            if completed == 0 {
                info!("initial run");
            }
            pass().await;
            completed += 1;
            info!(next_in_secs = self.period.as_secs(), "waiting...");
        }
        completed
    }
}
