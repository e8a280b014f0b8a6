//! Native polling loop

use crate::ClientError;
use nanostore_core::poll::{ApplyOutcome, PollState};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// What a loop reports to its sink
#[derive(Debug)]
pub enum PollEvent<'a, T> {
    /// A fetch returned a value different from the one shown
    Updated(&'a T),
    /// A fetch failed; the loop retries on the next tick
    Failed(&'a ClientError),
}

/// Counters for a finished loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub ticks: u64,
    pub updates: u64,
    pub failures: u64,
}

/// Fetches immediately, then once per interval, until cancelled.
///
/// Fetches never overlap: a tick that comes due while a fetch is in flight
/// waits for it. Cancelling drops an in-flight fetch.
pub struct Poller {
    interval: Duration,
    shutdown_token: CancellationToken,
}

impl Poller {
    pub fn new(interval: Duration) -> Self {
        Self::with_token(interval, CancellationToken::new())
    }

    pub const fn with_token(interval: Duration, shutdown_token: CancellationToken) -> Self {
        Self {
            interval,
            shutdown_token,
        }
    }

    pub fn token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// Run the loop.
    ///
    /// Returns the counters once cancelled, or the error when a fetch
    /// reports an expired session, since retrying cannot succeed.
    pub async fn run<T, F, Fut, S>(&self, mut fetch: F, mut sink: S) -> Result<PollSummary, ClientError>
    where
        T: Serialize,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
        S: FnMut(PollEvent<'_, T>),
    {
        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut state = PollState::new();
        let mut summary = PollSummary::default();

        loop {
            tokio::select! {
                biased;
                () = self.shutdown_token.cancelled() => break,
                _ = interval.tick() => {}
            }

            summary.ticks += 1;
            let ticket = state.begin();
            let result = tokio::select! {
                biased;
                () = self.shutdown_token.cancelled() => break,
                result = fetch() => result,
            };

            match result {
                Ok(value) => {
                    if state.apply(ticket, value) == ApplyOutcome::Updated {
                        summary.updates += 1;
                        if let Some(value) = state.value() {
                            sink(PollEvent::Updated(value));
                        }
                    }
                }
                Err(err) => {
                    summary.failures += 1;
                    state.fail(ticket);
                    sink(PollEvent::Failed(&err));
                    if err.is_auth_expired() {
                        tracing::warn!(error = %err, "stopping poll loop, session expired");
                        return Err(err);
                    }
                    tracing::error!(error = %err, "poll fetch failed");
                }
            }
        }

        state.close();
        tracing::debug!(?summary, "poll loop stopped");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use tokio::time::Instant;

    fn scripted<T>(
        script: Vec<Result<T, ClientError>>,
    ) -> impl FnMut() -> std::future::Ready<Result<T, ClientError>> {
        let mut script = VecDeque::from(script);
        move || {
            std::future::ready(
                script
                    .pop_front()
                    .unwrap_or_else(|| Err(ClientError::Configuration("script exhausted".into()))),
            )
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_immediately_then_every_interval() {
        let poller = Poller::new(Duration::from_millis(500));
        let token = poller.token();
        let start = Instant::now();
        let mut seen = Vec::new();

        let summary = poller
            .run(scripted(vec![Ok(1), Ok(1), Ok(2), Ok(3)]), |event| {
                if let PollEvent::Updated(value) = event {
                    seen.push((*value, start.elapsed()));
                    if *value == 3 {
                        token.cancel();
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(
            seen,
            vec![
                (1, Duration::ZERO),
                (2, Duration::from_millis(1000)),
                (3, Duration::from_millis(1500)),
            ]
        );
        assert_eq!(summary.ticks, 4);
        assert_eq!(summary.updates, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_retried_next_tick() {
        let poller = Poller::new(Duration::from_secs(3600));
        let token = poller.token();
        let mut failures = 0;

        let summary = poller
            .run(
                scripted(vec![
                    Err(ClientError::ServerError {
                        status: 502,
                        message: "bad gateway".into(),
                    }),
                    Ok(vec!["row"]),
                ]),
                |event| match event {
                    PollEvent::Failed(_) => failures += 1,
                    PollEvent::Updated(_) => token.cancel(),
                },
            )
            .await
            .unwrap();

        assert_eq!(failures, 1);
        assert_eq!(summary.failures, 1);
        assert_eq!(summary.updates, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_session_stops_the_loop() {
        let poller = Poller::new(Duration::from_millis(500));
        let result = poller
            .run(scripted::<u32>(vec![Ok(1), Err(ClientError::MissingToken)]), |_| {})
            .await;
        assert!(matches!(result, Err(ClientError::MissingToken)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_start() {
        let poller = Poller::new(Duration::from_millis(500));
        poller.token().cancel();
        let summary = poller
            .run(scripted::<u32>(vec![Ok(1)]), |_| panic!("no events expected"))
            .await
            .unwrap();
        assert_eq!(summary, PollSummary::default());
    }
}
