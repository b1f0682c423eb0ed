//! Retry building blocks: a bounded, cancellable poll loop and a
//! "recover once, then give up" wrapper.

use std::{fmt::Display, future::Future, time::Duration};

use tokio::time::Instant;
use tracing::debug;

use crate::cancel::CancelToken;

pub const DEFAULT_POLL_ATTEMPTS: u32 = 10;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Time source for poll loops, injectable so tests don't wait on real timers.
#[allow(async_fn_in_trait)]
pub trait Clock {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    /// Measured between attempt starts.
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_POLL_ATTEMPTS,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl PollPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            interval,
        }
    }
}

/// Counters of one running poll loop.
#[derive(Debug, Clone, Copy)]
pub struct PollState {
    pub attempts: u32,
    pub max_attempts: u32,
    pub interval: Duration,
}

impl PollState {
    fn new(policy: PollPolicy) -> Self {
        Self {
            attempts: 0,
            max_attempts: policy.max_attempts.max(1),
            interval: policy.interval,
        }
    }

    fn exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    Ready(T),
    Cancelled,
}

/// Every attempt came back negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("gave up after {attempts} attempts")]
pub struct Exhausted {
    pub attempts: u32,
}

/// Runs `check` until it yields a value, at most `policy.max_attempts` times.
///
/// A check returning `Err` counts as a failed attempt. Cancellation is honoured
/// before each check and while waiting between checks; once seen, no further
/// check is issued.
pub async fn poll_until<C, F, Fut, T, E>(
    clock: &C,
    policy: PollPolicy,
    cancel: &CancelToken,
    mut check: F,
) -> Result<PollOutcome<T>, Exhausted>
where
    C: Clock,
    F: FnMut(PollState) -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
    E: Display,
{
    let mut state = PollState::new(policy);
    loop {
        if cancel.is_cancelled() {
            return Ok(PollOutcome::Cancelled);
        }

        let started = clock.now();
        state.attempts += 1;
        match check(state).await {
            Ok(Some(value)) => return Ok(PollOutcome::Ready(value)),
            Ok(None) => debug!("attempt {}/{} not ready", state.attempts, state.max_attempts),
            Err(err) => debug!(
                "attempt {}/{} failed: {err}",
                state.attempts, state.max_attempts
            ),
        }

        if state.exhausted() {
            return Err(Exhausted {
                attempts: state.attempts,
            });
        }

        let wait = state
            .interval
            .saturating_sub(clock.now().saturating_duration_since(started));
        tokio::select! {
            _ = clock.sleep(wait) => {}
            _ = cancel.cancelled() => return Ok(PollOutcome::Cancelled),
        }
    }
}

/// Runs `op`, and when its failure is one `should_recover` accepts, runs `recover`
/// once and then `op` a second time with the input `recover` hands back.
///
/// Errors from the recovery itself and from the second attempt are returned as is;
/// nothing is tried a third time.
pub async fn recover_once<I, T, E, Op, OpFut, P, Rec, RecFut>(
    input: I,
    mut op: Op,
    should_recover: P,
    recover: Rec,
) -> Result<T, E>
where
    I: Clone,
    Op: FnMut(I) -> OpFut,
    OpFut: Future<Output = Result<T, E>>,
    P: FnOnce(&E) -> bool,
    Rec: FnOnce(I, E) -> RecFut,
    RecFut: Future<Output = Result<I, E>>,
{
    let first = match op(input.clone()).await {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };
    if !should_recover(&first) {
        return Err(first);
    }
    let next = recover(input, first).await?;
    op(next).await
}
