//! Per-attempt abort signal: an internal deadline combined with the caller's
//! optional cancellation token.

use std::{future::Future, pin::Pin, time::Duration};

use tokio::time::{sleep, Sleep};
use tokio_util::sync::CancellationToken;

/// Which half of an [`AbortSignal`] fired.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum AbortReason {
    /// The per-attempt deadline elapsed.
    Deadline,
    /// The caller's token was cancelled.
    Cancelled,
}

/// Fires on whichever comes first: the attempt deadline or the caller's token.
///
/// Owns the deadline timer; dropping the signal releases the timer and the
/// token waiter on both the success and the failure path.
pub(crate) struct AbortSignal {
    deadline: Pin<Box<Sleep>>,
    caller: Option<CancellationToken>,
}

impl AbortSignal {
    pub(crate) fn new(timeout: Duration, caller: Option<&CancellationToken>) -> Self {
        Self {
            deadline: Box::pin(sleep(timeout)),
            caller: caller.cloned(),
        }
    }

    /// Reports which signal has fired, if any. Caller cancellation wins when
    /// both have fired.
    pub(crate) fn reason(&self) -> Option<AbortReason> {
        if self.caller.as_ref().is_some_and(|token| token.is_cancelled()) {
            Some(AbortReason::Cancelled)
        } else if self.deadline.is_elapsed() {
            Some(AbortReason::Deadline)
        } else {
            None
        }
    }

    /// Resolves once either signal fires.
    pub(crate) async fn fired(&mut self) -> AbortReason {
        let caller = self.caller.clone();
        let cancelled = async move {
            match caller {
                Some(token) => token.cancelled_owned().await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            () = cancelled => AbortReason::Cancelled,
            () = &mut self.deadline => self.reason().unwrap_or(AbortReason::Deadline),
        }
    }

    /// Drives `fut` until it completes or the signal fires. On abort `fut` is
    /// dropped, which cancels the in-flight attempt.
    pub(crate) async fn guard<F: Future>(&mut self, fut: F) -> Result<F::Output, AbortReason> {
        tokio::select! {
            biased;
            reason = self.fired() => Err(reason),
            output = fut => Ok(output),
        }
    }
}

/// Sleeps for `delay` unless the caller's token fires first.
pub(crate) async fn pause(
    delay: Duration,
    caller: Option<&CancellationToken>,
) -> Result<(), AbortReason> {
    match caller {
        Some(token) => tokio::select! {
            biased;
            () = token.cancelled() => Err(AbortReason::Cancelled),
            () = sleep(delay) => Ok(()),
        },
        None => {
            sleep(delay).await;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    #[tokio::test]
    async fn completes_before_either_signal() {
        let token = CancellationToken::new();
        let mut signal = AbortSignal::new(Duration::from_secs(5), Some(&token));

        let out = signal.guard(async { 7 }).await;
        assert_eq!(out, Ok(7));
        assert_eq!(signal.reason(), None);
    }

    #[tokio::test]
    async fn deadline_fires_without_caller_token() {
        let mut signal = AbortSignal::new(Duration::from_millis(20), None);
        let started = Instant::now();

        let out = signal.guard(sleep(Duration::from_secs(5))).await;
        assert_eq!(out, Err(AbortReason::Deadline));
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(signal.reason(), Some(AbortReason::Deadline));
    }

    #[tokio::test]
    async fn caller_token_is_distinguished_from_deadline() {
        let token = CancellationToken::new();
        let mut signal = AbortSignal::new(Duration::from_secs(5), Some(&token));
        let trigger = token.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let out = signal.guard(sleep(Duration::from_secs(5))).await;
        assert_eq!(out, Err(AbortReason::Cancelled));
    }

    #[tokio::test]
    async fn already_cancelled_token_aborts_immediately() {
        let token = CancellationToken::new();
        token.cancel();
        let mut signal = AbortSignal::new(Duration::from_secs(5), Some(&token));

        assert_eq!(signal.guard(async { 1 }).await, Err(AbortReason::Cancelled));
    }

    #[tokio::test]
    async fn pause_is_interrupted_by_caller() {
        let token = CancellationToken::new();
        token.cancel();
        assert_eq!(
            pause(Duration::from_secs(5), Some(&token)).await,
            Err(AbortReason::Cancelled)
        );
        assert_eq!(pause(Duration::from_millis(1), None).await, Ok(()));
    }
}
