//! Cancellable periodic callback.
//!
//! A [`Ticker`] owns the tokio task that drives it. Dropping or cancelling
//! the ticker aborts the task, so a callback can never fire after its
//! owner has gone away.

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::error::{Result, ValidationError};

pub struct Ticker {
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Run `callback` every `period` until it returns `Break`.
    ///
    /// The first call happens one full period after spawning. Must be
    /// called from within a tokio runtime.
    ///
    /// # Errors
    /// Returns a validation error for a zero `period`.
    pub fn spawn<F, Fut>(period: Duration, mut callback: F) -> Result<Self>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send,
    {
        if period.is_zero() {
            return Err(ValidationError::NonPositive { field: "period" }.into());
        }
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if callback().await.is_break() {
                    break;
                }
            }
        });
        tracing::debug!(?period, "ticker spawned");
        Ok(Self {
            handle: Some(handle),
        })
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the ticker. Safe to call more than once.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!("ticker cancelled");
        }
    }

    /// Wait until the callback breaks the loop.
    ///
    /// Dropping the returned future drops the ticker too, so racing it in
    /// `select!` still aborts the task when the other branch wins. A panic
    /// inside the callback is resumed on the awaiting task.
    pub async fn finished(mut self) {
        if let Some(handle) = self.handle.as_mut() {
            if let Err(e) = handle.await {
                self.handle = None;
                if e.is_panic() {
                    std::panic::resume_unwind(e.into_panic());
                }
                tracing::debug!(error = %e, "ticker task ended early");
            }
        }
        self.handle = None;
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn stops_when_callback_breaks() {
        let count = Arc::new(AtomicU32::new(0));
        let seen = count.clone();
        let ticker = Ticker::spawn(Duration::from_secs(1), move || {
            let seen = seen.clone();
            async move {
                if seen.fetch_add(1, Ordering::SeqCst) + 1 >= 3 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            }
        })
        .unwrap();
        ticker.finished().await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_cancels_pending_callbacks() {
        let count = Arc::new(AtomicU32::new(0));
        let seen = count.clone();
        let ticker = Ticker::spawn(Duration::from_secs(1), move || {
            let seen = seen.clone();
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                ControlFlow::Continue(())
            }
        })
        .unwrap();
        time::sleep(Duration::from_millis(2500)).await;
        drop(ticker);
        let fired = count.load(Ordering::SeqCst);
        assert!(fired >= 1);

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), fired);
    }

    #[tokio::test(start_paused = true)]
    async fn abandoning_finished_aborts_the_task() {
        let count = Arc::new(AtomicU32::new(0));
        let seen = count.clone();
        let ticker = Ticker::spawn(Duration::from_secs(1), move || {
            let seen = seen.clone();
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                ControlFlow::Continue(())
            }
        })
        .unwrap();

        tokio::select! {
            _ = ticker.finished() => panic!("ticker never breaks"),
            _ = time::sleep(Duration::from_millis(1500)) => {}
        }
        let fired = count.load(Ordering::SeqCst);
        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), fired);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_is_idempotent() {
        let mut ticker =
            Ticker::spawn(Duration::from_secs(5), || async { ControlFlow::Continue(()) }).unwrap();
        assert!(ticker.is_active());
        ticker.cancel();
        ticker.cancel();
        assert!(!ticker.is_active());
    }

    #[tokio::test]
    async fn zero_period_is_rejected() {
        let result = Ticker::spawn(Duration::ZERO, || async { ControlFlow::Break(()) });
        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    #[should_panic(expected = "tick callback failed")]
    async fn finished_resumes_a_callback_panic() {
        let ticker = Ticker::spawn(Duration::from_secs(1), || async {
            None::<ControlFlow<()>>.expect("tick callback failed")
        })
        .unwrap();
        ticker.finished().await;
    }
}
