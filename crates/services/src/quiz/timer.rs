use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::trace;

/// Single-shot cancellable timer.
///
/// Each `schedule` cancels whatever was pending and bumps the generation.
/// The callback receives the generation it was armed with so the receiver can
/// discard an expiry that raced with a later cancel. Dropping the timer
/// cancels it.
#[derive(Debug, Default)]
pub struct StepTimer {
    handle: Option<JoinHandle<()>>,
    generation: u64,
}

impl StepTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation of the most recent `schedule` or `cancel`.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Run `on_expire` after `delay`, replacing any pending expiry.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F, Fut>(&mut self, delay: Duration, on_expire: F) -> u64
    where
        F: FnOnce(u64) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let generation = self.generation;
        trace!(generation, delay_ms = delay.as_millis(), "timer armed");
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_expire(generation).await;
        }));
        generation
    }

    /// Abort the pending expiry, if any, and invalidate its generation.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.generation = self.generation.wrapping_add(1);
    }

    /// Forget the handle of an expiry that is currently running.
    ///
    /// Called from inside the callback so a follow-up `schedule` does not
    /// abort the task that is calling it.
    pub fn release(&mut self) {
        self.handle = None;
    }
}

impl Drop for StepTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_delay() {
        let fired = Arc::new(AtomicU64::new(0));
        let mut timer = StepTimer::new();
        let seen = Arc::clone(&fired);
        let generation = timer.schedule(Duration::from_millis(300), move |g| async move {
            seen.store(g + 1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(299)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), generation + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reschedule_cancels_previous() {
        let fired = Arc::new(AtomicU64::new(0));
        let mut timer = StepTimer::new();

        let first = Arc::clone(&fired);
        let stale = timer.schedule(Duration::from_millis(100), move |_| async move {
            first.fetch_add(100, Ordering::SeqCst);
        });
        let second = Arc::clone(&fired);
        let current = timer.schedule(Duration::from_millis(200), move |_| async move {
            second.fetch_add(1, Ordering::SeqCst);
        });
        assert_ne!(stale, current);
        assert_eq!(timer.generation(), current);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_pending_expiry() {
        let fired = Arc::new(AtomicU64::new(0));
        {
            let mut timer = StepTimer::new();
            let seen = Arc::clone(&fired);
            timer.schedule(Duration::from_millis(50), move |_| async move {
                seen.fetch_add(1, Ordering::SeqCst);
            });
            assert!(timer.is_pending());
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
