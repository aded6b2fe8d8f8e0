//! Polling scheduler for the open conversation.
//!
//! Exactly one polling timer may be active per engine instance. `start`
//! replaces any running timer; `stop` is always safe to call. Each
//! start/stop bumps a generation counter, and the tick callback is handed
//! the generation it was armed with — a caller can compare it against
//! [`Poller::generation`] to detect and discard results from a timer that
//! has since been replaced.
//!
//! The tick body is awaited inside the loop, so a slow fetch can never
//! overlap the next tick; ticks missed while a fetch is in flight are
//! skipped rather than bursted.

use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Single-timer polling scheduler with generation tracking.
#[derive(Debug)]
pub struct Poller {
    interval: Duration,
    generation: AtomicU64,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Poller {
    /// Create a disarmed poller with a fixed tick interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            generation: AtomicU64::new(0),
            handle: Mutex::new(None),
        }
    }

    /// The configured tick interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Arm the poller, replacing any running timer.
    ///
    /// The first tick fires immediately, then every `interval`. Returns the
    /// new generation; ticks receive it as their argument.
    pub fn start<F, Fut>(&self, tick: F) -> u64
    where
        F: Fn(u64) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let generation = self.bump_generation();
        let interval = self.interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                tick(generation).await;
            }
        });

        let old = self.lock_handle().replace(task);
        if let Some(old) = old {
            old.abort();
            debug!(generation, "Replaced polling timer");
        } else {
            debug!(generation, "Armed polling timer");
        }
        generation
    }

    /// Disarm the poller. Safe to call when nothing is running.
    ///
    /// The generation is bumped before the task is aborted, so any fetch
    /// already in flight fails the generation check and is discarded.
    pub fn stop(&self) -> u64 {
        let generation = self.bump_generation();
        if let Some(old) = self.lock_handle().take() {
            old.abort();
            debug!(generation, "Disarmed polling timer");
        }
        generation
    }

    /// The current generation. Ticks carrying an older generation belong to
    /// a replaced timer and their results must be discarded.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Whether a polling timer is currently armed.
    pub fn is_armed(&self) -> bool {
        self.lock_handle().as_ref().is_some_and(|h| !h.is_finished())
    }

    fn bump_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn lock_handle(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        // The guard only ever wraps handle swaps; a poisoned lock still
        // holds a usable Option.
        self.handle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        if let Some(handle) = self.lock_handle().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    fn start_counting(poller: &Poller, counter: &Arc<AtomicUsize>) -> u64 {
        let counter = Arc::clone(counter);
        poller.start(move |_generation| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_fires_immediately() {
        let poller = Poller::new(Duration::from_secs(3));
        assert_eq!(poller.interval(), Duration::from_secs(3));
        let count = Arc::new(AtomicUsize::new(0));
        start_counting(&poller, &count);

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_repeat_at_interval() {
        let poller = Poller::new(Duration::from_secs(3));
        let count = Arc::new(AtomicUsize::new(0));
        start_counting(&poller, &count);

        tokio::time::sleep(Duration::from_secs(10)).await;
        // Immediate tick plus one every 3s.
        assert_eq!(count.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_replaces_running_timer() {
        let poller = Poller::new(Duration::from_secs(3));
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let gen1 = start_counting(&poller, &first);
        tokio::time::sleep(Duration::from_millis(1)).await;

        let gen2 = start_counting(&poller, &second);
        assert!(gen2 > gen1);

        let first_before = first.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(10)).await;

        // Only the replacement keeps ticking.
        assert_eq!(first.load(Ordering::SeqCst), first_before);
        assert!(second.load(Ordering::SeqCst) >= 2);
        assert!(poller.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent() {
        let poller = Poller::new(Duration::from_secs(3));
        let count = Arc::new(AtomicUsize::new(0));
        start_counting(&poller, &count);
        tokio::time::sleep(Duration::from_millis(1)).await;

        poller.stop();
        poller.stop();
        assert!(!poller.is_armed());

        let before = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generation_moves_on_every_transition() {
        let poller = Poller::new(Duration::from_secs(3));
        assert_eq!(poller.generation(), 0);

        let g1 = poller.start(|_| async {});
        assert_eq!(g1, poller.generation());

        let g2 = poller.stop();
        assert!(g2 > g1);
        assert_eq!(g2, poller.generation());
    }
}
