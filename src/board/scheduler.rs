//! Periodic background refresh.
//!
//! The scheduler owns at most one armed timer task. Arming captures an
//! immutable [`FilterSnapshot`]; the task then sleeps for the interval, runs
//! the refresh callback with that snapshot, waits for it to finish and sleeps
//! again. Re-arming or disarming aborts the previous task, so two cadences
//! never run side by side.

use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::filters::FilterSnapshot;

/// Callback run on every tick with the snapshot captured at arm time.
pub type RefreshFn = Arc<dyn Fn(FilterSnapshot) -> BoxFuture<'static, ()> + Send + Sync>;

struct ArmedTimer {
    snapshot: FilterSnapshot,
    handle: JoinHandle<()>,
}

pub struct RefreshScheduler {
    interval: Duration,
    on_tick: RefreshFn,
    armed: Option<ArmedTimer>,
    arm_count: u64,
}

impl std::fmt::Debug for RefreshScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshScheduler")
            .field("interval", &self.interval)
            .field("armed", &self.is_armed())
            .field("arm_count", &self.arm_count)
            .finish()
    }
}

impl RefreshScheduler {
    /// A zero `interval` disables periodic refresh: arming becomes a no-op.
    pub fn new(interval: Duration, on_tick: RefreshFn) -> Self {
        Self {
            interval,
            on_tick,
            armed: None,
            arm_count: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_enabled(&self) -> bool {
        !self.interval.is_zero()
    }

    /// Cancels any armed timer and arms a new one for `snapshot`.
    ///
    /// Returns false when periodic refresh is disabled. Must be called from
    /// within a tokio runtime.
    pub fn arm(&mut self, snapshot: FilterSnapshot) -> bool {
        self.disarm();
        if !self.is_enabled() {
            debug!("Periodic refresh disabled, not arming");
            return false;
        }

        let interval = self.interval;
        let on_tick = Arc::clone(&self.on_tick);
        let tick_snapshot = snapshot.clone();
        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                debug!(
                    "Refresh timer fired for generation {}",
                    tick_snapshot.generation()
                );
                on_tick(tick_snapshot.clone()).await;
            }
        });

        self.arm_count += 1;
        info!(
            "Armed refresh every {:?} for {} (generation {})",
            interval,
            snapshot.competitions.join(","),
            snapshot.generation()
        );
        self.armed = Some(ArmedTimer { snapshot, handle });
        true
    }

    /// Cancels the armed timer, if any. Returns whether one was armed.
    pub fn disarm(&mut self) -> bool {
        match self.armed.take() {
            Some(timer) => {
                timer.handle.abort();
                debug!("Disarmed refresh timer");
                true
            }
            None => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
            .as_ref()
            .is_some_and(|timer| !timer.handle.is_finished())
    }

    /// Snapshot the armed timer refreshes with.
    pub fn armed_snapshot(&self) -> Option<FilterSnapshot> {
        self.armed.as_ref().map(|timer| timer.snapshot.clone())
    }

    /// Total number of successful `arm` calls.
    pub fn arm_count(&self) -> u64 {
        self.arm_count
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.disarm();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::filters::FilterSet;
    use futures::FutureExt;
    use std::sync::Mutex;

    fn filters(code: &str) -> FilterSet {
        FilterSet::new(&[code], None, 7, 7, &["bl1".to_string()])
    }

    fn recording_scheduler(interval: Duration) -> (RefreshScheduler, Arc<Mutex<Vec<(String, u64)>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let on_tick: RefreshFn = Arc::new(move |snapshot: FilterSnapshot| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock()
                    .unwrap()
                    .push((snapshot.competitions.join(","), snapshot.generation()));
            }
            .boxed()
        });
        (RefreshScheduler::new(interval, on_tick), seen)
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_repeat_at_interval() {
        let (mut scheduler, seen) = recording_scheduler(Duration::from_secs(30));
        assert!(scheduler.arm(filters("bl1").snapshot(1)));

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert!(seen.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_secs(62)).await;
        assert_eq!(seen.lock().unwrap().len(), 3);
        assert!(scheduler.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_replaces_previous_timer() {
        let (mut scheduler, seen) = recording_scheduler(Duration::from_secs(30));
        scheduler.arm(filters("bl1").snapshot(1));
        tokio::time::sleep(Duration::from_secs(10)).await;
        scheduler.arm(filters("bl2").snapshot(2));

        tokio::time::sleep(Duration::from_secs(35)).await;
        let ticks = seen.lock().unwrap().clone();
        assert_eq!(ticks, vec![("bl2".to_string(), 2)]);
        assert_eq!(scheduler.arm_count(), 2);
        assert_eq!(scheduler.armed_snapshot().map(|s| s.generation()), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_never_arms() {
        let (mut scheduler, seen) = recording_scheduler(Duration::ZERO);
        assert!(!scheduler.arm(filters("bl1").snapshot(1)));
        assert!(!scheduler.is_armed());

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(scheduler.arm_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_refresh_does_not_overlap() {
        let running = Arc::new(Mutex::new((0u32, 0u32)));
        let state = Arc::clone(&running);
        let on_tick: RefreshFn = Arc::new(move |_snapshot| {
            let state = Arc::clone(&state);
            async move {
                {
                    let mut s = state.lock().unwrap();
                    s.0 += 1;
                    s.1 = s.1.max(s.0);
                }
                tokio::time::sleep(Duration::from_secs(45)).await;
                state.lock().unwrap().0 -= 1;
            }
            .boxed()
        });
        let mut scheduler = RefreshScheduler::new(Duration::from_secs(10), on_tick);
        scheduler.arm(filters("bl1").snapshot(1));

        tokio::time::sleep(Duration::from_secs(200)).await;
        let (_, max_concurrent) = *running.lock().unwrap();
        assert_eq!(max_concurrent, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_disarms() {
        let (mut scheduler, seen) = recording_scheduler(Duration::from_secs(5));
        scheduler.arm(filters("bl1").snapshot(1));
        drop(scheduler);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_stops_ticks() {
        let (mut scheduler, seen) = recording_scheduler(Duration::from_secs(5));
        scheduler.arm(filters("bl1").snapshot(1));
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(scheduler.disarm());
        assert!(!scheduler.disarm());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert!(!scheduler.is_armed());
    }
}
