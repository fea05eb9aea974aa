use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

/// A named recurring (or one-shot) unit of work on its own Tokio task.
///
/// The first firing happens one full `interval` after spawn, matching
/// ticker semantics. `work` failures are the work unit's own business:
/// the loop does not supervise, it just keeps ticking.
pub struct ScheduledTask {
    name: String,
    interval: Duration,
    recurring: bool,
    cancel_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Start the task. `interval` must be non-zero.
    ///
    /// Dropping the returned handle without calling [`cancel`](Self::cancel)
    /// also stops the loop at the next tick boundary, but without joining
    /// the in-flight work call.
    pub fn spawn<F, Fut>(
        name: impl Into<String>,
        interval: Duration,
        recurring: bool,
        work: F,
    ) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();

        let loop_name = name.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            // Ticks that elapse while work is running are dropped, not queued.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            debug!(task = %loop_name, ?interval, recurring, "task started");
            loop {
                tokio::select! {
                    // Cancellation wins over a simultaneously-ready tick, so
                    // no new work starts once cancel has been requested.
                    biased;
                    _ = &mut cancel_rx => {
                        debug!(task = %loop_name, "task cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        work().await;
                        if !recurring {
                            debug!(task = %loop_name, "one-shot task done");
                            break;
                        }
                    }
                }
            }
        });

        Self {
            name,
            interval,
            recurring,
            cancel_tx,
            handle,
        }
    }

    /// Request cancellation and wait for the task to exit.
    ///
    /// Blocks for as long as the currently running work call takes — there
    /// is no internal timeout. Consuming `self` makes a second cancellation
    /// unrepresentable.
    pub async fn cancel(self) {
        // Send fails only if the loop already exited (one-shot task done);
        // the join below still completes immediately in that case.
        let _ = self.cancel_tx.send(());
        let _ = self.handle.await;
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ScheduledTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (interval {:?}, recurring {})",
            self.name, self.interval, self.recurring
        )
    }
}

/// The set of tasks owned by one daemon instance. Cancelled as a unit when
/// configuration changes or on shutdown.
#[derive(Default)]
pub struct TaskSet {
    tasks: Vec<ScheduledTask>,
}

impl TaskSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, task: ScheduledTask) {
        self.tasks.push(task);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Cancel every task, joining each in turn.
    pub async fn cancel_all(&mut self) {
        for task in self.tasks.drain(..) {
            debug!(task = %task.name(), "cancelling");
            task.cancel().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn recurring_task_fires_repeatedly() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let task = ScheduledTask::spawn("ticker", Duration::from_millis(20), true, move || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(130)).await;
        task.cancel().await;
        assert!(count.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test]
    async fn non_recurring_task_fires_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let task = ScheduledTask::spawn("once", Duration::from_millis(10), false, move || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        // Cancelling an already-finished task returns immediately.
        task.cancel().await;
    }

    #[tokio::test]
    async fn slow_work_never_overlaps_itself() {
        let in_flight = Arc::new(AtomicBool::new(false));
        let overlapped = Arc::new(AtomicBool::new(false));
        let count = Arc::new(AtomicUsize::new(0));

        let (f, o, c) = (
            Arc::clone(&in_flight),
            Arc::clone(&overlapped),
            Arc::clone(&count),
        );
        // Work takes several intervals; lagging ticks must be dropped.
        let task = ScheduledTask::spawn("slow", Duration::from_millis(10), true, move || {
            let (f, o, c) = (Arc::clone(&f), Arc::clone(&o), Arc::clone(&c));
            async move {
                if f.swap(true, Ordering::SeqCst) {
                    o.store(true, Ordering::SeqCst);
                }
                tokio::time::sleep(Duration::from_millis(40)).await;
                c.fetch_add(1, Ordering::SeqCst);
                f.store(false, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(250)).await;
        task.cancel().await;

        assert!(!overlapped.load(Ordering::SeqCst), "work overlapped itself");
        let fired = count.load(Ordering::SeqCst);
        // ~25 raw ticks in the window; coalescing caps firings near 250/50.
        assert!(fired >= 2, "fired {fired} times");
        assert!(fired <= 10, "ticks were queued, not coalesced: {fired}");
    }

    #[tokio::test]
    async fn cancel_joins_in_flight_work() {
        let count = Arc::new(AtomicUsize::new(0));
        let in_flight = Arc::new(AtomicBool::new(false));

        let (c, f) = (Arc::clone(&count), Arc::clone(&in_flight));
        let task = ScheduledTask::spawn("busy", Duration::from_millis(10), true, move || {
            let (c, f) = (Arc::clone(&c), Arc::clone(&f));
            async move {
                f.store(true, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(100)).await;
                c.fetch_add(1, Ordering::SeqCst);
                f.store(false, Ordering::SeqCst);
            }
        });

        // Let the first work call get going, then cancel mid-flight.
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(in_flight.load(Ordering::SeqCst));
        task.cancel().await;

        // cancel returned only after the work call completed…
        assert!(!in_flight.load(Ordering::SeqCst));
        let after_cancel = count.load(Ordering::SeqCst);
        assert_eq!(after_cancel, 1);

        // …and nothing fires afterwards.
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(count.load(Ordering::SeqCst), after_cancel);
    }

    #[tokio::test]
    async fn task_reports_its_identity() {
        let task = ScheduledTask::spawn("poller", Duration::from_secs(5), true, || async {});
        assert_eq!(task.name(), "poller");
        assert_eq!(task.to_string(), "poller (interval 5s, recurring true)");
        task.cancel().await;
    }

    #[tokio::test]
    async fn task_set_cancels_everything() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut set = TaskSet::new();
        for name in ["a", "b"] {
            let c = Arc::clone(&count);
            set.add(ScheduledTask::spawn(
                name,
                Duration::from_millis(15),
                true,
                move || {
                    let c = Arc::clone(&c);
                    async move {
                        c.fetch_add(1, Ordering::SeqCst);
                    }
                },
            ));
        }
        assert_eq!(set.len(), 2);

        tokio::time::sleep(Duration::from_millis(50)).await;
        set.cancel_all().await;
        assert!(set.is_empty());

        let frozen = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), frozen);
    }
}
