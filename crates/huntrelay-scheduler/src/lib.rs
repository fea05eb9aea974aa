//! `huntrelay-scheduler` — named recurring tasks with coalescing and
//! join-on-cancel semantics.
//!
//! # Overview
//!
//! Each [`ScheduledTask`] owns one Tokio task running a tick loop. A work
//! unit never overlaps itself: the loop awaits the work future to completion
//! before looking at the timer again, and ticks that pile up while work is
//! running are dropped, not queued. Cancellation is cooperative — it is
//! observed at the tick boundary, and [`ScheduledTask::cancel`] does not
//! return until any in-flight work call has finished.
//!
//! | Guarantee        | Mechanism                                          |
//! |------------------|----------------------------------------------------|
//! | No overlap       | work awaited inline in the tick loop               |
//! | Tick coalescing  | `MissedTickBehavior::Skip`                         |
//! | One cancellation | `cancel(self)` consumes the handle                 |
//! | Join on cancel   | cancel awaits the task's `JoinHandle`              |

pub mod task;

pub use task::{ScheduledTask, TaskSet};
