//! `huntrelay-notify` — rendering, fan-out and the two poll cycles.
//!
//! The [`poll::Poller`] owns both recurring work units:
//!
//! * `poll_activities` — incremental activity feed behind a persisted
//!   watermark; cold starts swallow history instead of replaying it.
//! * `poll_deadlines` — three SLA filter windows, each fanned out as an
//!   unscoped report batch.
//!
//! Both delegate delivery to [`fanout::fan_out`], which matches a batch
//! against the subscription list and issues one [`poster::ChannelPoster`]
//! call per matching subscription.

pub mod error;
pub mod fanout;
pub mod message;
pub mod poll;
pub mod poster;

pub use error::{NotifyError, Result};
pub use fanout::{fan_out, Batch, OutboundItem};
pub use message::{MessageAttachment, NoMapping, UsernameMapper};
pub use poll::Poller;
pub use poster::{ChannelPoster, WebhookPoster};
