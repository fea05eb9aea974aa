//! `huntrelay-store` — persistent state for the poll cycles.
//!
//! Two small stores sit on top of a byte-oriented [`KvStore`]:
//!
//! | Store               | Key               | Value                          |
//! |---------------------|-------------------|--------------------------------|
//! | [`WatermarkStore`]  | `activities-last` | RFC3339 timestamp text         |
//! | [`SubscriptionStore`]| `subscriptions`  | JSON array of subscriptions    |
//!
//! The default [`SqliteKv`] backend keeps both under a single SQLite table
//! guarded by a connection mutex, so the two poll tasks and the subscribe /
//! unsubscribe paths can hit the stores concurrently.

pub mod error;
pub mod kv;
pub mod subscriptions;
pub mod watermark;

pub use error::{Result, StoreError};
pub use kv::{init_db, KvStore, SqliteKv};
pub use subscriptions::{Subscription, SubscriptionStore};
pub use watermark::{WatermarkStore, WATERMARK_SENTINEL};
