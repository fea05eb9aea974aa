//! `huntrelay-core` — shared configuration and wire types.
//!
//! Everything the other crates agree on lives here: the TOML + env
//! configuration layer and the tracker API wire types (`Activity`,
//! `Report`). No I/O happens in this crate.

pub mod config;
pub mod error;
pub mod types;

pub use config::HuntrelayConfig;
pub use error::{CoreError, Result};
pub use types::{Activity, ActivityPage, Actor, Report};
