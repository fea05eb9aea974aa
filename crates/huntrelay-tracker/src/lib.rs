//! `huntrelay-tracker` — the bug-bounty tracker API client.
//!
//! [`TrackerApi`] is the seam the poll cycles are written against; the
//! [`HackerOneClient`] implementation speaks the HackerOne v1 REST API
//! (basic auth, JSON:API payloads). [`ReportFilters`] renders the typed
//! filter set into `filter[...]` query pairs, and [`DeadlineCategory`]
//! derives the three SLA windows from "now minus N days".

pub mod client;
pub mod error;
pub mod filters;

pub use client::{HackerOneClient, TrackerApi};
pub use error::{Result, TrackerError};
pub use filters::{DeadlineCategory, ReportFilters};
