use thiserror::Error;

/// Errors from the tracker API client. All of them are transient from the
/// poll cycles' point of view: the cycle logs, leaves state untouched and
/// lets the next tick retry.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Connection, timeout or body-decode failure from reqwest.
    #[error("Tracker request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The tracker answered with a non-success status.
    #[error("Tracker returned status {status} for {url}")]
    Status { status: u16, url: String },
}

pub type Result<T> = std::result::Result<T, TrackerError>;
