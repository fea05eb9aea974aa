use thiserror::Error;

/// Errors surfaced by the notification layer.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Transport failure while posting to the delivery endpoint.
    #[error("Delivery request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The delivery endpoint rejected the message.
    #[error("Delivery endpoint returned status {status}")]
    Delivery { status: u16 },

    /// Reading or writing the watermark / subscription stores failed.
    #[error(transparent)]
    Store(#[from] huntrelay_store::StoreError),
}

pub type Result<T> = std::result::Result<T, NotifyError>;
