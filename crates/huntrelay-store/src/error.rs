use thiserror::Error;

/// Errors that can occur within the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite / rusqlite error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The subscriptions key holds bytes that do not decode as JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A watermark write was attempted with a non-RFC3339 value, or the
    /// stored value is not valid UTF-8. The stored value is never mutated
    /// on this error.
    #[error("Invalid watermark value: {0}")]
    InvalidWatermark(String),

    /// The channel already holds a subscription with the identical scope.
    #[error("Channel {channel_id} is already subscribed to this scope")]
    AlreadySubscribed { channel_id: String },

    /// No subscription with the given id exists.
    #[error("Subscription not found: {id}")]
    SubscriptionNotFound { id: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;
