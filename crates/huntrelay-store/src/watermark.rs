use std::sync::Arc;

use chrono::DateTime;

use crate::error::{Result, StoreError};
use crate::kv::KvStore;

/// KV key holding the activity watermark.
const WATERMARK_KEY: &str = "activities-last";

/// Sentinel returned when no poll has ever completed. Detecting this value
/// is how the activity cycle recognises a cold start.
pub const WATERMARK_SENTINEL: &str = "1970-01-01T00:00:00Z";

/// Persists the `updated_at` of the newest processed activity, the lower
/// bound for the next incremental fetch.
#[derive(Clone)]
pub struct WatermarkStore {
    kv: Arc<dyn KvStore>,
}

impl WatermarkStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// The stored watermark, or [`WATERMARK_SENTINEL`] when never written.
    pub fn last(&self) -> Result<String> {
        match self.kv.get(WATERMARK_KEY)? {
            None => Ok(WATERMARK_SENTINEL.to_string()),
            Some(bytes) => String::from_utf8(bytes)
                .map_err(|e| StoreError::InvalidWatermark(e.to_string())),
        }
    }

    /// Persist a new watermark. The value is validated as RFC3339 *before*
    /// the write; a bad value fails without touching the stored one.
    pub fn store(&self, value: &str) -> Result<()> {
        DateTime::parse_from_rfc3339(value).map_err(|e| {
            StoreError::InvalidWatermark(format!(
                "{value:?} is not RFC3339 (expected e.g. 2017-02-02T04:05:06Z): {e}"
            ))
        })?;
        self.kv.set(WATERMARK_KEY, value.as_bytes())
    }
}
