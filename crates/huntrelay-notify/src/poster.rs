use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::error::{NotifyError, Result};
use crate::message::MessageAttachment;

/// Delivery seam: one call posts one message to one channel.
#[async_trait]
pub trait ChannelPoster: Send + Sync {
    async fn post(
        &self,
        channel_id: &str,
        text: &str,
        attachments: &[MessageAttachment],
    ) -> Result<()>;
}

/// Posts through a chat system's incoming-webhook endpoint. The channel id
/// travels in the payload, so a single URL serves every subscription.
pub struct WebhookPoster {
    http: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    channel: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    attachments: &'a [MessageAttachment],
}

impl WebhookPoster {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl ChannelPoster for WebhookPoster {
    async fn post(
        &self,
        channel_id: &str,
        text: &str,
        attachments: &[MessageAttachment],
    ) -> Result<()> {
        debug!(channel_id, attachments = attachments.len(), "posting notification");
        let response = self
            .http
            .post(&self.url)
            .json(&WebhookPayload {
                channel: channel_id,
                text,
                attachments,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Delivery {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
