//! Matching a batch of rendered items against the subscription list.

use tracing::warn;

use huntrelay_store::Subscription;

use crate::message::MessageAttachment;
use crate::poster::ChannelPoster;

/// One rendered item inside a batch: the report it concerns (when known),
/// its text line and its attachment card.
#[derive(Debug, Clone, Default)]
pub struct OutboundItem {
    pub report_id: Option<String>,
    pub text: String,
    pub attachment: Option<MessageAttachment>,
}

/// A batch handed to the fan-out engine by a poll cycle.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    /// Prepended to every delivery (the deadline cycle's title + description).
    pub header: Option<String>,
    /// Set by the single-event activity cycle: scoped subscriptions only
    /// match when their scope equals this key as well as an item id.
    pub match_key: Option<String>,
    pub items: Vec<OutboundItem>,
}

impl Batch {
    /// The first item a scoped subscription should receive, if any.
    fn item_for_scope(&self, scope: &str) -> Option<&OutboundItem> {
        if let Some(ref key) = self.match_key {
            if key != scope {
                return None;
            }
        }
        self.items
            .iter()
            .find(|item| item.report_id.as_deref() == Some(scope))
    }
}

/// Deliver `batch` to every matching subscription, one post per match.
///
/// * Empty batches deliver to nobody, unscoped subscriptions included.
/// * A scoped subscription gets only its own item; no item, no delivery.
/// * An unscoped subscription gets the whole batch as one message with one
///   attachment per item.
/// * Per-subscription delivery failures are logged and skipped; they never
///   abort the remaining deliveries. Subscriptions sharing a channel each
///   get their own post — dedup is the subscribe-time invariant's job.
///
/// Returns the number of successful deliveries.
pub async fn fan_out(
    batch: &Batch,
    subscriptions: &[Subscription],
    poster: &dyn ChannelPoster,
) -> usize {
    if batch.items.is_empty() {
        return 0;
    }

    let header = batch.header.as_deref().unwrap_or("");
    let mut delivered = 0;

    for sub in subscriptions {
        let (text, attachments) = match sub.report_id.as_deref() {
            Some(scope) => match batch.item_for_scope(scope) {
                Some(item) => (
                    format!("{header}{}", item.text),
                    item.attachment.iter().cloned().collect::<Vec<_>>(),
                ),
                None => continue,
            },
            None => {
                let mut text = String::from(header);
                for item in &batch.items {
                    text.push_str(&item.text);
                }
                let attachments = batch
                    .items
                    .iter()
                    .filter_map(|item| item.attachment.clone())
                    .collect();
                (text, attachments)
            }
        };

        match poster.post(&sub.channel_id, &text, &attachments).await {
            Ok(()) => delivered += 1,
            Err(e) => {
                warn!(
                    channel_id = %sub.channel_id,
                    sub_id = %sub.id,
                    error = %e,
                    "notification delivery failed"
                );
            }
        }
    }
    delivered
}
