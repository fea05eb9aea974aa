//! The two recurring work units driven by the scheduler.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use huntrelay_core::config::{SlaConfig, ACTIVITY_PAGE_SIZE};
use huntrelay_store::{SubscriptionStore, WatermarkStore, WATERMARK_SENTINEL};
use huntrelay_tracker::{DeadlineCategory, TrackerApi};

use crate::error::Result;
use crate::fanout::{fan_out, Batch, OutboundItem};
use crate::message::{self, UsernameMapper};
use crate::poster::ChannelPoster;

/// Owns one poll's worth of collaborators. Shared by both recurring tasks;
/// the only mutable state behind it is the two stores, which serialize
/// internally, so concurrent activity and deadline cycles are safe.
pub struct Poller {
    tracker: Arc<dyn TrackerApi>,
    poster: Arc<dyn ChannelPoster>,
    watermark: WatermarkStore,
    subscriptions: SubscriptionStore,
    mapper: Arc<dyn UsernameMapper>,
    sla: SlaConfig,
}

impl Poller {
    pub fn new(
        tracker: Arc<dyn TrackerApi>,
        poster: Arc<dyn ChannelPoster>,
        watermark: WatermarkStore,
        subscriptions: SubscriptionStore,
        mapper: Arc<dyn UsernameMapper>,
        sla: SlaConfig,
    ) -> Self {
        Self {
            tracker,
            poster,
            watermark,
            subscriptions,
            mapper,
            sla,
        }
    }

    /// One activity poll cycle: fetch everything newer than the watermark,
    /// fan each activity out, then advance the watermark.
    ///
    /// Transient fetch failures are logged and swallowed — the watermark is
    /// untouched, so the next tick retries the same window. The first poll
    /// ever (sentinel watermark) records the watermark without notifying
    /// anyone, otherwise the whole feed history would be replayed.
    pub async fn poll_activities(&self) -> Result<()> {
        let subs = self.subscriptions.all()?;
        if subs.is_empty() {
            return Ok(());
        }

        let watermark = self.watermark.last()?;
        let cold_start = watermark == WATERMARK_SENTINEL;

        let page = match self
            .tracker
            .fetch_activities(ACTIVITY_PAGE_SIZE, Some(&watermark))
            .await
        {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, "activity fetch failed; retrying next tick");
                return Ok(());
            }
        };

        if page.activities.is_empty() {
            return Ok(());
        }

        if cold_start {
            info!(
                skipped = page.activities.len(),
                new_watermark = %page.max_updated_at,
                "first activity poll; recording watermark without notifying"
            );
            self.persist_watermark(&page.max_updated_at);
            return Ok(());
        }

        for activity in &page.activities {
            let report_id = activity.attributes.report_id.clone();
            // Best effort: an activity is still worth announcing when its
            // report lookup fails, just without the card.
            let attachment = match self.tracker.fetch_report(&report_id).await {
                Ok(report) => Some(message::report_attachment(&report, false)),
                Err(e) => {
                    warn!(report_id = %report_id, error = %e, "report lookup failed; notifying without attachment");
                    None
                }
            };

            let batch = Batch {
                header: None,
                match_key: Some(report_id.clone()),
                items: vec![OutboundItem {
                    report_id: Some(report_id),
                    text: message::activity_line(activity, self.mapper.as_ref()),
                    attachment,
                }],
            };
            let delivered = fan_out(&batch, &subs, self.poster.as_ref()).await;
            info!(kind = %activity.kind, delivered, "activity fanned out");
        }

        self.persist_watermark(&page.max_updated_at);
        Ok(())
    }

    /// One SLA deadline cycle: three filter windows, each fanned out as an
    /// unscoped batch. A failing category never blocks the others.
    pub async fn poll_deadlines(&self) -> Result<()> {
        let subs = self.subscriptions.all()?;
        if subs.is_empty() {
            return Ok(());
        }

        let now = Utc::now();
        for category in DeadlineCategory::ALL {
            let days = category.sla_days(&self.sla);
            let filters = category.filters(days, now);

            let reports = match self.tracker.fetch_reports(&filters).await {
                Ok(reports) => reports,
                Err(e) => {
                    warn!(?category, error = %e, "deadline fetch failed; retrying next tick");
                    continue;
                }
            };
            if reports.is_empty() {
                continue;
            }

            let batch = Batch {
                header: Some(format!(
                    "#### {}\n{}\n\n",
                    category.title(),
                    category.description(days)
                )),
                match_key: None,
                items: reports
                    .iter()
                    .map(|report| OutboundItem {
                        report_id: Some(report.id.clone()),
                        text: String::new(),
                        attachment: Some(message::report_attachment(report, false)),
                    })
                    .collect(),
            };
            let delivered = fan_out(&batch, &subs, self.poster.as_ref()).await;
            info!(?category, overdue = reports.len(), delivered, "deadline batch fanned out");
        }
        Ok(())
    }

    /// Watermark writes are log-only: a lost write widens the next fetch
    /// window, which downstream fan-out tolerates as a possible duplicate.
    fn persist_watermark(&self, value: &str) {
        if value.is_empty() {
            return;
        }
        if let Err(e) = self.watermark.store(value) {
            warn!(error = %e, "failed to persist watermark; next cycle will refetch an overlapping window");
        }
    }
}
