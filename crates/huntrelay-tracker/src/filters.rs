use chrono::{DateTime, Duration, SecondsFormat, Utc};
use huntrelay_core::config::SlaConfig;

/// Typed report filter set, rendered to the tracker's `filter[...]` query
/// parameters. `state` is an array-valued parameter upstream; the
/// `*_null` flags filter on presence/absence of the named timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilters {
    pub state: Option<String>,
    pub created_before: Option<DateTime<Utc>>,
    pub triaged_null: Option<bool>,
    pub bounty_awarded_null: Option<bool>,
    pub closed_null: Option<bool>,
    pub disclosed_null: Option<bool>,
    pub reporter_agreed_public: Option<bool>,
}

impl ReportFilters {
    pub fn state(state: impl Into<String>) -> Self {
        Self {
            state: Some(state.into()),
            ..Self::default()
        }
    }

    /// Query pairs in a stable order, ready for reqwest's `.query()`.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(ref state) = self.state {
            pairs.push(("filter[state][]".to_string(), state.clone()));
        }
        if let Some(created_before) = self.created_before {
            pairs.push((
                "filter[created_at__lt]".to_string(),
                created_before.to_rfc3339_opts(SecondsFormat::Secs, true),
            ));
        }
        for (name, flag) in [
            ("triaged_at__null", self.triaged_null),
            ("bounty_awarded_at__null", self.bounty_awarded_null),
            ("closed_at__null", self.closed_null),
            ("disclosed_at__null", self.disclosed_null),
        ] {
            if let Some(value) = flag {
                pairs.push((format!("filter[{name}]"), value.to_string()));
            }
        }
        if let Some(value) = self.reporter_agreed_public {
            pairs.push((
                "filter[reporter_agreed_on_going_public]".to_string(),
                value.to_string(),
            ));
        }
        pairs
    }
}

/// The three SLA deadline categories. Each renders its own overdue-report
/// filter window from "now minus the configured day threshold".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineCategory {
    /// `new` reports nobody has triaged yet.
    NewReports,
    /// Triaged reports still waiting for a bounty.
    PendingBounty,
    /// Triaged, bounty-awarded reports that are still open.
    PendingResolution,
}

impl DeadlineCategory {
    pub const ALL: [DeadlineCategory; 3] = [
        DeadlineCategory::NewReports,
        DeadlineCategory::PendingBounty,
        DeadlineCategory::PendingResolution,
    ];

    /// The configured day threshold for this category.
    pub fn sla_days(&self, sla: &SlaConfig) -> u32 {
        match self {
            DeadlineCategory::NewReports => sla.new_days,
            DeadlineCategory::PendingBounty => sla.bounty_days,
            DeadlineCategory::PendingResolution => sla.triaged_days,
        }
    }

    /// The filter window for this category at `now` with an SLA of `days`.
    pub fn filters(&self, days: u32, now: DateTime<Utc>) -> ReportFilters {
        let cutoff = now - Duration::days(i64::from(days));
        let mut filters = ReportFilters {
            created_before: Some(cutoff),
            ..ReportFilters::default()
        };
        match self {
            DeadlineCategory::NewReports => {
                filters.state = Some("new".to_string());
                filters.triaged_null = Some(true);
            }
            DeadlineCategory::PendingBounty => {
                filters.state = Some("triaged".to_string());
                filters.bounty_awarded_null = Some(true);
            }
            DeadlineCategory::PendingResolution => {
                filters.state = Some("triaged".to_string());
                filters.bounty_awarded_null = Some(false);
                filters.closed_null = Some(true);
            }
        }
        filters
    }

    pub fn title(&self) -> &'static str {
        match self {
            DeadlineCategory::NewReports => "Missed SLA Deadline - New Reports:",
            DeadlineCategory::PendingBounty => "Missed SLA Deadline - Bounty to be rewarded:",
            DeadlineCategory::PendingResolution => {
                "Missed SLA Deadline - Triaged reports to be resolved:"
            }
        }
    }

    pub fn description(&self, days: u32) -> String {
        match self {
            DeadlineCategory::NewReports => format!(
                "These reports have not been triaged for more than {days} days and hence have missed SLA deadlines."
            ),
            DeadlineCategory::PendingBounty => format!(
                "Bounty has not been rewarded for these triaged reports for more than {days} days and hence have missed SLA deadlines."
            ),
            DeadlineCategory::PendingResolution => format!(
                "These triaged reports have not been resolved for more than {days} days and hence have missed SLA deadlines."
            ),
        }
    }
}
