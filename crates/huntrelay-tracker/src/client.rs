use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use huntrelay_core::config::TrackerConfig;
use huntrelay_core::types::{Activity, ActivityPage, Report};

use crate::error::{Result, TrackerError};
use crate::filters::ReportFilters;

/// The tracker API as the poll cycles consume it. Object safe so tests can
/// substitute a scripted double.
#[async_trait]
pub trait TrackerApi: Send + Sync {
    /// One page of the incremental activity feed. `updated_after` is an
    /// exclusive lower bound on `updated_at`; `None` fetches from the start
    /// of the feed.
    async fn fetch_activities(
        &self,
        page_size: u32,
        updated_after: Option<&str>,
    ) -> Result<ActivityPage>;

    /// Reports matching `filters`, first page only.
    async fn fetch_reports(&self, filters: &ReportFilters) -> Result<Vec<Report>>;

    /// A single report by id.
    async fn fetch_report(&self, id: &str) -> Result<Report>;
}

/// HackerOne v1 REST client. Authenticates with basic auth (API token
/// identifier + secret); all requests are scoped to one program handle.
pub struct HackerOneClient {
    http: reqwest::Client,
    base_url: String,
    api_identifier: String,
    api_token: String,
    program: String,
}

#[derive(Debug, Deserialize)]
struct ActivityFeed {
    #[serde(default)]
    data: Vec<Activity>,
    #[serde(default)]
    meta: FeedMeta,
}

#[derive(Debug, Default, Deserialize)]
struct FeedMeta {
    #[serde(default)]
    max_updated_at: String,
}

#[derive(Debug, Deserialize)]
struct ReportList {
    #[serde(default)]
    data: Vec<Report>,
}

#[derive(Debug, Deserialize)]
struct ReportEnvelope {
    data: Report,
}

impl HackerOneClient {
    pub fn new(config: &TrackerConfig) -> Self {
        let mut base_url = config.base_url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_identifier: config.api_identifier.clone(),
            api_token: config.api_token.clone(),
            program: config.program.clone(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "tracker API request");
        let response = self
            .http
            .get(&url)
            .basic_auth(&self.api_identifier, Some(&self.api_token))
            .header("Content-Type", "application/json")
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrackerError::Status {
                status: status.as_u16(),
                url,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl TrackerApi for HackerOneClient {
    async fn fetch_activities(
        &self,
        page_size: u32,
        updated_after: Option<&str>,
    ) -> Result<ActivityPage> {
        let mut query = vec![
            ("handle".to_string(), self.program.clone()),
            ("page[size]".to_string(), page_size.to_string()),
        ];
        if let Some(after) = updated_after {
            query.push(("updated_at_after".to_string(), after.to_string()));
        }
        let feed: ActivityFeed = self.get_json("incremental/activities", &query).await?;
        Ok(ActivityPage {
            activities: feed.data,
            max_updated_at: feed.meta.max_updated_at,
        })
    }

    async fn fetch_reports(&self, filters: &ReportFilters) -> Result<Vec<Report>> {
        let mut query = vec![
            ("filter[program][]".to_string(), self.program.clone()),
            ("page[size]".to_string(), "100".to_string()),
        ];
        query.extend(filters.query_pairs());
        let list: ReportList = self.get_json("reports", &query).await?;
        Ok(list.data)
    }

    async fn fetch_report(&self, id: &str) -> Result<Report> {
        let envelope: ReportEnvelope = self.get_json(&format!("reports/{id}"), &[]).await?;
        Ok(envelope.data)
    }
}
