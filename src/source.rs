//! Remote stats API access.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

use crate::error::{IngestError, Result};
use crate::game_id::GameId;
use crate::model::{BoxscoreResponse, LinescoreResponse, ScheduleResponse, TeamEntry, TeamsResponse};

/// Read-only view of the league stats API.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Every team in the league, in directory order.
    async fn teams(&self) -> Result<Vec<TeamEntry>>;

    /// Games scheduled for `team_id` between the two dates, inclusive.
    async fn schedule(
        &self,
        team_id: u32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ScheduleResponse>;

    async fn boxscore(&self, game_id: GameId) -> Result<BoxscoreResponse>;

    async fn linescore(&self, game_id: GameId) -> Result<LinescoreResponse>;
}

/// `StatsSource` over the public NHL stats API.
#[derive(Clone)]
pub struct NhlApiClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl NhlApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(2)
            .build()
            .map_err(|e| IngestError::source_unavailable(&base_url, e.to_string()))?;

        Ok(Self {
            base_url,
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[instrument(skip(self, query))]
    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                error!("Request failed for URL {}: {}", url, e);
                IngestError::source_unavailable(&url, e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| IngestError::source_unavailable(&url, format!("failed to read body: {e}")))?;

        if !status.is_success() {
            error!("HTTP {} from {}", status, url);
            let preview: String = body.chars().take(200).collect();
            return Err(IngestError::source_unavailable(
                &url,
                format!("status {status}: {preview}"),
            ));
        }

        debug!("Response length: {} bytes", body.len());

        serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse API response: {} (URL: {})", e, url);
            IngestError::source_unavailable(&url, format!("unexpected payload: {e}"))
        })
    }
}

#[async_trait]
impl StatsSource for NhlApiClient {
    async fn teams(&self) -> Result<Vec<TeamEntry>> {
        let response: TeamsResponse = self.get_json("/teams", &[]).await?;
        info!("Fetched {} teams from the directory", response.teams.len());
        Ok(response.teams)
    }

    async fn schedule(
        &self,
        team_id: u32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ScheduleResponse> {
        self.get_json(
            "/schedule",
            &[
                ("teamId", team_id.to_string()),
                ("startDate", start.format("%Y-%m-%d").to_string()),
                ("endDate", end.format("%Y-%m-%d").to_string()),
            ],
        )
        .await
    }

    async fn boxscore(&self, game_id: GameId) -> Result<BoxscoreResponse> {
        self.get_json(&format!("/game/{game_id}/boxscore"), &[]).await
    }

    async fn linescore(&self, game_id: GameId) -> Result<LinescoreResponse> {
        self.get_json(&format!("/game/{game_id}/linescore"), &[]).await
    }
}
