// Standings and schedule retrieval from the stats service or local fixtures.
//
// Payloads are returned as raw JSON; shape handling belongs to the pipeline's
// feed parser.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{Config, SourceMode};

/// File names read from the fixture directory.
pub const STANDINGS_FIXTURE: &str = "standings.json";
pub const SCHEDULE_FIXTURE: &str = "schedule.json";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// The two raw payloads one sync consumes.
#[derive(Debug, Clone)]
pub struct Payloads {
    pub standings: Value,
    pub schedule: Value,
}

/// Parameters of one fetch: the season and the schedule window.
#[derive(Debug, Clone, Copy)]
pub struct FetchWindow {
    pub season: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

// ---------------------------------------------------------------------------
// StatsApiClient
// ---------------------------------------------------------------------------

/// HTTP client for the stats service's standings and schedule endpoints.
pub struct StatsApiClient {
    http: reqwest::Client,
    base_url: String,
    league_ids: Vec<u32>,
}

impl StatsApiClient {
    pub fn new(base_url: &str, timeout: Duration, league_ids: Vec<u32>) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SourceError::Client)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            league_ids,
        })
    }

    pub fn standings_url(&self, season: u32) -> String {
        let leagues = self
            .league_ids
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{}/standings?leagueId={leagues}&season={season}&standingsTypes=regularSeason",
            self.base_url
        )
    }

    pub fn schedule_url(&self, start: NaiveDate, end: NaiveDate) -> String {
        format!(
            "{}/schedule?sportId=1&gameType=R&startDate={}&endDate={}",
            self.base_url,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        )
    }

    async fn get_json(&self, url: String) -> Result<Value, SourceError> {
        debug!("GET {url}");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| SourceError::Http {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status { url, status });
        }

        response
            .json::<Value>()
            .await
            .map_err(|source| SourceError::Http { url, source })
    }

    /// Fetch standings and schedule concurrently.
    pub async fn fetch(&self, window: FetchWindow) -> Result<Payloads, SourceError> {
        let (standings, schedule) = tokio::try_join!(
            self.get_json(self.standings_url(window.season)),
            self.get_json(self.schedule_url(window.start, window.end)),
        )?;
        Ok(Payloads {
            standings,
            schedule,
        })
    }
}

// ---------------------------------------------------------------------------
// StatsSource
// ---------------------------------------------------------------------------

/// Where payloads come from for a sync run.
pub enum StatsSource {
    /// Live stats service.
    Remote(StatsApiClient),
    /// Directory holding `standings.json` and `schedule.json`.
    Fixture(PathBuf),
}

impl StatsSource {
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        match config.source.mode {
            SourceMode::Remote => Ok(StatsSource::Remote(StatsApiClient::new(
                &config.source.base_url,
                Duration::from_secs(config.source.timeout_secs),
                config.source.league_ids.clone(),
            )?)),
            SourceMode::Fixture => Ok(StatsSource::Fixture(
                config.resolve(&config.source.fixture_dir),
            )),
        }
    }

    pub async fn fetch(&self, window: FetchWindow) -> Result<Payloads, SourceError> {
        match self {
            StatsSource::Remote(client) => {
                info!(
                    "fetching {} standings and schedule {}..{}",
                    window.season, window.start, window.end
                );
                client.fetch(window).await
            }
            StatsSource::Fixture(dir) => {
                info!("reading payloads from {}", dir.display());
                Ok(Payloads {
                    standings: read_fixture(&dir.join(STANDINGS_FIXTURE)).await?,
                    schedule: read_fixture(&dir.join(SCHEDULE_FIXTURE)).await?,
                })
            }
        }
    }
}

async fn read_fixture(path: &Path) -> Result<Value, SourceError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    serde_json::from_str(&text).map_err(|source| SourceError::Json {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
