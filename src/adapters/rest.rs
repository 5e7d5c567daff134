//! Veeam Backup & Replication REST API client.
//!
//! One run logs in with the password grant, pages through the job list and
//! the job states, and looks up the last session of every retained idle job.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

use crate::core::aggregate::{Aggregator, is_retained};
use crate::core::filter::ExclusionSet;
use crate::core::models::{AggregateResult, JobRecord, JobStatus, SessionWindow};
use crate::core::server::{BackupServer, ConnectionError};

const API_VERSION_HEADER: &str = "x-api-version";
const PAGE_SIZE: u32 = 200;

/// Connection settings for the REST endpoint.
#[derive(Debug, Clone)]
pub struct RestSettings {
    pub port: u16,
    pub tls: bool,
    pub accept_invalid_certs: bool,
    pub username: String,
    pub password: String,
    pub api_version: String,
}

pub struct RestBackupServer {
    settings: RestSettings,
    client: Client,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct Page<T> {
    data: Vec<T>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Deserialize)]
struct Pagination {
    total: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobModel {
    id: String,
    name: String,
    #[serde(rename = "type")]
    job_type: String,
    #[serde(default)]
    is_disabled: bool,
    #[serde(default)]
    schedule: Option<ScheduleModel>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleModel {
    #[serde(default)]
    run_automatically: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobStateModel {
    id: String,
    status: String,
    #[serde(default)]
    last_result: JobStatus,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionModel {
    creation_time: DateTime<Utc>,
    #[serde(default)]
    end_time: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiError {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl JobModel {
    fn is_backup(&self) -> bool {
        self.job_type.eq_ignore_ascii_case("Backup")
    }

    fn schedule_enabled(&self) -> bool {
        !self.is_disabled && self.schedule.as_ref().is_some_and(|s| s.run_automatically)
    }
}

impl RestBackupServer {
    pub fn new(settings: RestSettings) -> Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { settings, client })
    }

    fn base_url(&self, host: &str) -> String {
        let scheme = if self.settings.tls { "https" } else { "http" };
        format!("{}://{}:{}", scheme, host, self.settings.port)
    }

    async fn login(&self, base: &str) -> Result<String> {
        let form = [
            ("grant_type", "password"),
            ("username", self.settings.username.as_str()),
            ("password", self.settings.password.as_str()),
        ];

        let response = self
            .client
            .post(format!("{}/api/oauth2/token", base))
            .header(API_VERSION_HEADER, &self.settings.api_version)
            .form(&form)
            .send()
            .await
            .context("Failed to reach the token endpoint")?;

        let token: TokenResponse = decode(response).await.context("Login rejected")?;
        Ok(token.access_token)
    }

    fn get(&self, url: String, token: &str) -> RequestBuilder {
        self.client
            .get(url)
            .header(API_VERSION_HEADER, &self.settings.api_version)
            .bearer_auth(token)
    }

    async fn get_all<T: DeserializeOwned>(&self, base: &str, path: &str, token: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();

        loop {
            let skip = items.len().to_string();
            let limit = PAGE_SIZE.to_string();
            let response = self
                .get(format!("{}{}", base, path), token)
                .query(&[("skip", skip.as_str()), ("limit", limit.as_str())])
                .send()
                .await
                .with_context(|| format!("GET {} failed", path))?;

            let page: Page<T> = decode(response)
                .await
                .with_context(|| format!("Unexpected response from {}", path))?;

            let received = page.data.len();
            items.extend(page.data);

            let total = page.pagination.map(|p| p.total).unwrap_or(0);
            if received == 0 || items.len() as u64 >= total {
                break;
            }
        }

        tracing::debug!(path, count = items.len(), "Fetched listing");
        Ok(items)
    }

    async fn last_session(&self, base: &str, token: &str, job_id: &str) -> Result<Option<SessionWindow>> {
        let response = self
            .get(format!("{}/api/v1/sessions", base), token)
            .query(&[
                ("jobIdFilter", job_id),
                ("limit", "1"),
                ("orderColumn", "CreationTime"),
                ("orderAsc", "false"),
            ])
            .send()
            .await
            .with_context(|| format!("Failed to fetch sessions of job {}", job_id))?;

        let page: Page<SessionModel> = decode(response)
            .await
            .with_context(|| format!("Unexpected session listing for job {}", job_id))?;

        Ok(page
            .data
            .into_iter()
            .next()
            .and_then(|s| s.end_time.map(|end| SessionWindow::new(s.creation_time, end))))
    }

    async fn collect(&self, host: &str, exclusions: &ExclusionSet) -> Result<AggregateResult> {
        let base = self.base_url(host);
        tracing::debug!(%base, "Connecting to backup server");

        let token = self.login(&base).await?;

        let jobs: Vec<JobModel> = self.get_all(&base, "/api/v1/jobs", &token).await?;
        let states: HashMap<String, JobStateModel> = self
            .get_all::<JobStateModel>(&base, "/api/v1/jobs/states", &token)
            .await?
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();

        let mut aggregator = Aggregator::new();
        for job in jobs {
            let state = states.get(&job.id);
            let mut record = JobRecord {
                name: job.name.clone(),
                is_backup: job.is_backup(),
                schedule_enabled: job.schedule_enabled(),
                is_running: state.is_some_and(|s| s.status.eq_ignore_ascii_case("Running")),
                last_status: state.map(|s| s.last_result).unwrap_or_default(),
                last_session: None,
            };

            if !is_retained(&record, exclusions) {
                tracing::debug!(job = %record.name, "Skipping job");
                continue;
            }

            if !record.is_running && record.last_status.is_defined() {
                record.last_session = self.last_session(&base, &token, &job.id).await?;
            }

            aggregator.push(&record);
        }

        Ok(aggregator.finish())
    }
}

/// Turn a non-2xx response into an error carrying the API's message.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ApiError>(&body)
            .ok()
            .and_then(|e| match (e.error_code, e.message) {
                (Some(code), Some(message)) => Some(format!("{}: {}", code, message)),
                (None, Some(message)) => Some(message),
                (Some(code), None) => Some(code),
                (None, None) => None,
            })
            .unwrap_or(body);
        return Err(anyhow!("HTTP {}: {}", status, detail));
    }

    response
        .json::<T>()
        .await
        .context("Failed to parse response body")
}

#[async_trait]
impl BackupServer for RestBackupServer {
    async fn fetch_aggregate(
        &self,
        host: &str,
        exclusions: &ExclusionSet,
    ) -> Result<AggregateResult, ConnectionError> {
        self.collect(host, exclusions)
            .await
            .map_err(|e| ConnectionError::new(host, e))
    }
}
