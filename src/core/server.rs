use async_trait::async_trait;
use thiserror::Error;

use super::filter::ExclusionSet;
use super::models::AggregateResult;

/// Collection against a backup server failed.
///
/// Every failure mode (unreachable host, rejected credentials, a broken
/// response) collapses into this one error. The cause is kept for logging.
#[derive(Debug, Error)]
#[error("Request to target server {host} failed")]
pub struct ConnectionError {
    pub host: String,
    #[source]
    pub source: anyhow::Error,
}

impl ConnectionError {
    pub fn new(host: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self {
            host: host.into(),
            source: source.into(),
        }
    }
}

/// A backup server that can report its scheduled backup jobs.
#[async_trait]
pub trait BackupServer: Send + Sync {
    /// Enumerate the jobs on `host`, drop those not retained under
    /// `exclusions`, and aggregate the rest.
    async fn fetch_aggregate(
        &self,
        host: &str,
        exclusions: &ExclusionSet,
    ) -> Result<AggregateResult, ConnectionError>;
}
