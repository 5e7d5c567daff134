use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::core::aggregate::aggregate;
use crate::core::filter::ExclusionSet;
use crate::core::models::{AggregateResult, JobRecord, JobStatus, SessionWindow};
use crate::core::server::{BackupServer, ConnectionError};

/// In-memory backup server for simulation runs and tests.
pub struct SimulatedServer {
    jobs: Vec<JobRecord>,
    reachable: bool,
}

impl SimulatedServer {
    pub fn new(jobs: Vec<JobRecord>) -> Self {
        Self {
            jobs,
            reachable: true,
        }
    }

    /// A server every request to fails.
    pub fn unreachable() -> Self {
        Self {
            jobs: Vec::new(),
            reachable: false,
        }
    }

    /// A small fleet with one job per status, a running job and jobs the
    /// default exclusions drop.
    pub fn demo() -> Self {
        let base = Utc::now() - Duration::days(1);
        let session = |minutes: i64| SessionWindow::new(base, base + Duration::minutes(minutes));

        let mut copy_job = JobRecord::scheduled_backup("Offsite copy", JobStatus::Success)
            .with_session(session(90));
        copy_job.is_backup = false;

        Self::new(vec![
            JobRecord::scheduled_backup("File server", JobStatus::Success).with_session(session(42)),
            JobRecord::scheduled_backup("Exchange", JobStatus::Warning).with_session(session(75)),
            JobRecord::scheduled_backup("SQL cluster", JobStatus::Failed).with_session(session(13)),
            JobRecord::scheduled_backup("Domain controllers", JobStatus::Failed).running(),
            JobRecord::scheduled_backup("New web farm", JobStatus::None),
            JobRecord::scheduled_backup("Test restore lab", JobStatus::Failed).with_session(session(5)),
            copy_job,
        ])
    }
}

#[async_trait]
impl BackupServer for SimulatedServer {
    async fn fetch_aggregate(
        &self,
        host: &str,
        exclusions: &ExclusionSet,
    ) -> Result<AggregateResult, ConnectionError> {
        if !self.reachable {
            return Err(ConnectionError::new(
                host,
                anyhow::anyhow!("(Simulator) host {host} is unreachable"),
            ));
        }

        tracing::debug!(host, jobs = self.jobs.len(), "(Simulator) listing jobs");
        Ok(aggregate(&self.jobs, exclusions))
    }
}
