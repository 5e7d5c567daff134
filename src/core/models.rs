use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Result of the last run of a job, as reported by the backup server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum JobStatus {
    Success,
    Warning,
    Failed,
    #[default]
    #[serde(other)]
    None,
}

impl JobStatus {
    /// Whether the job has finished at least once with a known result.
    pub fn is_defined(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Start and end of the most recent completed session of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SessionWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Session length in minutes. Clock skew never yields a negative value.
    pub fn duration_minutes(&self) -> f64 {
        let millis = (self.end - self.start).num_milliseconds().max(0);
        millis as f64 / 60_000.0
    }
}

/// One job as enumerated on the backup server.
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub name: String,
    pub is_backup: bool,
    pub schedule_enabled: bool,
    pub is_running: bool,
    pub last_status: JobStatus,
    pub last_session: Option<SessionWindow>,
}

impl JobRecord {
    /// A scheduled backup job that last finished with `status` and is idle.
    pub fn scheduled_backup(name: impl Into<String>, status: JobStatus) -> Self {
        Self {
            name: name.into(),
            is_backup: true,
            schedule_enabled: true,
            is_running: false,
            last_status: status,
            last_session: None,
        }
    }

    pub fn running(mut self) -> Self {
        self.is_running = true;
        self
    }

    pub fn with_session(mut self, session: SessionWindow) -> Self {
        self.last_session = Some(session);
        self
    }

    /// Status the job is counted under. A running job has no settled
    /// result yet, whatever its previous run reported.
    pub fn counted_status(&self) -> JobStatus {
        if self.is_running {
            JobStatus::None
        } else {
            self.last_status
        }
    }

    /// Duration of the last completed session, only for idle jobs.
    pub fn duration_minutes(&self) -> Option<f64> {
        if self.is_running {
            return None;
        }
        self.last_session.map(|s| s.duration_minutes())
    }
}

/// Per-status job counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub none: u64,
    pub success: u64,
    pub warning: u64,
    pub failed: u64,
}

impl StatusCounts {
    pub fn get(&self, status: JobStatus) -> u64 {
        match status {
            JobStatus::None => self.none,
            JobStatus::Success => self.success,
            JobStatus::Warning => self.warning,
            JobStatus::Failed => self.failed,
        }
    }

    pub fn increment(&mut self, status: JobStatus) {
        let counter = match status {
            JobStatus::None => &mut self.none,
            JobStatus::Success => &mut self.success,
            JobStatus::Warning => &mut self.warning,
            JobStatus::Failed => &mut self.failed,
        };
        *counter += 1;
    }

    pub fn total(&self) -> u64 {
        self.none + self.success + self.warning + self.failed
    }
}

/// Counters collected from one backup server in one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateResult {
    pub jobs_total: u64,
    pub running_count: u64,
    pub average_duration_minutes: f64,
    pub status_counts: StatusCounts,
}
