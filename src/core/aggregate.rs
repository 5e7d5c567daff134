use super::filter::ExclusionSet;
use super::models::{AggregateResult, JobRecord, StatusCounts};

/// Whether a job takes part in the report at all.
pub fn is_retained(job: &JobRecord, exclusions: &ExclusionSet) -> bool {
    job.is_backup && job.schedule_enabled && !exclusions.is_excluded(&job.name)
}

/// Running totals over the retained jobs of one server.
#[derive(Debug, Default)]
pub struct Aggregator {
    jobs_total: u64,
    running_count: u64,
    status_counts: StatusCounts,
    duration_sum_minutes: f64,
    completed_sessions: u64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one retained job.
    pub fn push(&mut self, job: &JobRecord) {
        self.jobs_total += 1;
        self.status_counts.increment(job.counted_status());

        if job.is_running {
            self.running_count += 1;
            return;
        }

        if !job.last_status.is_defined() {
            return;
        }

        if let Some(minutes) = job.duration_minutes() {
            self.duration_sum_minutes += minutes;
            self.completed_sessions += 1;
        }
    }

    pub fn finish(self) -> AggregateResult {
        let average_duration_minutes = if self.completed_sessions > 0 {
            self.duration_sum_minutes / self.completed_sessions as f64
        } else {
            0.0
        };

        AggregateResult {
            jobs_total: self.jobs_total,
            running_count: self.running_count,
            average_duration_minutes,
            status_counts: self.status_counts,
        }
    }
}

/// Filter `jobs` through `exclusions` and aggregate the rest.
pub fn aggregate<'a, I>(jobs: I, exclusions: &ExclusionSet) -> AggregateResult
where
    I: IntoIterator<Item = &'a JobRecord>,
{
    let mut aggregator = Aggregator::new();
    for job in jobs {
        if is_retained(job, exclusions) {
            aggregator.push(job);
        }
    }
    aggregator.finish()
}
