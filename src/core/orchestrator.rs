use crate::context::AppContext;
use crate::report::{Report, error_document};

/// Runs one collection and renders its outcome.
pub struct Orchestrator {
    ctx: AppContext,
}

impl Orchestrator {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    /// Collect from the configured host and return the PRTG document, either
    /// the channel report or the error report.
    pub async fn run(&self) -> String {
        let config = &self.ctx.config;
        let exclusions = config.exclusion_set();

        tracing::info!(
            host = %config.host,
            exclusions = ?exclusions.patterns(),
            "Collecting backup job status"
        );

        match self.ctx.server.fetch_aggregate(&config.host, &exclusions).await {
            Ok(result) => {
                tracing::info!(
                    jobs = result.jobs_total,
                    running = result.running_count,
                    failed = result.status_counts.failed,
                    average_minutes = result.average_duration_minutes,
                    "Collection finished"
                );
                Report::from_aggregate(&result).to_xml(config.layout)
            }
            Err(e) => {
                tracing::error!(host = %e.host, error = %format!("{:#}", e.source), "{}", e);
                error_document(&e.to_string())
            }
        }
    }
}
