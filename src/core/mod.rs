pub mod aggregate;
pub mod filter;
pub mod models;
pub mod orchestrator;
pub mod server;

pub use aggregate::{Aggregator, aggregate, is_retained};
pub use filter::{DEFAULT_EXCLUSIONS, ExclusionSet};
pub use models::{AggregateResult, JobRecord, JobStatus, SessionWindow, StatusCounts};
pub use orchestrator::Orchestrator;
pub use server::{BackupServer, ConnectionError};
