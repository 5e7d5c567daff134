//! PRTG channels built from an [`AggregateResult`].

pub mod xml;

pub use xml::{Field, Record, ResultLayout, error_document, serialize};

use crate::core::{AggregateResult, JobStatus};

pub const TOTAL_JOBS: &str = "Total Jobs";
pub const RUNNING_JOBS: &str = "Currently Running Jobs";
pub const AVERAGE_RUNTIME: &str = "Average Job Runtime (min)";
pub const STATUS_SUCCESS: &str = "Job Status: Success";
pub const STATUS_FAILED: &str = "Job Status: Failed";
pub const STATUS_NONE: &str = "Job Status: None";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChannelValue {
    Count(u64),
    Float(f64),
}

/// Presentation hints understood by PRTG.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Hints {
    pub decimal_places: Option<usize>,
    /// Emitted as `Unit=Custom` plus `CustomUnit`.
    pub custom_unit: Option<&'static str>,
    /// Values above this limit put the channel into the error state.
    pub limit_max_error: Option<f64>,
}

/// One display row of the sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub name: &'static str,
    pub value: ChannelValue,
    pub hints: Hints,
}

impl Channel {
    pub fn count(name: &'static str, value: u64) -> Self {
        Self {
            name,
            value: ChannelValue::Count(value),
            hints: Hints::default(),
        }
    }

    pub fn float(name: &'static str, value: f64, decimal_places: usize) -> Self {
        Self {
            name,
            value: ChannelValue::Float(value),
            hints: Hints {
                decimal_places: Some(decimal_places),
                ..Hints::default()
            },
        }
    }

    pub fn custom_unit(mut self, unit: &'static str) -> Self {
        self.hints.custom_unit = Some(unit);
        self
    }

    pub fn limit_max_error(mut self, limit: f64) -> Self {
        self.hints.limit_max_error = Some(limit);
        self
    }

    /// The value as written into `<Value>`. Rust float formatting always
    /// uses `.` as the decimal separator.
    pub fn formatted_value(&self) -> String {
        match self.value {
            ChannelValue::Count(n) => n.to_string(),
            ChannelValue::Float(v) => match self.hints.decimal_places {
                Some(places) => format!("{v:.places$}"),
                None => v.to_string(),
            },
        }
    }

    pub fn to_record(&self) -> Record {
        let mut record = vec![
            Field::new("Channel", self.name),
            Field::new("Value", self.formatted_value()),
        ];

        if matches!(self.value, ChannelValue::Float(_)) {
            record.push(Field::new("Float", 1));
            if let Some(places) = self.hints.decimal_places {
                record.push(Field::new("DecimalMode", places));
            }
        }
        if let Some(unit) = self.hints.custom_unit {
            record.push(Field::new("Unit", "Custom"));
            record.push(Field::new("CustomUnit", unit));
        }
        if let Some(limit) = self.hints.limit_max_error {
            record.push(Field::new("LimitMaxError", limit));
            record.push(Field::new("LimitMode", 1));
        }

        record
    }
}

/// The fixed channel list of one sensor run.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    channels: Vec<Channel>,
}

impl Report {
    pub fn from_aggregate(result: &AggregateResult) -> Self {
        let counts = &result.status_counts;
        let channels = vec![
            Channel::count(TOTAL_JOBS, result.jobs_total),
            Channel::count(RUNNING_JOBS, result.running_count),
            Channel::float(AVERAGE_RUNTIME, result.average_duration_minutes, 2)
                .custom_unit("Min."),
            Channel::count(STATUS_SUCCESS, counts.get(JobStatus::Success)),
            Channel::count(STATUS_FAILED, counts.get(JobStatus::Failed)).limit_max_error(0.5),
            Channel::count(STATUS_NONE, counts.get(JobStatus::None)),
        ];
        Self { channels }
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn to_xml(&self, layout: ResultLayout) -> String {
        let records: Vec<Record> = self.channels.iter().map(Channel::to_record).collect();
        serialize(&records, layout)
    }
}
