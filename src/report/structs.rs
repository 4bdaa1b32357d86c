//! The structs
//!
use std::path::PathBuf;
use crate::table_health::{HealthTargets, RunMode};

/// Which report sections to produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportModule {
    /// All sections; the bucket section only if a bucket target is set.
    #[default]
    All,
    /// The per table replica count and tablet size statistics.
    Tablets,
    /// The partitions with the target replication number.
    Replicas,
    /// The partitions with the target bucket count.
    Buckets,
    /// The partitions without data.
    Partitions,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

#[derive(Debug, Clone)]
pub struct HealthReportSettings {
    pub mode: RunMode,
    pub targets: HealthTargets,
    pub module: ReportModule,
    pub format: OutputFormat,
    /// Empty means all databases.
    pub databases: Vec<String>,
}

/// A row of a partition section.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionRow {
    pub database_name: String,
    pub table_name: String,
    pub partition_name: String,
    /// Shown after the table name in a text table, for example `(schema is 1 replica)`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub annotation: Option<String>,
}

/// A report section: the rows, and what is needed to render them as a text table.
#[derive(Debug, Clone)]
pub struct ReportSection<T> {
    /// Used for the file name.
    pub name: &'static str,
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<T>,
}

/// A row that can be shown in a text table.
pub trait TabularRow {
    fn cells(&self) -> Vec<String>;
}

/// The files written by a report run.
#[derive(Debug, Default)]
pub struct ReportFiles {
    pub files: Vec<PathBuf>,
}
