//! The structs
//!

/// How the cluster stores its data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Backends store the replicas on local disk.
    #[default]
    #[value(name = "shared_nothing")]
    SharedNothing,
    /// Compute nodes cache data that is stored once in object storage.
    #[value(name = "shared_data")]
    SharedData,
}

/// The replication number and bucket count to classify partitions with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthTargets {
    pub replica: i64,
    /// Without a bucket target no partition is classified on buckets.
    pub bucket: Option<i64>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableHealth {
    pub database: String,
    pub table: String,
    /// MB
    pub total_data_size: f64,
    pub total_replica_count: i64,
    /// MB
    pub mean_tablet_size: f64,
    /// MB
    pub tablet_size_stddev: f64,
    pub replica_partitions: Vec<String>,
    pub bucket_partitions: Vec<String>,
    pub null_partitions: Vec<String>,
    /// The create statement sets `"replication_num" = "<target replica>"`.
    pub schema_replication_match: bool,
}

#[derive(Debug, Default)]
pub struct AllTableHealth {
    pub table_health: Vec<TableHealth>,
}

/// The aggregation of the partitions of a single table, sizes in bytes.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PartitionSummary {
    pub total_data_size_bytes: f64,
    pub total_replica_count: i64,
    pub replica_partitions: Vec<String>,
    pub bucket_partitions: Vec<String>,
    pub null_partitions: Vec<String>,
}

/// Mean and sample standard deviation of the non-empty tablets of a table, in bytes.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct TabletStatistics {
    pub tablets: usize,
    pub mean: f64,
    pub stddev: f64,
}
