//! The structs
//!
use std::{collections::BTreeMap, path::PathBuf};
use crate::frontend::ResultRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DoctorModule {
    #[value(name = "cluster_state")]
    ClusterState,
    #[value(name = "backend_mapping")]
    BackendMapping,
    #[value(name = "session_vars")]
    SessionVars,
    #[value(name = "be_config")]
    BeConfig,
    #[value(name = "fe_config")]
    FeConfig,
    #[value(name = "all_configs")]
    AllConfigs,
    /// Table id, create statement and partition sizes; `--name` limits it to one table.
    Schema,
    /// Tablet and replica details; needs the tablet id in `--name`.
    Tablet,
    /// Materialized views with their latest refresh, dependencies and partitions; `--name` limits it to one view.
    #[value(name = "mv")]
    MaterializedViews,
    /// Recent queries from the audit log of every frontend, running queries and the process list.
    #[value(name = "performance_diagnostics")]
    PerformanceDiagnostics,
    /// The query dump of the statement in `--sql-file`.
    #[value(name = "query_dump")]
    QueryDump,
    /// The stack traces of all threads of the backend at `--be-ip`.
    #[value(name = "be_stack")]
    BeStack,
}

/// The arguments of the collectors.
#[derive(Debug, Clone, Default)]
pub struct DoctorSettings {
    /// Table or materialized view name, tablet id for the tablet collector.
    pub name: Option<String>,
    pub sql_file: Option<PathBuf>,
    pub be_ip: Option<String>,
    /// Maximum number of recent queries.
    pub limit: usize,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ClusterState {
    pub backends: Vec<ResultRow>,
    pub frontends: Vec<ResultRow>,
    pub resources: Vec<ResultRow>,
    pub version: String,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifiedSessionVariable {
    pub current_value: String,
    pub is_modified: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifiedConfig {
    pub current_value: String,
    pub default_value: String,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontendConfig {
    pub value: String,
}

/// Backend host -> configuration name -> value.
pub type BackendConfigs = BTreeMap<String, BTreeMap<String, ModifiedConfig>>;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AllConfigs {
    pub fe_configs: BTreeMap<String, FrontendConfig>,
    pub be_configs: BackendConfigs,
    pub session_vars: BTreeMap<String, ModifiedSessionVariable>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionMeta {
    pub partition_name: String,
    pub data_size: Option<String>,
    pub data_size_mb: Option<f64>,
    pub row_count: Option<i64>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    pub table_id: Option<String>,
    pub create_table: Option<String>,
    pub partitions: Vec<PartitionMeta>,
    pub total_data_size_mb: f64,
    pub total_row_count: i64,
    /// Only filled when `partitions_meta` is not available.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tablets: Vec<ResultRow>,
}

/// Database -> table -> information.
pub type SchemaInfo = BTreeMap<String, BTreeMap<String, TableInfo>>;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TabletMetadata {
    pub tablet_id: String,
    /// The row of `SHOW TABLET <id>`: database, table, partition, index and the detail command.
    pub tablet: ResultRow,
    pub replicas: Vec<ResultRow>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependentObject {
    pub database: String,
    pub name: String,
    #[serde(rename = "type")]
    pub object_type: String,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedMaterializedView {
    pub database: String,
    pub name: String,
    #[serde(rename = "type")]
    pub object_type: String,
    pub dependencies: Dependencies,
}

/// The objects a materialized view is built on.
///
/// `base_tables` holds the base tables of nested materialized views too.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependencies {
    pub base_tables: Vec<DependentObject>,
    pub materialized_views: Vec<NestedMaterializedView>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterializedViewInfo {
    pub definition: Option<String>,
    pub task_name: Option<String>,
    /// The last row of `information_schema.task_runs` for the refresh task.
    pub latest_refresh: Option<ResultRow>,
    pub dependencies: Dependencies,
    pub partitions: Vec<PartitionMeta>,
    pub total_data_size_mb: f64,
    pub total_row_count: i64,
}

/// Database -> materialized view -> information.
pub type MaterializedViews = BTreeMap<String, BTreeMap<String, MaterializedViewInfo>>;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PerformanceDiagnostics {
    /// Audit log rows of all frontends, newest first.
    pub recent_queries: Vec<ResultRow>,
    pub current_queries: Vec<ResultRow>,
    pub active_queries: Vec<ResultRow>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct QueryDump {
    pub sql_file: String,
    pub query_dump: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BackendStackTrace {
    pub be_ip: String,
    pub be_id: String,
    pub stack_trace: String,
}
