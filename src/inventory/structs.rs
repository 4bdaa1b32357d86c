//! The structs
//!

/// Databases that are part of StarRocks itself.
pub const INTERNAL_DATABASES: [&str; 4] = ["information_schema", "_statistics_", "starrocks_monitor", "sys"];

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    pub db_id: String,
    pub db_name: String,
}

#[derive(Debug, Default)]
pub struct AllDatabases {
    pub databases: Vec<Database>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub database: String,
    pub table_name: String,
    pub table_id: String,
}

/// All the OLAP tables found in the selected databases.
#[derive(Debug, Default)]
pub struct Inventory {
    pub tables: Vec<Table>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub partition_id: String,
    pub partition_name: String,
    pub replication_num: i64,
    pub buckets: i64,
    /// As reported, for example `1.2GB`.
    pub data_size: String,
    pub data_size_bytes: f64,
}

/// A tablet replica as reported by `SHOW TABLET FROM`: there is a row for every replica.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tablet {
    pub tablet_id: String,
    pub backend_id: String,
    pub data_size: String,
    pub data_size_bytes: f64,
    pub row_count: i64,
}
