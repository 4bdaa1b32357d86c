//! The structs
//!
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleReplicaTable {
    pub database: String,
    pub table_name: String,
    pub replication_num: i64,
    pub table_id: Option<String>,
}

/// A row of the csv output.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabletOnBackend {
    #[serde(rename = "TABLET_ID")]
    pub tablet_id: String,
    #[serde(rename = "BACKEND_ID")]
    pub backend_id: String,
}

#[derive(Debug, Default)]
pub struct SingleReplicaCheck {
    pub tables_checked: usize,
    pub tables_unqueryable: usize,
    pub tablets: Vec<TabletOnBackend>,
}
