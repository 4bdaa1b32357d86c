//! The structs
//!
use std::collections::BTreeMap;
use anyhow::Result;
use mysql::Conn;

/// A single row of a result set.
///
/// The column name is the key, the value is the textual representation of the column value.
/// A `NULL` value is stored as `None`.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultRow {
    pub columns: BTreeMap<String, Option<String>>,
}

/// The connection details for a frontend.
#[derive(Clone, Default)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

/// Whether a connection is kept for the run, or created and dropped for every statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionPolicy {
    #[default]
    Persistent,
    PerQuery,
}

/// The source of all result sets.
pub trait Frontend {
    /// Execute a statement and return all rows.
    fn query(&mut self, sql: &str) -> Result<Vec<ResultRow>>;
    /// The `host:port` of the frontend currently used.
    fn hostname_port(&self) -> String;
    /// The FE host currently used.
    fn host(&self) -> String;
    /// Point the frontend to another FE host, using the same port and credentials.
    fn switch_host(&mut self, host: &str) -> Result<()>;
}

pub struct MysqlFrontend {
    pub settings: ConnectionSettings,
    pub policy: ConnectionPolicy,
    pub connection: Option<Conn>,
}

/// A frontend that answers from canned result sets, keyed by the (whitespace normalized) statement.
///
/// A statement without a canned answer returns an error.
#[derive(Debug, Default)]
pub struct StaticFrontend {
    pub host: String,
    pub responses: BTreeMap<String, std::result::Result<Vec<ResultRow>, String>>,
    /// Every statement executed, in order.
    pub executed: Vec<String>,
}
