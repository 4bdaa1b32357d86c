//! The impls and functions
//!
use std::{collections::BTreeMap, time::Instant};
use log::*;
use anyhow::{anyhow, Context, Result};
use mysql::{prelude::Queryable, Conn, OptsBuilder, Row, Value};
use crate::frontend::{ConnectionPolicy, ConnectionSettings, Frontend, MysqlFrontend, ResultRow, StaticFrontend};

impl ResultRow {
    /// Build a row where every column is not null.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        ResultRow {
            columns: pairs.iter()
                .map(|(column, value)| (column.to_string(), Some(value.to_string())))
                .collect(),
        }
    }
    pub fn with_value(mut self, column: &str, value: &str) -> Self {
        self.columns.insert(column.to_string(), Some(value.to_string()));
        self
    }
    pub fn with_null(mut self, column: &str) -> Self {
        self.columns.insert(column.to_string(), None);
        self
    }
    /// The value of a column, `None` if the column is `NULL` or doesn't exist.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns.get(column).and_then(|value| value.as_deref())
    }
    pub fn get_string(&self, column: &str) -> String {
        self.get(column).unwrap_or_default().to_string()
    }
    pub fn get_i64(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(|value| value.trim().parse::<i64>().ok())
    }
}

impl ConnectionSettings {
    pub fn hostname_port(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl MysqlFrontend {
    /// Create the frontend and verify the connection can be made.
    pub fn connect(
        settings: ConnectionSettings,
        policy: ConnectionPolicy,
    ) -> Result<Self>
    {
        let mut frontend = MysqlFrontend { settings, policy, connection: None };
        let connection = frontend.open()?;
        info!("connected to frontend: {}", frontend.settings.hostname_port());
        if policy == ConnectionPolicy::Persistent {
            frontend.connection = Some(connection);
        }
        Ok(frontend)
    }
    fn open(&self) -> Result<Conn>
    {
        let options = OptsBuilder::new()
            .ip_or_hostname(Some(self.settings.host.clone()))
            .tcp_port(self.settings.port)
            .user(Some(self.settings.user.clone()))
            .pass(Some(self.settings.password.clone()))
            .prefer_socket(false);
        Conn::new(options)
            .with_context(|| format!("Unable to connect to frontend: {} as user: {}", self.settings.hostname_port(), self.settings.user))
    }
}

impl Frontend for MysqlFrontend {
    fn query(&mut self, sql: &str) -> Result<Vec<ResultRow>>
    {
        debug!("({}) execute: {}", self.settings.hostname_port(), sql);
        let timer = Instant::now();

        let rows: mysql::Result<Vec<Row>> = match self.policy {
            ConnectionPolicy::Persistent => {
                if self.connection.is_none() {
                    self.connection = Some(self.open()?);
                }
                let connection = self.connection.as_mut()
                    .with_context(|| "No connection to frontend")?;
                connection.query(sql)
            },
            ConnectionPolicy::PerQuery => {
                // the connection is closed when it goes out of scope.
                let mut connection = self.open()?;
                connection.query(sql)
            },
        };
        let rows = rows.with_context(|| format!("Error executing query: {}", sql))?;

        debug!("({}) {} rows in {:?}", self.settings.hostname_port(), rows.len(), timer.elapsed());
        Ok(rows.iter().map(row_to_result_row).collect())
    }
    fn hostname_port(&self) -> String {
        self.settings.hostname_port()
    }
    fn host(&self) -> String {
        self.settings.host.clone()
    }
    fn switch_host(&mut self, host: &str) -> Result<()>
    {
        if self.settings.host == host && (self.connection.is_some() || self.policy == ConnectionPolicy::PerQuery) {
            return Ok(());
        }
        info!("switching frontend from: {} to: {}:{}", self.settings.host, host, self.settings.port);
        self.settings.host = host.to_string();
        self.connection = None;
        let connection = self.open()?;
        if self.policy == ConnectionPolicy::Persistent {
            self.connection = Some(connection);
        }
        Ok(())
    }
}

fn row_to_result_row(row: &Row) -> ResultRow
{
    let mut columns = BTreeMap::new();
    for (index, column) in row.columns_ref().iter().enumerate() {
        let value = row.as_ref(index).and_then(value_to_string);
        columns.insert(column.name_str().to_string(), value);
    }
    ResultRow { columns }
}

/// The textual representation of a column value, the way the mysql client would print it.
pub fn value_to_string(value: &Value) -> Option<String>
{
    match value {
        Value::NULL => None,
        Value::Bytes(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        Value::Int(number) => Some(number.to_string()),
        Value::UInt(number) => Some(number.to_string()),
        Value::Float(number) => Some(number.to_string()),
        Value::Double(number) => Some(number.to_string()),
        Value::Date(year, month, day, hour, minute, second, 0) => {
            Some(format!("{:04}-{:02}-{:02} {:02}:{:02}:{:02}", year, month, day, hour, minute, second))
        },
        Value::Date(year, month, day, hour, minute, second, micros) => {
            Some(format!("{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:06}", year, month, day, hour, minute, second, micros))
        },
        Value::Time(negative, days, hours, minutes, seconds, micros) => {
            let sign = if *negative { "-" } else { "" };
            let hours = days * 24 + u32::from(*hours);
            if *micros == 0 {
                Some(format!("{}{:02}:{:02}:{:02}", sign, hours, minutes, seconds))
            } else {
                Some(format!("{}{:02}:{:02}:{:02}.{:06}", sign, hours, minutes, seconds, micros))
            }
        },
    }
}

/// Collapse whitespace and drop a trailing semicolon, so formatting doesn't matter for lookups.
pub fn normalize_sql(sql: &str) -> String
{
    sql.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(';')
        .trim_end()
        .to_string()
}

impl StaticFrontend {
    pub fn new() -> Self {
        StaticFrontend {
            host: String::from("static"),
            ..Default::default()
        }
    }
    pub fn respond(&mut self, sql: &str, rows: Vec<ResultRow>) -> &mut Self {
        self.responses.insert(normalize_sql(sql), Ok(rows));
        self
    }
    pub fn fail(&mut self, sql: &str, message: &str) -> &mut Self {
        self.responses.insert(normalize_sql(sql), Err(message.to_string()));
        self
    }
}

impl Frontend for StaticFrontend {
    fn query(&mut self, sql: &str) -> Result<Vec<ResultRow>>
    {
        let sql = normalize_sql(sql);
        debug!("({}) execute: {}", self.host, sql);
        self.executed.push(sql.clone());
        match self.responses.get(&sql) {
            Some(Ok(rows)) => Ok(rows.clone()),
            Some(Err(message)) => Err(anyhow!("Error executing query: {}: {}", sql, message)),
            None => Err(anyhow!("No result set available for: {}", sql)),
        }
    }
    fn hostname_port(&self) -> String {
        self.host.clone()
    }
    fn host(&self) -> String {
        self.host.clone()
    }
    fn switch_host(&mut self, host: &str) -> Result<()> {
        self.host = host.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_result_row_accessors() {
        let row = ResultRow::from_pairs(&[("ReplicationNum", "3"), ("DataSize", " 12KB")])
            .with_null("RowCount");
        assert_eq!(row.get_i64("ReplicationNum"), Some(3));
        assert_eq!(row.get("DataSize"), Some(" 12KB"));
        assert_eq!(row.get("RowCount"), None);
        assert_eq!(row.get_string("RowCount"), "");
        assert_eq!(row.get_string("Missing"), "");
        assert_eq!(row.get_i64("DataSize"), None);
    }
    #[test]
    fn unit_result_row_serializes_as_map() {
        let row = ResultRow::from_pairs(&[("Host", "be-1")]).with_null("Alive");
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"Alive":null,"Host":"be-1"}"#);
    }
    #[test]
    fn unit_normalize_sql() {
        assert_eq!(normalize_sql("  SHOW PROC\n   '/dbs';  "), "SHOW PROC '/dbs'");
        assert_eq!(normalize_sql("select 1"), "select 1");
    }
    #[test]
    fn unit_value_to_string() {
        assert_eq!(value_to_string(&Value::NULL), None);
        assert_eq!(value_to_string(&Value::Bytes(b"LEADER".to_vec())), Some("LEADER".to_string()));
        assert_eq!(value_to_string(&Value::Int(-3)), Some("-3".to_string()));
        assert_eq!(value_to_string(&Value::UInt(10001)), Some("10001".to_string()));
        assert_eq!(value_to_string(&Value::Date(2024, 1, 2, 3, 4, 5, 0)), Some("2024-01-02 03:04:05".to_string()));
        assert_eq!(value_to_string(&Value::Time(true, 1, 2, 3, 4, 0)), Some("-26:03:04".to_string()));
    }
    #[test]
    fn unit_static_frontend_answers_and_records() {
        let mut frontend = StaticFrontend::new();
        frontend.respond("SHOW FRONTENDS", vec![ResultRow::from_pairs(&[("Role", "LEADER")])])
            .fail("SHOW RESOURCES", "access denied");

        assert!(frontend.query("show frontends").is_err(), "lookup is case sensitive");
        let rows = frontend.query("SHOW   FRONTENDS;").unwrap();
        assert_eq!(rows[0].get("Role"), Some("LEADER"));

        let error = frontend.query("SHOW RESOURCES").unwrap_err();
        assert!(format!("{:#}", error).contains("access denied"));

        assert_eq!(frontend.executed, vec!["show frontends", "SHOW FRONTENDS", "SHOW RESOURCES"]);
    }
}
