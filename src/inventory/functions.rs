//! The impls and functions
//!
use std::time::Instant;
use log::*;
use colored::*;
use anyhow::{Context, Result};
use itertools::Itertools;
use crate::capacity;
use crate::frontend::{Frontend, ResultRow};
use crate::inventory::{AllDatabases, Database, Inventory, Partition, Table, Tablet, INTERNAL_DATABASES};
use crate::utility;

pub const DATABASES_SQL: &str = "SHOW PROC '/dbs'";

pub fn tables_sql(db_id: &str) -> String {
    format!("SHOW PROC '/dbs/{}'", db_id)
}
pub fn partitions_sql(database: &str, table: &str) -> String {
    format!("SHOW PARTITIONS FROM {}", utility::qualified_table(database, table))
}
pub fn tablets_sql(database: &str, table: &str) -> String {
    format!("SHOW TABLET FROM {}", utility::qualified_table(database, table))
}
pub fn create_table_sql(database: &str, table: &str) -> String {
    format!("SHOW CREATE TABLE {}", utility::qualified_table(database, table))
}

impl AllDatabases {
    pub fn new() -> Self { Default::default() }
    pub fn read_databases(
        frontend: &mut dyn Frontend,
    ) -> Result<AllDatabases>
    {
        let rows = frontend.query(DATABASES_SQL)
            .with_context(|| "Unable to list the databases")?;
        Ok(AllDatabases::parse_databases(rows))
    }
    fn parse_databases(
        rows: Vec<ResultRow>,
    ) -> AllDatabases
    {
        let mut alldatabases = AllDatabases::new();
        for row in rows {
            let db_name = row.get_string("DbName");
            // older versions prefix the name with the cluster name: 'default_cluster:sales'.
            let db_name = match db_name.split_once(':') {
                Some((_cluster, name)) => name.to_string(),
                None => db_name,
            };
            if db_name.is_empty() || INTERNAL_DATABASES.contains(&db_name.as_str()) {
                continue;
            }
            alldatabases.databases.push(Database { db_id: row.get_string("DbId"), db_name });
        }
        alldatabases
    }
    /// The databases to inspect: all of them if `wanted` is empty.
    /// Wanted databases that do not exist or are internal are reported and skipped.
    pub fn select(
        &self,
        wanted: &[String],
    ) -> Vec<&Database>
    {
        if wanted.is_empty() {
            return self.databases.iter().collect();
        }
        let mut selected = Vec::new();
        for name in wanted {
            match self.databases.iter().find(|database| &database.db_name == name) {
                Some(database) => selected.push(database),
                None => {
                    warn!("database {} not found", name);
                    eprintln!("{}", format!("The database {} was not found, skipping it.", name).red());
                },
            }
        }
        selected
    }
}

impl Table {
    pub fn read_tables(
        frontend: &mut dyn Frontend,
        database: &Database,
    ) -> Result<Vec<Table>>
    {
        let rows = frontend.query(&tables_sql(&database.db_id))
            .with_context(|| format!("Unable to list the tables of database: {}", database.db_name))?;
        Ok(Table::parse_tables(rows, &database.db_name))
    }
    fn parse_tables(
        rows: Vec<ResultRow>,
        database: &str,
    ) -> Vec<Table>
    {
        rows.iter()
            .filter(|row| row.get("Type") == Some("OLAP"))
            .filter(|row| !row.get_string("TableName").is_empty())
            .map(|row| Table {
                database: database.to_string(),
                table_name: row.get_string("TableName"),
                table_id: row.get_string("TableId"),
            })
            .collect()
    }
}

impl Inventory {
    pub fn new() -> Self { Default::default() }
    /// List the OLAP tables of the wanted databases (all if empty).
    ///
    /// Not being able to list the databases is an error;
    /// not being able to list the tables of a database skips that database.
    pub fn read_inventory(
        frontend: &mut dyn Frontend,
        wanted: &[String],
    ) -> Result<Inventory>
    {
        info!("begin inventory");
        let timer = Instant::now();

        let alldatabases = AllDatabases::read_databases(frontend)?;
        let mut inventory = Inventory::new();
        for database in alldatabases.select(wanted) {
            match Table::read_tables(frontend, database) {
                Ok(tables) => inventory.tables.extend(tables),
                Err(e) => warn!("{:#}", e),
            }
        }

        info!("end inventory: {} tables, {:?}", inventory.tables.len(), timer.elapsed());
        Ok(inventory)
    }
    /// The distinct databases that have tables, in inventory order.
    pub fn databases(&self) -> Vec<&str> {
        self.tables.iter()
            .map(|table| table.database.as_str())
            .unique()
            .collect()
    }
}

impl Partition {
    pub fn read_partitions(
        frontend: &mut dyn Frontend,
        database: &str,
        table: &str,
    ) -> Result<Vec<Partition>>
    {
        let rows = frontend.query(&partitions_sql(database, table))
            .with_context(|| format!("Failed to get partitions of {}.{}", database, table))?;
        Ok(Partition::parse_partitions(rows))
    }
    pub fn parse_partitions(
        rows: Vec<ResultRow>,
    ) -> Vec<Partition>
    {
        rows.iter()
            .map(|row| {
                let data_size = row.get_string("DataSize");
                Partition {
                    partition_id: row.get_string("PartitionId"),
                    partition_name: row.get_string("PartitionName"),
                    replication_num: row.get_i64("ReplicationNum").unwrap_or_default(),
                    buckets: row.get_i64("Buckets").unwrap_or_default(),
                    data_size_bytes: capacity::parse_size(&data_size),
                    data_size,
                }
            })
            .collect()
    }
}

impl Tablet {
    pub fn read_tablets(
        frontend: &mut dyn Frontend,
        database: &str,
        table: &str,
    ) -> Result<Vec<Tablet>>
    {
        let rows = frontend.query(&tablets_sql(database, table))
            .with_context(|| format!("Failed to get tablets of {}.{}", database, table))?;
        Ok(Tablet::parse_tablets(rows))
    }
    pub fn parse_tablets(
        rows: Vec<ResultRow>,
    ) -> Vec<Tablet>
    {
        rows.iter()
            .map(|row| {
                let data_size = row.get_string("DataSize");
                Tablet {
                    tablet_id: row.get_string("TabletId"),
                    backend_id: row.get_string("BackendId"),
                    data_size_bytes: capacity::parse_size(&data_size),
                    data_size,
                    row_count: row.get_i64("RowCount").unwrap_or_default(),
                }
            })
            .collect()
    }
}

/// The `CREATE TABLE` statement of a table.
pub fn read_create_table(
    frontend: &mut dyn Frontend,
    database: &str,
    table: &str,
) -> Result<String>
{
    let rows = frontend.query(&create_table_sql(database, table))
        .with_context(|| format!("Failed to get the schema of {}.{}", database, table))?;
    rows.first()
        .and_then(|row| row.get("Create Table").or_else(|| row.get("Create View")))
        .map(|statement| statement.to_string())
        .with_context(|| format!("No create statement returned for {}.{}", database, table))
}
