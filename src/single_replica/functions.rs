//! The impls and functions
//!
use std::{path::Path, time::Instant};
use log::*;
use colored::*;
use anyhow::{Context, Result};
use crate::frontend::{Frontend, ResultRow};
use crate::inventory::Tablet;
use crate::output::append_csv;
use crate::utility::qualified_table;
use crate::single_replica::{SingleReplicaCheck, SingleReplicaTable, TabletOnBackend};

pub const DEFAULT_OUTPUT_FILE: &str = "backend_tablets.csv";

pub const SINGLE_REPLICA_TABLES_SQL: &str = "SELECT DISTINCT pm.DB_NAME, pm.TABLE_NAME, pm.REPLICATION_NUM, t.TABLE_ID \
    FROM information_schema.partitions_meta pm \
    LEFT JOIN information_schema.tables_config t \
    ON pm.DB_NAME = t.TABLE_SCHEMA AND pm.TABLE_NAME = t.TABLE_NAME \
    WHERE pm.REPLICATION_NUM = 1 AND pm.REPLICATION_NUM IS NOT NULL";

pub fn count_rows_sql(database: &str, table: &str) -> String {
    format!("SELECT COUNT(1) AS row_count FROM {}", qualified_table(database, table))
}

impl SingleReplicaTable {
    pub fn read_single_replica_tables(
        frontend: &mut dyn Frontend,
    ) -> Result<Vec<SingleReplicaTable>>
    {
        let rows = frontend.query(SINGLE_REPLICA_TABLES_SQL)
            .with_context(|| "Failed to list the tables with replication number 1")?;
        Ok(SingleReplicaTable::parse_single_replica_tables(&rows))
    }
    fn parse_single_replica_tables(
        rows: &[ResultRow],
    ) -> Vec<SingleReplicaTable>
    {
        rows.iter()
            .map(|row| SingleReplicaTable {
                database: row.get_string("DB_NAME"),
                table_name: row.get_string("TABLE_NAME"),
                replication_num: row.get_i64("REPLICATION_NUM").unwrap_or(1),
                table_id: row.get("TABLE_ID").map(|table_id| table_id.to_string()),
            })
            .collect()
    }
}

/// A table is queryable when counting its rows returns a `row_count`.
pub fn is_queryable(
    frontend: &mut dyn Frontend,
    database: &str,
    table: &str,
) -> bool
{
    match frontend.query(&count_rows_sql(database, table)) {
        Ok(rows) => match rows.first().and_then(|row| row.get("row_count")) {
            Some(row_count) => {
                info!("{} is queryable, rows: {}", qualified_table(database, table), row_count);
                true
            },
            None => {
                warn!("{}: counting the rows returned no row_count", qualified_table(database, table));
                false
            },
        },
        Err(e) => {
            warn!("{} cannot be queried: {:#}", qualified_table(database, table), e);
            false
        },
    }
}

/// The tablets with a replica on the backend.
pub fn tablets_on_backend(
    tablets: &[Tablet],
    backend_id: &str,
) -> Vec<TabletOnBackend>
{
    tablets.iter()
        .filter(|tablet| tablet.backend_id == backend_id)
        .map(|tablet| TabletOnBackend { tablet_id: tablet.tablet_id.clone(), backend_id: tablet.backend_id.clone() })
        .collect()
}

/// Find the tablets of unqueryable single replica tables on the backend and append them to the csv file.
pub fn check_single_replica(
    frontend: &mut dyn Frontend,
    backend_id: &str,
    output_file: &Path,
) -> Result<SingleReplicaCheck>
{
    info!("begin single replica check for backend {}", backend_id);
    let timer = Instant::now();

    let backend_id = backend_id.trim();
    if backend_id.is_empty() {
        anyhow::bail!("A backend id is required (--backend-id)");
    }
    let tables = SingleReplicaTable::read_single_replica_tables(frontend)?;
    info!("found {} tables with replication number 1", tables.len());

    let mut singlereplicacheck = SingleReplicaCheck::default();
    for table in &tables {
        singlereplicacheck.tables_checked += 1;
        if is_queryable(frontend, &table.database, &table.table_name) {
            continue;
        }
        singlereplicacheck.tables_unqueryable += 1;
        let tablets = match Tablet::read_tablets(frontend, &table.database, &table.table_name) {
            Ok(tablets) => tablets,
            Err(e) => {
                warn!("{:#}", e);
                continue;
            },
        };
        let found = tablets_on_backend(&tablets, backend_id);
        if found.is_empty() {
            info!("{}: no tablets on backend {}", qualified_table(&table.database, &table.table_name), backend_id);
            continue;
        }
        append_csv(output_file, &found)?;
        info!("{}: saved {} tablets to {}", qualified_table(&table.database, &table.table_name), found.len(), output_file.display());
        singlereplicacheck.tablets.extend(found);
    }

    if singlereplicacheck.tablets.is_empty() {
        println!("No tablets found for backend {}", backend_id);
    } else {
        println!("{}", format!("Found {} tablets of unqueryable tables on backend {}, saved to {}",
            singlereplicacheck.tablets.len(),
            backend_id,
            output_file.display()).yellow());
    }

    info!("end single replica check: {:?}", timer.elapsed());
    Ok(singlereplicacheck)
}
