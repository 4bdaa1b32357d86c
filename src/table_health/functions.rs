//! The impls and functions
//!
use std::time::Instant;
use log::*;
use regex::Regex;
use crate::capacity;
use crate::frontend::Frontend;
use crate::inventory::{self, Inventory, Partition, Tablet};
use crate::table_health::{AllTableHealth, HealthTargets, PartitionSummary, RunMode, TableHealth, TabletStatistics};

impl RunMode {
    /// The number of tablet replicas a partition contributes.
    pub fn replica_count(&self, partition: &Partition) -> i64 {
        match self {
            RunMode::SharedNothing => partition.replication_num.saturating_mul(partition.buckets),
            RunMode::SharedData => partition.buckets,
        }
    }
}

impl PartitionSummary {
    pub fn new() -> Self { Default::default() }
    pub fn summarize(
        partitions: &[Partition],
        mode: RunMode,
        targets: HealthTargets,
    ) -> PartitionSummary
    {
        let mut summary = PartitionSummary::new();
        for partition in partitions {
            if partition.replication_num == targets.replica {
                summary.replica_partitions.push(partition.partition_name.clone());
            }
            if Some(partition.buckets) == targets.bucket {
                summary.bucket_partitions.push(partition.partition_name.clone());
            }
            if partition.data_size_bytes == 0.0 {
                summary.null_partitions.push(partition.partition_name.clone());
            } else {
                summary.total_data_size_bytes += partition.data_size_bytes;
            }
            summary.total_replica_count = summary.total_replica_count.saturating_add(mode.replica_count(partition));
        }
        summary
    }
}

impl TabletStatistics {
    /// Zero sized tablets are left out.
    /// The standard deviation divides by N-1 and is 0 with fewer than 2 tablets.
    pub fn from_sizes(
        sizes: &[f64],
    ) -> TabletStatistics
    {
        let sizes: Vec<f64> = sizes.iter().copied().filter(|size| *size > 0.0).collect();
        let tablets = sizes.len();
        if tablets == 0 {
            return TabletStatistics::default();
        }
        let mean = sizes.iter().sum::<f64>() / tablets as f64;
        let stddev = if tablets < 2 {
            0.0
        } else {
            let sum_of_squares: f64 = sizes.iter().map(|size| (size - mean).powi(2)).sum();
            (sum_of_squares / (tablets - 1) as f64).sqrt()
        };
        TabletStatistics { tablets, mean, stddev }
    }
}

/// Does the create statement declare the replication number?
pub fn schema_declares_replication(
    create_table: &str,
    replica: i64,
) -> bool
{
    Regex::new(&format!(r#"(?i)"replication_num"\s*=\s*"{}""#, replica))
        .map(|regex| regex.is_match(create_table))
        .unwrap_or(false)
}

fn megabytes(bytes: f64) -> f64
{
    capacity::round_hundredths(capacity::bytes_to_megabytes(bytes))
}

impl TableHealth {
    pub fn from_parts(
        database: &str,
        table: &str,
        partitions: &[Partition],
        tablets: &[Tablet],
        create_table: Option<&str>,
        mode: RunMode,
        targets: HealthTargets,
    ) -> TableHealth
    {
        let summary = PartitionSummary::summarize(partitions, mode, targets);
        let tablet_sizes: Vec<f64> = tablets.iter().map(|tablet| tablet.data_size_bytes).collect();
        let statistics = TabletStatistics::from_sizes(&tablet_sizes);

        TableHealth {
            database: database.to_string(),
            table: table.to_string(),
            total_data_size: megabytes(summary.total_data_size_bytes),
            total_replica_count: summary.total_replica_count,
            mean_tablet_size: megabytes(statistics.mean),
            tablet_size_stddev: megabytes(statistics.stddev),
            replica_partitions: summary.replica_partitions,
            bucket_partitions: summary.bucket_partitions,
            null_partitions: summary.null_partitions,
            schema_replication_match: create_table
                .map(|statement| schema_declares_replication(statement, targets.replica))
                .unwrap_or(false),
        }
    }
}

impl AllTableHealth {
    pub fn new() -> Self { Default::default() }
    /// Read partitions, create statement and tablets of every table in the inventory, sequentially.
    ///
    /// A failing query is logged and treated as an empty result.
    /// Tables without replicas (for example because the partitions could not be read) are left out.
    pub fn read_table_health(
        frontend: &mut dyn Frontend,
        inventory: &Inventory,
        mode: RunMode,
        targets: HealthTargets,
    ) -> AllTableHealth
    {
        info!("begin table health, mode: {:?}, targets: {:?}", mode, targets);
        let timer = Instant::now();

        let mut alltablehealth = AllTableHealth::new();
        let databases = inventory.databases();
        for (number, database) in databases.iter().enumerate() {
            info!("In progress............{}/{} {}", number + 1, databases.len(), database);
            for table in inventory.tables.iter().filter(|table| table.database == *database) {
                let partitions = Partition::read_partitions(frontend, &table.database, &table.table_name)
                    .unwrap_or_else(|e| {
                        warn!("{:#}", e);
                        Vec::new()
                    });
                if PartitionSummary::summarize(&partitions, mode, targets).total_replica_count == 0 {
                    debug!("{}.{}: no replicas, skipping", table.database, table.table_name);
                    continue;
                }
                let create_table = inventory::read_create_table(frontend, &table.database, &table.table_name)
                    .map_err(|e| warn!("{:#}", e))
                    .ok();
                let tablets = Tablet::read_tablets(frontend, &table.database, &table.table_name)
                    .unwrap_or_else(|e| {
                        warn!("{:#}", e);
                        Vec::new()
                    });
                alltablehealth.table_health.push(TableHealth::from_parts(
                    &table.database,
                    &table.table_name,
                    &partitions,
                    &tablets,
                    create_table.as_deref(),
                    mode,
                    targets,
                ));
            }
        }

        info!("end table health: {} tables, {:?}", alltablehealth.table_health.len(), timer.elapsed());
        alltablehealth
    }
}
