//! The impls and functions
//!
use std::{path::PathBuf, time::Instant};
use log::*;
use colored::*;
use anyhow::{Context, Result};
use comfy_table::{presets, ContentArrangement, Table};
use serde::Serialize;
use crate::frontend::Frontend;
use crate::inventory::Inventory;
use crate::output::OutputDirectory;
use crate::report::{HealthReportSettings, OutputFormat, PartitionRow, ReportFiles, ReportModule, ReportSection, TabularRow};
use crate::table_health::{AllTableHealth, HealthTargets, TableHealth};

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Table => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }
}

impl TabularRow for TableHealth {
    fn cells(&self) -> Vec<String> {
        vec![
            self.database.clone(),
            self.table.clone(),
            format!("{:.2}", self.total_data_size),
            self.total_replica_count.to_string(),
            format!("{:.2}", self.mean_tablet_size),
            format!("{:.2}", self.tablet_size_stddev),
        ]
    }
}

impl TabularRow for PartitionRow {
    fn cells(&self) -> Vec<String> {
        let table_name = match &self.annotation {
            Some(annotation) => format!("{}{}", self.table_name, annotation),
            None => self.table_name.clone(),
        };
        vec![self.database_name.clone(), table_name, self.partition_name.clone()]
    }
}

impl<T: Serialize + TabularRow> ReportSection<T> {
    pub fn render(
        &self,
        format: OutputFormat,
    ) -> Result<String>
    {
        match format {
            OutputFormat::Table => Ok(self.render_table()),
            OutputFormat::Json => serde_json::to_string_pretty(&self.rows)
                .with_context(|| format!("Json serialization error for: {}", self.name)),
            OutputFormat::Yaml => serde_yml::to_string(&self.rows)
                .with_context(|| format!("Yaml serialization error for: {}", self.name)),
        }
    }
    fn render_table(&self) -> String
    {
        let mut table = Table::new();
        table
            .load_preset(presets::ASCII_FULL)
            .set_content_arrangement(ContentArrangement::Disabled)
            .set_header(self.headers.clone());
        for row in &self.rows {
            table.add_row(row.cells());
        }
        table.to_string()
    }
    /// Save the section, and print it if it's a text table.
    pub fn write(
        &self,
        format: OutputFormat,
        output: &OutputDirectory,
    ) -> Result<PathBuf>
    {
        let content = self.render(format)?;
        if format == OutputFormat::Table {
            println!("*********************** {} ***********************", self.title);
            println!("{}", content);
        }
        output.save_text(self.name, format.extension(), &content)
    }
}

/// Sort on replica count, database and table, descending.
pub fn sort_by_replica_count(tables: &mut [TableHealth])
{
    tables.sort_by(|a, b| {
        (b.total_replica_count, &b.database, &b.table).cmp(&(a.total_replica_count, &a.database, &a.table))
    });
}

/// Sort on database and table, descending.
pub fn sort_by_name(tables: &mut [TableHealth])
{
    tables.sort_by(|a, b| (&b.database, &b.table).cmp(&(&a.database, &a.table)));
}

/// One row per selected partition; tables without selected partitions produce no rows.
fn partition_rows<F>(
    tables: &[TableHealth],
    select: F,
    annotation: Option<&dyn Fn(&TableHealth) -> Option<String>>,
) -> Vec<PartitionRow>
where
    F: Fn(&TableHealth) -> &Vec<String>,
{
    let mut tables = tables.to_vec();
    sort_by_name(&mut tables);
    let mut rows = Vec::new();
    for table in &tables {
        let partitions = select(table);
        if partitions.is_empty() {
            continue;
        }
        let annotation = annotation.and_then(|annotate| annotate(table));
        for partition in partitions {
            rows.push(PartitionRow {
                database_name: table.database.clone(),
                table_name: table.table.clone(),
                partition_name: partition.clone(),
                annotation: annotation.clone(),
            });
        }
    }
    rows
}

impl AllTableHealth {
    pub fn health_section(&self) -> ReportSection<TableHealth>
    {
        let mut rows = self.table_health.clone();
        sort_by_replica_count(&mut rows);
        ReportSection {
            name: "health_report",
            title: "The Tables of all databases".to_string(),
            headers: vec![
                "database_name".to_string(),
                "table_name".to_string(),
                "datasize of table(/MB)".to_string(),
                "replica_counts".to_string(),
                "avg of tablet datasize(/MB)".to_string(),
                "standard deviation of tablet datasize(/MB)".to_string(),
            ],
            rows,
        }
    }
    pub fn replica_section(&self, replica: i64) -> ReportSection<PartitionRow>
    {
        let annotate = move |table: &TableHealth| -> Option<String> {
            table.schema_replication_match.then(|| format!("(schema is {} replica)", replica))
        };
        let annotate: &dyn Fn(&TableHealth) -> Option<String> = &annotate;
        ReportSection {
            name: "replica_partitions",
            title: format!("The Tables of {} Replicas", replica),
            headers: vec!["database_name".to_string(), "table_name".to_string(), format!("partition of {} replica", replica)],
            rows: partition_rows(&self.table_health, |table| &table.replica_partitions, Some(annotate)),
        }
    }
    pub fn bucket_section(&self, bucket: i64) -> ReportSection<PartitionRow>
    {
        ReportSection {
            name: "bucket_partitions",
            title: format!("The Tables of {} Buckets", bucket),
            headers: vec!["database_name".to_string(), "table_name".to_string(), format!("partition of {} bucket", bucket)],
            rows: partition_rows(&self.table_health, |table| &table.bucket_partitions, None),
        }
    }
    pub fn null_partition_section(&self) -> ReportSection<PartitionRow>
    {
        ReportSection {
            name: "null_partitions",
            title: "The Partitions without data".to_string(),
            headers: vec!["database_name".to_string(), "table_name".to_string(), "partition without data".to_string()],
            rows: partition_rows(&self.table_health, |table| &table.null_partitions, None),
        }
    }
    /// Write the sections the module asks for.
    pub fn write_report(
        &self,
        module: ReportModule,
        format: OutputFormat,
        targets: HealthTargets,
        output: &OutputDirectory,
    ) -> Result<ReportFiles>
    {
        let mut reportfiles = ReportFiles::default();
        if matches!(module, ReportModule::All | ReportModule::Tablets) {
            reportfiles.files.push(self.health_section().write(format, output)?);
        }
        if matches!(module, ReportModule::All | ReportModule::Replicas) {
            reportfiles.files.push(self.replica_section(targets.replica).write(format, output)?);
        }
        match (module, targets.bucket) {
            (ReportModule::All | ReportModule::Buckets, Some(bucket)) => {
                reportfiles.files.push(self.bucket_section(bucket).write(format, output)?);
            },
            (ReportModule::Buckets, None) => {
                anyhow::bail!("The buckets module requires a bucket target (--bucket)");
            },
            _ => {},
        }
        if matches!(module, ReportModule::All | ReportModule::Partitions) {
            let section = self.null_partition_section();
            if !section.rows.is_empty() {
                eprintln!("{}", format!("Found {} partitions without data.", section.rows.len()).yellow());
            }
            reportfiles.files.push(section.write(format, output)?);
        }
        Ok(reportfiles)
    }
}

/// Inventory, aggregate and write the health report.
pub fn health_report(
    frontend: &mut dyn Frontend,
    settings: &HealthReportSettings,
    output: &OutputDirectory,
) -> Result<ReportFiles>
{
    info!("begin health report");
    let timer = Instant::now();

    if settings.module == ReportModule::Buckets && settings.targets.bucket.is_none() {
        anyhow::bail!("The buckets module requires a bucket target (--bucket)");
    }
    let inventory = Inventory::read_inventory(frontend, &settings.databases)?;
    let alltablehealth = AllTableHealth::read_table_health(frontend, &inventory, settings.mode, settings.targets);
    let reportfiles = alltablehealth.write_report(settings.module, settings.format, settings.targets, output)?;

    info!("end health report: {:?}", timer.elapsed());
    Ok(reportfiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn health(database: &str, table: &str, total_replica_count: i64) -> TableHealth {
        TableHealth {
            database: database.to_string(),
            table: table.to_string(),
            total_replica_count,
            ..Default::default()
        }
    }
    fn names(tables: &[TableHealth]) -> Vec<String> {
        tables.iter().map(|table| format!("{}.{}", table.database, table.table)).collect()
    }

    #[test]
    fn unit_sort_by_replica_count_descending() {
        let mut tables = vec![health("a", "x", 10), health("b", "y", 30), health("a", "z", 30), health("c", "w", 10)];
        sort_by_replica_count(&mut tables);
        assert_eq!(names(&tables), vec!["b.y", "a.z", "c.w", "a.x"]);
    }
    #[test]
    fn unit_sort_by_name_descending() {
        let mut tables = vec![health("a", "x", 10), health("b", "y", 30), health("a", "z", 1)];
        sort_by_name(&mut tables);
        assert_eq!(names(&tables), vec!["b.y", "a.z", "a.x"]);
    }
    #[test]
    fn unit_sort_is_stable_for_equal_keys() {
        let mut first = health("a", "x", 10);
        first.null_partitions = vec!["first".to_string()];
        let second = health("a", "x", 10);
        let mut tables = vec![first, second];
        sort_by_replica_count(&mut tables);
        assert_eq!(tables[0].null_partitions, vec!["first"]);
    }
    #[test]
    fn unit_replica_section_rows() {
        let mut orders = health("sales", "orders", 12);
        orders.replica_partitions = vec!["p1".to_string(), "p2".to_string()];
        orders.schema_replication_match = true;
        let mut events = health("ods", "events", 3);
        events.replica_partitions = vec!["p9".to_string()];
        let clean = health("sales", "customers", 3);
        let alltablehealth = AllTableHealth { table_health: vec![events, clean, orders] };

        let section = alltablehealth.replica_section(1);
        assert_eq!(section.rows.len(), 3);
        assert_eq!(section.rows[0].database_name, "sales");
        assert_eq!(section.rows[0].partition_name, "p1");
        assert_eq!(section.rows[0].cells()[1], "orders(schema is 1 replica)");
        assert_eq!(section.rows[2].cells(), vec!["ods", "events", "p9"]);
        assert_eq!(section.headers[2], "partition of 1 replica");
    }
    #[test]
    fn unit_render_formats() {
        let mut orders = health("sales", "orders", 12);
        orders.total_data_size = 1536.0;
        let alltablehealth = AllTableHealth { table_health: vec![orders] };
        let section = alltablehealth.health_section();

        let table = section.render(OutputFormat::Table).unwrap();
        assert!(table.contains("replica_counts"));
        assert!(table.contains("1536.00"));

        let json: serde_json::Value = serde_json::from_str(&section.render(OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json[0]["total_replica_count"], 12);

        let yaml = section.render(OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("table: orders"));
    }
    #[test]
    fn unit_buckets_module_needs_target() {
        let directory = tempfile::tempdir().unwrap();
        let output = OutputDirectory::with_timestamp(directory.path(), "20240102_030405").unwrap();
        let alltablehealth = AllTableHealth::new();
        let targets = HealthTargets { replica: 1, bucket: None };
        assert!(alltablehealth.write_report(ReportModule::Buckets, OutputFormat::Json, targets, &output).is_err());

        let reportfiles = alltablehealth.write_report(ReportModule::All, OutputFormat::Json, targets, &output).unwrap();
        assert_eq!(reportfiles.files.len(), 3);
    }
}
