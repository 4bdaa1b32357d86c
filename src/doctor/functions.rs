//! The impls and functions
//!
use std::{collections::{BTreeMap, BTreeSet}, fs, path::{Path, PathBuf}, time::Instant};
use log::*;
use colored::*;
use anyhow::{Context, Result};
use crate::capacity;
use crate::frontend::{Frontend, ResultRow};
use crate::inventory::{partitions_sql, read_create_table, tablets_sql, INTERNAL_DATABASES};
use crate::output::OutputDirectory;
use crate::utility::{qualified_table, quote_literal};
use crate::doctor::{
    AllConfigs,
    BackendConfigs,
    BackendStackTrace,
    ClusterState,
    Dependencies,
    DependentObject,
    DoctorModule,
    DoctorSettings,
    FrontendConfig,
    MaterializedViewInfo,
    MaterializedViews,
    ModifiedConfig,
    ModifiedSessionVariable,
    NestedMaterializedView,
    PartitionMeta,
    PerformanceDiagnostics,
    QueryDump,
    SchemaInfo,
    TableInfo,
    TabletMetadata,
};

pub const FRONTENDS_SQL: &str = "SHOW FRONTENDS";
pub const BACKENDS_SQL: &str = "SHOW PROC '/backends'";
pub const FRONTENDS_PROC_SQL: &str = "SHOW PROC '/frontends'";
pub const RESOURCES_SQL: &str = "SHOW RESOURCES";
pub const VERSION_SQL: &str = "SELECT current_version()";
pub const SESSION_VARIABLES_SQL: &str = "SELECT VARIABLE_NAME, VARIABLE_VALUE, IS_CHANGED FROM information_schema.verbose_session_variables";
pub const BE_CONFIGS_SQL: &str = "SELECT BE_ID, NAME, VALUE, `DEFAULT` FROM information_schema.be_configs";
pub const FE_CONFIG_SQL: &str = "ADMIN SHOW FRONTEND CONFIG";
pub const CURRENT_QUERIES_SQL: &str = "SHOW PROC '/current_queries'";
pub const PROCESSLIST_SQL: &str = "SHOW PROCESSLIST";
pub const DEFAULT_QUERY_LIMIT: usize = 100;

pub fn schema_tables_sql(table_name: Option<&str>) -> String {
    let mut sql = String::from(
        "SELECT t.TABLE_SCHEMA, t.TABLE_NAME, t.TABLE_TYPE, c.TABLE_ID \
         FROM information_schema.tables t \
         LEFT JOIN information_schema.tables_config c \
         ON t.TABLE_SCHEMA = c.TABLE_SCHEMA AND t.TABLE_NAME = c.TABLE_NAME \
         WHERE t.TABLE_TYPE = 'BASE TABLE'"
    );
    if let Some(table_name) = table_name {
        sql.push_str(&format!(" AND t.TABLE_NAME = {}", quote_literal(table_name)));
    }
    sql
}
pub fn partitions_meta_sql(database: &str, table: &str) -> String {
    format!(
        "SELECT PARTITION_NAME, DATA_SIZE, ROW_COUNT FROM information_schema.partitions_meta WHERE DB_NAME = {} AND TABLE_NAME = {}",
        quote_literal(database),
        quote_literal(table),
    )
}
pub fn row_count_sql(database: &str, table: &str) -> String {
    format!("SELECT COUNT(*) AS count FROM {}", qualified_table(database, table))
}
fn numeric_id<'a>(kind: &str, id: &'a str) -> Result<&'a str> {
    let id = id.trim();
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
        anyhow::bail!("Invalid {} id: '{}', a {} id is numeric", kind, id, kind);
    }
    Ok(id)
}
pub fn show_tablet_sql(tablet_id: &str) -> Result<String> {
    Ok(format!("SHOW TABLET {}", numeric_id("tablet", tablet_id)?))
}
pub fn materialized_views_sql(view_name: Option<&str>) -> String {
    let mut sql = String::from(
        "SELECT TABLE_SCHEMA, TABLE_NAME, MATERIALIZED_VIEW_DEFINITION, TASK_NAME \
         FROM information_schema.materialized_views"
    );
    if let Some(view_name) = view_name {
        sql.push_str(&format!(" WHERE TABLE_NAME = {}", quote_literal(view_name)));
    }
    sql
}
pub fn latest_task_run_sql(task_name: &str) -> String {
    format!(
        "SELECT QUERY_ID, DATE_FORMAT(FINISH_TIME, '%Y-%m-%d %H:%i:%s') AS FINISH_TIME, State, ERROR_MESSAGE \
         FROM information_schema.task_runs WHERE TASK_NAME = {} ORDER BY FINISH_TIME DESC LIMIT 1",
        quote_literal(task_name),
    )
}
pub fn object_dependencies_sql(database: &str, name: &str) -> String {
    format!(
        "SELECT ref_object_database, ref_object_name, ref_object_type FROM sys.object_dependencies \
         WHERE object_database = {} AND object_name = {} AND object_type = 'MATERIALIZED_VIEW'",
        quote_literal(database),
        quote_literal(name),
    )
}
pub fn audit_queries_sql(fe_host: &str, limit: usize) -> String {
    format!(
        "SELECT queryId, timestamp, user, state, queryTime, scanBytes, scanRows, returnRows, cpuCostNs, memCostBytes, {} AS fe_host \
         FROM starrocks_audit_db__.starrocks_audit_tbl__ ORDER BY timestamp DESC LIMIT {}",
        quote_literal(fe_host),
        limit,
    )
}
pub fn query_dump_sql(statement: &str) -> String {
    format!("SELECT get_query_dump({}) AS get_query_dump", quote_literal(statement))
}
pub fn be_stack_sql(be_id: &str) -> Result<String> {
    Ok(format!(
        "ADMIN EXECUTE ON {} 'System.print(ExecEnv.get_stack_trace_for_all_threads())'",
        numeric_id("backend", be_id)?,
    ))
}

/// The address of the leader frontend, taken from the `IP` column (`Host` for newer versions).
pub fn read_leader_frontend(
    frontend: &mut dyn Frontend,
) -> Result<String>
{
    let rows = frontend.query(FRONTENDS_SQL)
        .with_context(|| "Failed to list the frontends")?;
    rows.iter()
        .find(|row| row.get("Role") == Some("LEADER"))
        .and_then(|row| row.get("IP").or_else(|| row.get("Host")))
        .map(|host| host.to_string())
        .with_context(|| "Could not find the leader frontend")
}

/// Move the connection to the leader frontend.
pub fn switch_to_leader(
    frontend: &mut dyn Frontend,
) -> Result<()>
{
    let leader = read_leader_frontend(frontend)?;
    info!("switching from {} to leader frontend {}", frontend.hostname_port(), leader);
    frontend.switch_host(&leader)
}

impl ClusterState {
    pub fn read_cluster_state(
        frontend: &mut dyn Frontend,
    ) -> Result<ClusterState>
    {
        let backends = frontend.query(BACKENDS_SQL)
            .with_context(|| "Failed to get the backends")?;
        let frontends = frontend.query(FRONTENDS_PROC_SQL)
            .with_context(|| "Failed to get the frontends")?;
        let resources = frontend.query(RESOURCES_SQL)
            .unwrap_or_else(|e| {
                warn!("unable to get resources: {:#}", e);
                Vec::new()
            });
        let version = frontend.query(VERSION_SQL)
            .with_context(|| "Failed to get the version")?
            .first()
            .map(|row| row.get_string("current_version()"))
            .unwrap_or_default();
        Ok(ClusterState { backends, frontends, resources, version })
    }
}

/// Backend host to backend id.
pub fn read_backend_mapping(
    frontend: &mut dyn Frontend,
) -> Result<BTreeMap<String, String>>
{
    let rows = frontend.query(BACKENDS_SQL)
        .with_context(|| "Failed to get the backends")?;
    Ok(parse_backend_mapping(&rows))
}
fn parse_backend_mapping(
    rows: &[ResultRow],
) -> BTreeMap<String, String>
{
    rows.iter()
        .filter_map(|row| {
            match (row.get("Host").or_else(|| row.get("IP")), row.get("BackendId")) {
                (Some(host), Some(backend_id)) if !host.is_empty() && !backend_id.is_empty() => Some((host.to_string(), backend_id.to_string())),
                _ => None,
            }
        })
        .collect()
}

pub fn read_modified_session_variables(
    frontend: &mut dyn Frontend,
) -> Result<BTreeMap<String, ModifiedSessionVariable>>
{
    let rows = frontend.query(SESSION_VARIABLES_SQL)
        .with_context(|| "Failed to get the session variables")?;
    Ok(rows.iter()
        .filter(|row| matches!(row.get("IS_CHANGED").map(|changed| changed.to_uppercase()).as_deref(), Some("TRUE") | Some("1")))
        .map(|row| {
            (
                row.get_string("VARIABLE_NAME"),
                ModifiedSessionVariable { current_value: row.get_string("VARIABLE_VALUE"), is_modified: true },
            )
        })
        .collect())
}

pub fn read_modified_be_configs(
    frontend: &mut dyn Frontend,
) -> Result<BackendConfigs>
{
    let hosts: BTreeMap<String, String> = read_backend_mapping(frontend)?
        .into_iter()
        .map(|(host, backend_id)| (backend_id, host))
        .collect();
    let rows = frontend.query(BE_CONFIGS_SQL)
        .with_context(|| "Failed to get the backend configurations")?;

    let mut be_configs = BackendConfigs::new();
    for row in rows.iter().filter(|row| row.get("VALUE") != row.get("DEFAULT")) {
        let backend_id = row.get_string("BE_ID");
        let Some(host) = hosts.get(&backend_id) else {
            debug!("backend id {} not in the backend list, skipping {}", backend_id, row.get_string("NAME"));
            continue;
        };
        be_configs.entry(host.clone())
            .or_default()
            .insert(
                row.get_string("NAME"),
                ModifiedConfig { current_value: row.get_string("VALUE"), default_value: row.get_string("DEFAULT") },
            );
    }
    Ok(be_configs)
}

pub fn read_fe_configs(
    frontend: &mut dyn Frontend,
) -> Result<BTreeMap<String, FrontendConfig>>
{
    let rows = frontend.query(FE_CONFIG_SQL)
        .with_context(|| "Failed to get the frontend configuration")?;
    Ok(rows.iter()
        .map(|row| (row.get_string("Key"), FrontendConfig { value: row.get_string("Value") }))
        .collect())
}

impl AllConfigs {
    pub fn new() -> Self { Default::default() }
    /// Every part that fails is logged and left empty.
    pub fn read_all_configs(
        frontend: &mut dyn Frontend,
    ) -> AllConfigs
    {
        let mut allconfigs = AllConfigs::new();
        match read_fe_configs(frontend) {
            Ok(fe_configs) => allconfigs.fe_configs = fe_configs,
            Err(e) => warn!("{:#}", e),
        }
        match read_modified_be_configs(frontend) {
            Ok(be_configs) => allconfigs.be_configs = be_configs,
            Err(e) => warn!("{:#}", e),
        }
        match read_modified_session_variables(frontend) {
            Ok(session_vars) => allconfigs.session_vars = session_vars,
            Err(e) => warn!("{:#}", e),
        }
        allconfigs
    }
}

impl TableInfo {
    pub fn read_table_info(
        frontend: &mut dyn Frontend,
        database: &str,
        table: &str,
        table_id: Option<String>,
    ) -> TableInfo
    {
        let mut tableinfo = TableInfo { table_id, ..Default::default() };
        match read_create_table(frontend, database, table) {
            Ok(statement) => tableinfo.create_table = Some(statement),
            Err(e) => warn!("{:#}", e),
        }
        match read_partitions_meta(frontend, database, table) {
            Ok(partitions) => {
                (tableinfo.total_data_size_mb, tableinfo.total_row_count) = partition_totals(&partitions);
                tableinfo.partitions = partitions;
            },
            Err(e) => {
                warn!("partitions_meta not available for {}, falling back to SHOW PARTITIONS: {:#}", qualified_table(database, table), e);
                let partitions = read_show_partitions(frontend, database, table);
                (tableinfo.total_data_size_mb, tableinfo.total_row_count) = partition_totals(&partitions);
                tableinfo.partitions = partitions;
                match frontend.query(&tablets_sql(database, table)) {
                    Ok(tablets) => tableinfo.tablets = tablets,
                    Err(e) => warn!("{:#}", e),
                }
                match read_row_count(frontend, database, table) {
                    Ok(row_count) => tableinfo.total_row_count = row_count,
                    Err(e) => warn!("{:#}", e),
                }
            },
        }
        tableinfo
    }
}

fn read_partitions_meta(
    frontend: &mut dyn Frontend,
    database: &str,
    table: &str,
) -> Result<Vec<PartitionMeta>>
{
    let rows = frontend.query(&partitions_meta_sql(database, table))?;
    Ok(rows.iter()
        .map(|row| partition_meta(row, "PARTITION_NAME", "DATA_SIZE", "ROW_COUNT"))
        .collect())
}

/// Failures are logged and give no partitions.
fn read_show_partitions(
    frontend: &mut dyn Frontend,
    database: &str,
    table: &str,
) -> Vec<PartitionMeta>
{
    match frontend.query(&partitions_sql(database, table)) {
        Ok(rows) => rows.iter()
            .map(|row| partition_meta(row, "PartitionName", "DataSize", "RowCount"))
            .collect(),
        Err(e) => {
            warn!("{:#}", e);
            Vec::new()
        },
    }
}

fn read_row_count(
    frontend: &mut dyn Frontend,
    database: &str,
    table: &str,
) -> Result<i64>
{
    frontend.query(&row_count_sql(database, table))
        .with_context(|| format!("Failed to count the rows of {}", qualified_table(database, table)))?
        .first()
        .and_then(|row| row.get_i64("count"))
        .with_context(|| format!("No row count returned for {}", qualified_table(database, table)))
}

/// Total size in MB and total row count.
fn partition_totals(
    partitions: &[PartitionMeta],
) -> (f64, i64)
{
    (
        capacity::round_hundredths(partitions.iter().filter_map(|partition| partition.data_size_mb).sum()),
        partitions.iter().filter_map(|partition| partition.row_count).fold(0_i64, |total, row_count| total.saturating_add(row_count)),
    )
}

fn partition_meta(
    row: &ResultRow,
    name_column: &str,
    size_column: &str,
    rows_column: &str,
) -> PartitionMeta
{
    let data_size = row.get(size_column)
        .filter(|size| !size.trim().is_empty())
        .map(|size| size.to_string());
    PartitionMeta {
        partition_name: row.get_string(name_column),
        data_size_mb: data_size.as_deref().map(|size| capacity::round_hundredths(capacity::bytes_to_megabytes(capacity::parse_size(size)))),
        data_size,
        row_count: row.get_i64(rows_column),
    }
}

/// The tables, their create statement and partition sizes, grouped by database.
pub fn read_schema_info(
    frontend: &mut dyn Frontend,
    table_name: Option<&str>,
) -> Result<SchemaInfo>
{
    info!("begin schema info");
    let timer = Instant::now();

    let rows = frontend.query(&schema_tables_sql(table_name))
        .with_context(|| "Failed to list the tables")?;
    let mut schemainfo = SchemaInfo::new();
    for row in rows {
        let database = row.get_string("TABLE_SCHEMA");
        if INTERNAL_DATABASES.contains(&database.as_str()) {
            continue;
        }
        let table = row.get_string("TABLE_NAME");
        let tableinfo = TableInfo::read_table_info(frontend, &database, &table, row.get("TABLE_ID").map(|id| id.to_string()));
        schemainfo.entry(database).or_default().insert(table, tableinfo);
    }

    info!("end schema info: {:?}", timer.elapsed());
    Ok(schemainfo)
}

impl TabletMetadata {
    /// Read the tablet, then run the detail command it returns to get its replicas.
    pub fn read_tablet_metadata(
        frontend: &mut dyn Frontend,
        tablet_id: &str,
    ) -> Result<TabletMetadata>
    {
        let rows = frontend.query(&show_tablet_sql(tablet_id)?)
            .with_context(|| format!("Failed to get tablet {}", tablet_id))?;
        let tablet = rows.into_iter()
            .next()
            .with_context(|| format!("No information found for tablet {}", tablet_id))?;
        let detail_command = tablet.get("DetailCmd")
            .filter(|command| !command.trim().is_empty())
            .map(|command| command.to_string())
            .with_context(|| format!("No DetailCmd found for tablet {}", tablet_id))?;
        let replicas = frontend.query(&detail_command)
            .with_context(|| format!("Failed to get the replicas of tablet {}", tablet_id))?;
        Ok(TabletMetadata { tablet_id: tablet_id.trim().to_string(), tablet, replicas })
    }
}

impl Dependencies {
    /// Walk `sys.object_dependencies` of a materialized view.
    ///
    /// Nested materialized views are followed, a view already on the current path is not followed again.
    /// Failures are logged and give no dependencies.
    pub fn read_dependencies(
        frontend: &mut dyn Frontend,
        database: &str,
        name: &str,
        path: &mut BTreeSet<String>,
    ) -> Dependencies
    {
        let mut dependencies = Dependencies::default();
        let key = format!("{}.{}", database, name);
        if !path.insert(key.clone()) {
            debug!("{} already visited, not following it again", key);
            return dependencies;
        }
        let rows = match frontend.query(&object_dependencies_sql(database, name)) {
            Ok(rows) => rows,
            Err(e) => {
                warn!("unable to get the dependencies of {}: {:#}", key, e);
                path.remove(&key);
                return dependencies;
            },
        };
        for row in &rows {
            let object = DependentObject {
                database: row.get_string("ref_object_database"),
                name: row.get_string("ref_object_name"),
                object_type: row.get_string("ref_object_type"),
            };
            if object.object_type == "MATERIALIZED_VIEW" {
                let nested = Dependencies::read_dependencies(frontend, &object.database, &object.name, path);
                for base_table in &nested.base_tables {
                    dependencies.add_base_table(base_table.clone());
                }
                dependencies.materialized_views.push(NestedMaterializedView {
                    database: object.database,
                    name: object.name,
                    object_type: object.object_type,
                    dependencies: nested,
                });
            } else {
                dependencies.add_base_table(object);
            }
        }
        path.remove(&key);
        dependencies
    }
    fn add_base_table(&mut self, object: DependentObject) {
        if !self.base_tables.iter().any(|table| table.database == object.database && table.name == object.name) {
            self.base_tables.push(object);
        }
    }
}

impl MaterializedViewInfo {
    pub fn read_materialized_view_info(
        frontend: &mut dyn Frontend,
        row: &ResultRow,
    ) -> MaterializedViewInfo
    {
        let database = row.get_string("TABLE_SCHEMA");
        let view = row.get_string("TABLE_NAME");
        let task_name = row.get("TASK_NAME")
            .filter(|task_name| !task_name.trim().is_empty())
            .map(|task_name| task_name.to_string());
        let latest_refresh = match &task_name {
            Some(task_name) => match frontend.query(&latest_task_run_sql(task_name)) {
                Ok(rows) => rows.into_iter().next(),
                Err(e) => {
                    warn!("unable to get the latest refresh of {}: {:#}", task_name, e);
                    None
                },
            },
            None => None,
        };
        let dependencies = Dependencies::read_dependencies(frontend, &database, &view, &mut BTreeSet::new());
        let partitions = read_partitions_meta(frontend, &database, &view)
            .unwrap_or_else(|e| {
                warn!("partitions_meta not available for {}, falling back to SHOW PARTITIONS: {:#}", qualified_table(&database, &view), e);
                read_show_partitions(frontend, &database, &view)
            });
        let (total_data_size_mb, total_row_count) = partition_totals(&partitions);
        MaterializedViewInfo {
            definition: row.get("MATERIALIZED_VIEW_DEFINITION").map(|definition| definition.to_string()),
            task_name,
            latest_refresh,
            dependencies,
            partitions,
            total_data_size_mb,
            total_row_count,
        }
    }
}

/// The materialized views grouped by database.
pub fn read_materialized_views(
    frontend: &mut dyn Frontend,
    view_name: Option<&str>,
) -> Result<MaterializedViews>
{
    info!("begin materialized views");
    let timer = Instant::now();

    let rows = frontend.query(&materialized_views_sql(view_name))
        .with_context(|| "Failed to list the materialized views")?;
    let mut materializedviews = MaterializedViews::new();
    for row in &rows {
        let materializedviewinfo = MaterializedViewInfo::read_materialized_view_info(frontend, row);
        materializedviews.entry(row.get_string("TABLE_SCHEMA"))
            .or_default()
            .insert(row.get_string("TABLE_NAME"), materializedviewinfo);
    }

    info!("end materialized views: {:?}", timer.elapsed());
    Ok(materializedviews)
}

impl PerformanceDiagnostics {
    /// Read the audit log and the current queries on every frontend, then the process list on the frontend used at the start.
    ///
    /// A frontend that cannot be reached, or has no audit table, is skipped.
    pub fn read_performance_diagnostics(
        frontend: &mut dyn Frontend,
        limit: usize,
    ) -> Result<PerformanceDiagnostics>
    {
        let original_host = frontend.host();
        let fe_hosts: Vec<String> = frontend.query(FRONTENDS_PROC_SQL)
            .with_context(|| "Failed to get the frontends")?
            .iter()
            .filter_map(|row| row.get("IP").or_else(|| row.get("Host")))
            .map(|host| host.to_string())
            .collect();

        let mut performancediagnostics = PerformanceDiagnostics::default();
        for fe_host in &fe_hosts {
            if let Err(e) = frontend.switch_host(fe_host) {
                warn!("unable to switch to frontend {}: {:#}", fe_host, e);
                continue;
            }
            match frontend.query(&audit_queries_sql(fe_host, limit)) {
                Ok(rows) => performancediagnostics.recent_queries.extend(rows),
                Err(e) => debug!("no audit log on {}: {:#}", fe_host, e),
            }
            match frontend.query(CURRENT_QUERIES_SQL) {
                Ok(rows) => performancediagnostics.current_queries.extend(rows.into_iter().map(|row| row.with_value("fe_host", fe_host))),
                Err(e) => debug!("no current queries on {}: {:#}", fe_host, e),
            }
        }
        performancediagnostics.recent_queries.sort_by(|a, b| b.get("timestamp").cmp(&a.get("timestamp")));
        performancediagnostics.recent_queries.truncate(limit);

        frontend.switch_host(&original_host)
            .with_context(|| format!("Failed to switch back to frontend {}", original_host))?;
        performancediagnostics.active_queries = frontend.query(PROCESSLIST_SQL)
            .with_context(|| "Failed to get the process list")?;
        Ok(performancediagnostics)
    }
}

impl QueryDump {
    pub fn read_query_dump(
        frontend: &mut dyn Frontend,
        sql_file: &Path,
    ) -> Result<QueryDump>
    {
        let statement = fs::read_to_string(sql_file)
            .with_context(|| format!("Failed to read {}", sql_file.display()))?;
        if statement.trim().is_empty() {
            anyhow::bail!("{} contains no statement", sql_file.display());
        }
        let query_dump = frontend.query(&query_dump_sql(statement.trim()))
            .with_context(|| format!("Failed to get the query dump of {}", sql_file.display()))?
            .first()
            .and_then(|row| row.get("get_query_dump"))
            .map(|query_dump| query_dump.to_string())
            .with_context(|| format!("No query dump returned for {}", sql_file.display()))?;
        Ok(QueryDump { sql_file: sql_file.display().to_string(), query_dump })
    }
}

impl BackendStackTrace {
    /// Look up the backend id of the address, then have that backend print the stacks of all its threads.
    pub fn read_backend_stack_trace(
        frontend: &mut dyn Frontend,
        be_ip: &str,
    ) -> Result<BackendStackTrace>
    {
        let be_ip = be_ip.trim();
        let be_id = read_backend_mapping(frontend)?
            .remove(be_ip)
            .with_context(|| format!("Could not find a backend id for {}", be_ip))?;
        let stack_trace = frontend.query(&be_stack_sql(&be_id)?)
            .with_context(|| format!("Failed to get the stack trace of backend {} ({})", be_id, be_ip))?
            .first()
            .and_then(|row| row.get("result"))
            .map(|result| result.to_string())
            .with_context(|| format!("No stack trace returned for backend {}", be_id))?;
        Ok(BackendStackTrace { be_ip: be_ip.to_string(), be_id, stack_trace })
    }
}

impl DoctorModule {
    pub fn file_name(&self) -> &'static str {
        match self {
            DoctorModule::ClusterState => "cluster_state",
            DoctorModule::BackendMapping => "backend_host_id_mapping",
            DoctorModule::SessionVars => "modified_session_variables",
            DoctorModule::BeConfig => "modified_be_configs",
            DoctorModule::FeConfig => "fe_configs",
            DoctorModule::AllConfigs => "all_configurations",
            DoctorModule::Schema => "table_info",
            DoctorModule::Tablet => "tablet_metadata",
            DoctorModule::MaterializedViews => "materialized_view_info",
            DoctorModule::PerformanceDiagnostics => "performance_diagnostics",
            DoctorModule::QueryDump => "query_dump",
            DoctorModule::BeStack => "be_stack_trace",
        }
    }
    pub fn needs_leader(&self) -> bool {
        !matches!(self, DoctorModule::ClusterState | DoctorModule::Schema | DoctorModule::PerformanceDiagnostics | DoctorModule::QueryDump)
    }
}

/// Run a collector and save its result as json.
pub fn run_doctor(
    frontend: &mut dyn Frontend,
    module: DoctorModule,
    settings: &DoctorSettings,
    output: &OutputDirectory,
) -> Result<PathBuf>
{
    info!("begin doctor {:?}", module);
    let timer = Instant::now();

    let name = settings.name.as_deref();
    match module {
        DoctorModule::Tablet if name.is_none() => anyhow::bail!("The tablet module requires a tablet id (--name)"),
        DoctorModule::QueryDump if settings.sql_file.is_none() => anyhow::bail!("The query_dump module requires a sql file (--sql-file)"),
        DoctorModule::BeStack if settings.be_ip.is_none() => anyhow::bail!("The be_stack module requires a backend address (--be-ip)"),
        _ => {},
    }
    if module.needs_leader() {
        switch_to_leader(frontend)?;
    }
    let filename = module.file_name();
    let filepath = match module {
        DoctorModule::ClusterState => output.save_json(filename, &ClusterState::read_cluster_state(frontend)?)?,
        DoctorModule::BackendMapping => output.save_json(filename, &read_backend_mapping(frontend)?)?,
        DoctorModule::SessionVars => output.save_json(filename, &read_modified_session_variables(frontend)?)?,
        DoctorModule::BeConfig => output.save_json(filename, &read_modified_be_configs(frontend)?)?,
        DoctorModule::FeConfig => output.save_json(filename, &read_fe_configs(frontend)?)?,
        DoctorModule::AllConfigs => output.save_json(filename, &AllConfigs::read_all_configs(frontend))?,
        DoctorModule::Schema => output.save_json(filename, &read_schema_info(frontend, name)?)?,
        DoctorModule::Tablet => {
            let tablet_id = name.unwrap_or_default();
            output.save_json(filename, &TabletMetadata::read_tablet_metadata(frontend, tablet_id)?)?
        },
        DoctorModule::MaterializedViews => output.save_json(filename, &read_materialized_views(frontend, name)?)?,
        DoctorModule::PerformanceDiagnostics => {
            let limit = if settings.limit == 0 { DEFAULT_QUERY_LIMIT } else { settings.limit };
            output.save_json(filename, &PerformanceDiagnostics::read_performance_diagnostics(frontend, limit)?)?
        },
        DoctorModule::QueryDump => {
            let sql_file = settings.sql_file.as_deref().unwrap_or_else(|| Path::new(""));
            output.save_json(filename, &QueryDump::read_query_dump(frontend, sql_file)?)?
        },
        DoctorModule::BeStack => {
            let be_ip = settings.be_ip.as_deref().unwrap_or_default();
            output.save_json(filename, &BackendStackTrace::read_backend_stack_trace(frontend, be_ip)?)?
        },
    };
    println!("{} {}", "Saved:".green(), filepath.display());

    info!("end doctor {:?}: {:?}", module, timer.elapsed());
    Ok(filepath)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::StaticFrontend;

    fn frontends() -> Vec<ResultRow> {
        vec![
            ResultRow::from_pairs(&[("Name", "fe1"), ("IP", "10.0.0.1"), ("Role", "FOLLOWER")]),
            ResultRow::from_pairs(&[("Name", "fe2"), ("IP", "10.0.0.2"), ("Role", "LEADER")]),
        ]
    }
    fn backends() -> Vec<ResultRow> {
        vec![
            ResultRow::from_pairs(&[("BackendId", "10001"), ("Host", "10.0.1.1")]),
            ResultRow::from_pairs(&[("BackendId", "10002"), ("Host", "10.0.1.2")]),
            ResultRow::from_pairs(&[("BackendId", ""), ("Host", "10.0.1.3")]),
        ]
    }

    #[test]
    fn unit_read_leader_frontend() {
        let mut frontend = StaticFrontend::new();
        frontend.respond(FRONTENDS_SQL, frontends());
        assert_eq!(read_leader_frontend(&mut frontend).unwrap(), "10.0.0.2");

        switch_to_leader(&mut frontend).unwrap();
        assert_eq!(frontend.hostname_port(), "10.0.0.2");
    }
    #[test]
    fn unit_read_leader_frontend_without_leader() {
        let mut frontend = StaticFrontend::new();
        frontend.respond(FRONTENDS_SQL, vec![ResultRow::from_pairs(&[("IP", "10.0.0.1"), ("Role", "FOLLOWER")])]);
        assert!(read_leader_frontend(&mut frontend).is_err());
    }
    #[test]
    fn unit_backend_mapping_skips_incomplete_rows() {
        let mapping = parse_backend_mapping(&backends());
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.get("10.0.1.2"), Some(&"10002".to_string()));
    }
    #[test]
    fn unit_cluster_state_resources_are_optional() {
        let mut frontend = StaticFrontend::new();
        frontend.respond(BACKENDS_SQL, backends())
            .respond(FRONTENDS_PROC_SQL, frontends())
            .fail(RESOURCES_SQL, "access denied")
            .respond(VERSION_SQL, vec![ResultRow::from_pairs(&[("current_version()", "3.2.4-abc")])]);
        let clusterstate = ClusterState::read_cluster_state(&mut frontend).unwrap();
        assert_eq!(clusterstate.backends.len(), 3);
        assert!(clusterstate.resources.is_empty());
        assert_eq!(clusterstate.version, "3.2.4-abc");
    }
    #[test]
    fn unit_modified_session_variables() {
        let mut frontend = StaticFrontend::new();
        frontend.respond(SESSION_VARIABLES_SQL, vec![
            ResultRow::from_pairs(&[("VARIABLE_NAME", "query_timeout"), ("VARIABLE_VALUE", "600"), ("IS_CHANGED", "TRUE")]),
            ResultRow::from_pairs(&[("VARIABLE_NAME", "pipeline_dop"), ("VARIABLE_VALUE", "0"), ("IS_CHANGED", "FALSE")]),
            ResultRow::from_pairs(&[("VARIABLE_NAME", "sql_mode"), ("VARIABLE_VALUE", "ONLY_FULL_GROUP_BY"), ("IS_CHANGED", "1")]),
        ]);
        let variables = read_modified_session_variables(&mut frontend).unwrap();
        assert_eq!(variables.keys().collect::<Vec<_>>(), vec!["query_timeout", "sql_mode"]);
        assert_eq!(variables["query_timeout"], ModifiedSessionVariable { current_value: "600".to_string(), is_modified: true });
    }
    #[test]
    fn unit_modified_be_configs_grouped_by_host() {
        let mut frontend = StaticFrontend::new();
        frontend.respond(BACKENDS_SQL, backends())
            .respond(BE_CONFIGS_SQL, vec![
                ResultRow::from_pairs(&[("BE_ID", "10001"), ("NAME", "mem_limit"), ("VALUE", "80%"), ("DEFAULT", "90%")]),
                ResultRow::from_pairs(&[("BE_ID", "10001"), ("NAME", "be_port"), ("VALUE", "9060"), ("DEFAULT", "9060")]),
                ResultRow::from_pairs(&[("BE_ID", "10002"), ("NAME", "sys_log_level"), ("VALUE", "WARN"), ("DEFAULT", "INFO")]),
                ResultRow::from_pairs(&[("BE_ID", "99999"), ("NAME", "sys_log_level"), ("VALUE", "WARN"), ("DEFAULT", "INFO")]),
            ]);
        let configs = read_modified_be_configs(&mut frontend).unwrap();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs["10.0.1.1"].len(), 1);
        assert_eq!(configs["10.0.1.1"]["mem_limit"].default_value, "90%");
        assert_eq!(configs["10.0.1.2"]["sys_log_level"].current_value, "WARN");
    }
    #[test]
    fn unit_all_configs_is_fail_soft() {
        let mut frontend = StaticFrontend::new();
        frontend.respond(FE_CONFIG_SQL, vec![ResultRow::from_pairs(&[("Key", "qe_max_connection"), ("Value", "4096")])])
            .fail(BACKENDS_SQL, "access denied");
        let allconfigs = AllConfigs::read_all_configs(&mut frontend);
        assert_eq!(allconfigs.fe_configs["qe_max_connection"].value, "4096");
        assert!(allconfigs.be_configs.is_empty());
        assert!(allconfigs.session_vars.is_empty());
    }
    #[test]
    fn unit_schema_info_with_partitions_meta_fallback() {
        let mut frontend = StaticFrontend::new();
        frontend.respond(&schema_tables_sql(Some("orders")), vec![
            ResultRow::from_pairs(&[("TABLE_SCHEMA", "sales"), ("TABLE_NAME", "orders"), ("TABLE_TYPE", "BASE TABLE"), ("TABLE_ID", "2001")]),
            ResultRow::from_pairs(&[("TABLE_SCHEMA", "_statistics_"), ("TABLE_NAME", "orders"), ("TABLE_TYPE", "BASE TABLE"), ("TABLE_ID", "11")]),
        ])
            .respond("SHOW CREATE TABLE `sales`.`orders`", vec![ResultRow::from_pairs(&[("Table", "orders"), ("Create Table", "CREATE TABLE orders ()")])])
            .fail(&partitions_meta_sql("sales", "orders"), "Unknown table 'partitions_meta'")
            .respond(&partitions_sql("sales", "orders"), vec![
                ResultRow::from_pairs(&[("PartitionName", "p1"), ("DataSize", "1.5GB"), ("RowCount", "1000")]),
                ResultRow::from_pairs(&[("PartitionName", "p2"), ("DataSize", "512MB"), ("RowCount", "24")]),
            ])
            .respond(&tablets_sql("sales", "orders"), vec![
                ResultRow::from_pairs(&[("TabletId", "50001"), ("BackendId", "10001"), ("DataSize", "1MB"), ("RowCount", "600")]),
                ResultRow::from_pairs(&[("TabletId", "50002"), ("BackendId", "10002"), ("DataSize", "1MB"), ("RowCount", "430")]),
            ])
            .respond(&row_count_sql("sales", "orders"), vec![ResultRow::from_pairs(&[("count", "1030")])]);
        let schemainfo = read_schema_info(&mut frontend, Some("orders")).unwrap();
        assert_eq!(schemainfo.len(), 1);
        let orders = &schemainfo["sales"]["orders"];
        assert_eq!(orders.table_id.as_deref(), Some("2001"));
        assert_eq!(orders.create_table.as_deref(), Some("CREATE TABLE orders ()"));
        assert_eq!(orders.partitions[0].data_size_mb, Some(1536.0));
        assert_eq!(orders.total_data_size_mb, 2048.0);
        assert_eq!(orders.total_row_count, 1030);
        assert_eq!(orders.tablets.len(), 2);
        assert_eq!(orders.tablets[1].get("TabletId"), Some("50002"));
    }
    #[test]
    fn unit_schema_info_with_partitions_meta_has_no_tablets() {
        let mut frontend = StaticFrontend::new();
        frontend.respond(&schema_tables_sql(None), vec![
            ResultRow::from_pairs(&[("TABLE_SCHEMA", "sales"), ("TABLE_NAME", "orders"), ("TABLE_TYPE", "BASE TABLE")]).with_null("TABLE_ID"),
        ])
            .fail("SHOW CREATE TABLE `sales`.`orders`", "Access denied")
            .respond(&partitions_meta_sql("sales", "orders"), vec![
                ResultRow::from_pairs(&[("PARTITION_NAME", "p1"), ("DATA_SIZE", "1GB"), ("ROW_COUNT", "10")]),
            ]);
        let schemainfo = read_schema_info(&mut frontend, None).unwrap();
        let orders = &schemainfo["sales"]["orders"];
        assert_eq!(orders.create_table, None);
        assert_eq!(orders.total_data_size_mb, 1024.0);
        assert_eq!(orders.total_row_count, 10);
        assert!(orders.tablets.is_empty());
        assert!(!frontend.executed.contains(&tablets_sql("sales", "orders")));
        assert!(!frontend.executed.contains(&row_count_sql("sales", "orders")));
    }
    #[test]
    fn unit_schema_tables_sql_quotes_name() {
        assert!(schema_tables_sql(None).ends_with("WHERE t.TABLE_TYPE = 'BASE TABLE'"));
        assert!(schema_tables_sql(Some("o'rders")).ends_with("AND t.TABLE_NAME = 'o''rders'"));
    }
    #[test]
    fn unit_tablet_metadata_runs_detail_command() {
        let mut frontend = StaticFrontend::new();
        frontend.respond("SHOW TABLET 12345", vec![
            ResultRow::from_pairs(&[("DbName", "sales"), ("TableName", "orders"), ("DetailCmd", "SHOW PROC '/dbs/10/20/partitions/30/40/12345';")]),
        ])
            .respond("SHOW PROC '/dbs/10/20/partitions/30/40/12345'", vec![
                ResultRow::from_pairs(&[("ReplicaId", "1"), ("BackendId", "10001")]),
                ResultRow::from_pairs(&[("ReplicaId", "2"), ("BackendId", "10002")]),
            ]);
        let tabletmetadata = TabletMetadata::read_tablet_metadata(&mut frontend, "12345").unwrap();
        assert_eq!(tabletmetadata.tablet.get("TableName"), Some("orders"));
        assert_eq!(tabletmetadata.replicas.len(), 2);
    }
    #[test]
    fn unit_tablet_id_must_be_numeric() {
        assert!(show_tablet_sql("1; DROP TABLE x").is_err());
        assert_eq!(show_tablet_sql(" 42 ").unwrap(), "SHOW TABLET 42");
    }
    #[test]
    fn unit_run_doctor_switches_to_leader_and_saves() {
        let directory = tempfile::tempdir().unwrap();
        let output = OutputDirectory::with_timestamp(directory.path(), "20240102_030405").unwrap();
        let mut frontend = StaticFrontend::new();
        frontend.respond(FRONTENDS_SQL, frontends())
            .respond(BACKENDS_SQL, backends());

        let filepath = run_doctor(&mut frontend, DoctorModule::BackendMapping, &DoctorSettings::default(), &output).unwrap();
        assert_eq!(filepath, directory.path().join("backend_host_id_mapping_20240102_030405.json"));
        assert_eq!(frontend.hostname_port(), "10.0.0.2");
        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(filepath).unwrap()).unwrap();
        assert_eq!(json["10.0.1.1"], "10001");

        assert!(run_doctor(&mut frontend, DoctorModule::Tablet, &DoctorSettings::default(), &output).is_err());
        assert!(run_doctor(&mut frontend, DoctorModule::QueryDump, &DoctorSettings::default(), &output).is_err());
        assert!(run_doctor(&mut frontend, DoctorModule::BeStack, &DoctorSettings::default(), &output).is_err());
    }

    fn dependency(database: &str, name: &str, object_type: &str) -> ResultRow {
        ResultRow::from_pairs(&[("ref_object_database", database), ("ref_object_name", name), ("ref_object_type", object_type)])
    }
    #[test]
    fn unit_dependencies_stop_at_a_cycle() {
        let mut frontend = StaticFrontend::new();
        frontend.respond(&object_dependencies_sql("sales", "mv_a"), vec![dependency("sales", "mv_b", "MATERIALIZED_VIEW")])
            .respond(&object_dependencies_sql("sales", "mv_b"), vec![
                dependency("sales", "mv_a", "MATERIALIZED_VIEW"),
                dependency("sales", "orders", "OLAP"),
            ]);
        let dependencies = Dependencies::read_dependencies(&mut frontend, "sales", "mv_a", &mut BTreeSet::new());
        assert_eq!(dependencies.base_tables, vec![DependentObject { database: "sales".to_string(), name: "orders".to_string(), object_type: "OLAP".to_string() }]);
        assert_eq!(dependencies.materialized_views.len(), 1);
        let mv_b = &dependencies.materialized_views[0];
        assert_eq!(mv_b.name, "mv_b");
        assert_eq!(mv_b.dependencies.materialized_views[0].name, "mv_a");
        assert_eq!(mv_b.dependencies.materialized_views[0].dependencies, Dependencies::default());
        assert_eq!(frontend.executed.iter().filter(|sql| **sql == object_dependencies_sql("sales", "mv_a")).count(), 1);
    }
    #[test]
    fn unit_dependencies_lift_base_tables_of_nested_views() {
        let mut frontend = StaticFrontend::new();
        frontend.respond(&object_dependencies_sql("sales", "mv_top"), vec![
            dependency("sales", "mv_mid", "MATERIALIZED_VIEW"),
            dependency("sales", "orders", "OLAP"),
            dependency("ods", "events", "OLAP"),
        ])
            .respond(&object_dependencies_sql("sales", "mv_mid"), vec![
                dependency("sales", "orders", "OLAP"),
                dependency("sales", "customers", "OLAP"),
            ]);
        let dependencies = Dependencies::read_dependencies(&mut frontend, "sales", "mv_top", &mut BTreeSet::new());
        let base_tables: Vec<&str> = dependencies.base_tables.iter().map(|table| table.name.as_str()).collect();
        assert_eq!(base_tables, vec!["orders", "customers", "events"]);
        assert_eq!(dependencies.materialized_views[0].name, "mv_mid");
        assert_eq!(dependencies.materialized_views[0].dependencies.base_tables.len(), 2);
    }
    #[test]
    fn unit_materialized_views_with_latest_refresh() {
        let mut frontend = StaticFrontend::new();
        frontend.respond(&materialized_views_sql(None), vec![
            ResultRow::from_pairs(&[("TABLE_SCHEMA", "sales"), ("TABLE_NAME", "mv_daily"), ("MATERIALIZED_VIEW_DEFINITION", "SELECT 1"), ("TASK_NAME", "mv-1001")]),
            ResultRow::from_pairs(&[("TABLE_SCHEMA", "sales"), ("TABLE_NAME", "mv_sync"), ("MATERIALIZED_VIEW_DEFINITION", "SELECT 2"), ("TASK_NAME", "")]),
        ])
            .respond(&latest_task_run_sql("mv-1001"), vec![
                ResultRow::from_pairs(&[("QUERY_ID", "q1"), ("FINISH_TIME", "2024-01-02 03:04:05"), ("State", "SUCCESS")]).with_null("ERROR_MESSAGE"),
            ])
            .respond(&object_dependencies_sql("sales", "mv_daily"), vec![dependency("sales", "orders", "OLAP")])
            .fail(&object_dependencies_sql("sales", "mv_sync"), "Unknown table 'object_dependencies'")
            .respond(&partitions_meta_sql("sales", "mv_daily"), vec![
                ResultRow::from_pairs(&[("PARTITION_NAME", "p1"), ("DATA_SIZE", "10MB"), ("ROW_COUNT", "5")]),
            ])
            .fail(&partitions_meta_sql("sales", "mv_sync"), "Unknown table 'partitions_meta'")
            .respond(&partitions_sql("sales", "mv_sync"), vec![
                ResultRow::from_pairs(&[("PartitionName", "mv_sync"), ("DataSize", "1MB"), ("RowCount", "7")]),
            ]);
        let materializedviews = read_materialized_views(&mut frontend, None).unwrap();
        let mv_daily = &materializedviews["sales"]["mv_daily"];
        assert_eq!(mv_daily.definition.as_deref(), Some("SELECT 1"));
        assert_eq!(mv_daily.latest_refresh.as_ref().and_then(|row| row.get("State")), Some("SUCCESS"));
        assert_eq!(mv_daily.dependencies.base_tables[0].name, "orders");
        assert_eq!(mv_daily.total_data_size_mb, 10.0);
        assert_eq!(mv_daily.total_row_count, 5);
        let mv_sync = &materializedviews["sales"]["mv_sync"];
        assert_eq!(mv_sync.task_name, None);
        assert_eq!(mv_sync.latest_refresh, None);
        assert_eq!(mv_sync.dependencies, Dependencies::default());
        assert_eq!(mv_sync.total_row_count, 7);
    }
    #[test]
    fn unit_materialized_view_refresh_failure_is_soft() {
        let mut frontend = StaticFrontend::new();
        frontend.respond(&materialized_views_sql(Some("mv_daily")), vec![
            ResultRow::from_pairs(&[("TABLE_SCHEMA", "sales"), ("TABLE_NAME", "mv_daily"), ("TASK_NAME", "mv-1001")]).with_null("MATERIALIZED_VIEW_DEFINITION"),
        ])
            .fail(&latest_task_run_sql("mv-1001"), "Access denied")
            .respond(&object_dependencies_sql("sales", "mv_daily"), vec![])
            .respond(&partitions_meta_sql("sales", "mv_daily"), vec![]);
        let materializedviews = read_materialized_views(&mut frontend, Some("mv_daily")).unwrap();
        let mv_daily = &materializedviews["sales"]["mv_daily"];
        assert_eq!(mv_daily.definition, None);
        assert_eq!(mv_daily.task_name.as_deref(), Some("mv-1001"));
        assert_eq!(mv_daily.latest_refresh, None);
    }
    #[test]
    fn unit_performance_diagnostics_merges_frontends() {
        let mut frontend = StaticFrontend::new();
        frontend.respond(FRONTENDS_PROC_SQL, frontends())
            .respond(&audit_queries_sql("10.0.0.1", 2), vec![
                ResultRow::from_pairs(&[("queryId", "q1"), ("timestamp", "2024-01-02 03:00:01"), ("fe_host", "10.0.0.1")]),
                ResultRow::from_pairs(&[("queryId", "q3"), ("timestamp", "2024-01-02 03:00:03"), ("fe_host", "10.0.0.1")]),
            ])
            .fail(&audit_queries_sql("10.0.0.2", 2), "Unknown database 'starrocks_audit_db__'")
            .respond(CURRENT_QUERIES_SQL, vec![ResultRow::from_pairs(&[("QueryId", "q9"), ("ExecTime", "12")])])
            .respond(PROCESSLIST_SQL, vec![ResultRow::from_pairs(&[("Id", "1"), ("Command", "Query")])]);

        let performancediagnostics = PerformanceDiagnostics::read_performance_diagnostics(&mut frontend, 2).unwrap();
        let recent: Vec<&str> = performancediagnostics.recent_queries.iter().filter_map(|row| row.get("queryId")).collect();
        assert_eq!(recent, vec!["q3", "q1"]);
        let fe_hosts: Vec<&str> = performancediagnostics.current_queries.iter().filter_map(|row| row.get("fe_host")).collect();
        assert_eq!(fe_hosts, vec!["10.0.0.1", "10.0.0.2"]);
        assert_eq!(performancediagnostics.active_queries.len(), 1);
        assert_eq!(frontend.host(), "static");
    }
    #[test]
    fn unit_performance_diagnostics_truncates_to_limit() {
        let mut frontend = StaticFrontend::new();
        frontend.respond(FRONTENDS_PROC_SQL, frontends())
            .respond(&audit_queries_sql("10.0.0.1", 1), vec![ResultRow::from_pairs(&[("queryId", "q1"), ("timestamp", "2024-01-02 03:00:01")])])
            .respond(&audit_queries_sql("10.0.0.2", 1), vec![ResultRow::from_pairs(&[("queryId", "q2"), ("timestamp", "2024-01-02 03:00:02")])])
            .fail(CURRENT_QUERIES_SQL, "Access denied")
            .respond(PROCESSLIST_SQL, vec![]);

        let performancediagnostics = PerformanceDiagnostics::read_performance_diagnostics(&mut frontend, 1).unwrap();
        assert_eq!(performancediagnostics.recent_queries.len(), 1);
        assert_eq!(performancediagnostics.recent_queries[0].get("queryId"), Some("q2"));
        assert!(performancediagnostics.current_queries.is_empty());
    }
    #[test]
    fn unit_query_dump_reads_the_sql_file() {
        let directory = tempfile::tempdir().unwrap();
        let sql_file = directory.path().join("query.sql");
        std::fs::write(&sql_file, "SELECT * FROM orders WHERE note = 'it''s'\n").unwrap();
        let mut frontend = StaticFrontend::new();
        frontend.respond(&query_dump_sql("SELECT * FROM orders WHERE note = 'it''s'"), vec![
            ResultRow::from_pairs(&[("get_query_dump", "{\"statement\":\"...\"}")]),
        ]);
        let querydump = QueryDump::read_query_dump(&mut frontend, &sql_file).unwrap();
        assert_eq!(querydump.query_dump, "{\"statement\":\"...\"}");
        assert!(frontend.executed[0].starts_with("SELECT get_query_dump('SELECT * FROM orders WHERE note = ''it''''s''')"));

        std::fs::write(&sql_file, "  \n").unwrap();
        assert!(QueryDump::read_query_dump(&mut frontend, &sql_file).is_err());
        assert!(QueryDump::read_query_dump(&mut frontend, &directory.path().join("missing.sql")).is_err());
    }
    #[test]
    fn unit_backend_stack_trace() {
        let mut frontend = StaticFrontend::new();
        frontend.respond(BACKENDS_SQL, backends())
            .respond(&be_stack_sql("10002").unwrap(), vec![ResultRow::from_pairs(&[("result", "thread 1: ...")])]);
        let backendstacktrace = BackendStackTrace::read_backend_stack_trace(&mut frontend, "10.0.1.2").unwrap();
        assert_eq!(backendstacktrace.be_id, "10002");
        assert_eq!(backendstacktrace.stack_trace, "thread 1: ...");
        assert_eq!(
            frontend.executed.last().unwrap(),
            "ADMIN EXECUTE ON 10002 'System.print(ExecEnv.get_stack_trace_for_all_threads())'"
        );

        assert!(BackendStackTrace::read_backend_stack_trace(&mut frontend, "10.0.9.9").is_err());
        assert!(be_stack_sql("10002; DROP").is_err());
    }
    #[test]
    fn unit_run_doctor_be_stack_runs_on_leader() {
        let directory = tempfile::tempdir().unwrap();
        let output = OutputDirectory::with_timestamp(directory.path(), "20240102_030405").unwrap();
        let mut frontend = StaticFrontend::new();
        frontend.respond(FRONTENDS_SQL, frontends())
            .respond(BACKENDS_SQL, backends())
            .respond(&be_stack_sql("10001").unwrap(), vec![ResultRow::from_pairs(&[("result", "thread 1: ...")])]);
        let settings = DoctorSettings { be_ip: Some("10.0.1.1".to_string()), ..Default::default() };

        let filepath = run_doctor(&mut frontend, DoctorModule::BeStack, &settings, &output).unwrap();
        assert_eq!(filepath, directory.path().join("be_stack_trace_20240102_030405.json"));
        assert_eq!(frontend.hostname_port(), "10.0.0.2");
    }
}
