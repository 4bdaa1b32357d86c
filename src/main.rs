//! sr_stats: health reports and diagnostics for a StarRocks cluster.
//!
//! Without `--doctor` or `--backend-id` it produces the table health report.
//!
use std::{collections::HashMap, path::{Path, PathBuf}, process};
use log::*;
use colored::*;
use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;

use sr_stats::doctor::{self, DoctorModule, DoctorSettings};
use sr_stats::frontend::{ConnectionPolicy, ConnectionSettings, MysqlFrontend};
use sr_stats::output::OutputDirectory;
use sr_stats::report::{self, HealthReportSettings, OutputFormat, ReportModule};
use sr_stats::single_replica;
use sr_stats::table_health::{HealthTargets, RunMode};
use sr_stats::utility;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Opts {
    /// frontend hostname or ip address (SRSTATS_HOST, default 127.0.0.1)
    #[arg(long, value_name = "hostname")]
    host: Option<String>,
    /// frontend query port (SRSTATS_PORT, default 9030)
    #[arg(long, value_name = "port")]
    port: Option<String>,
    /// user (SRSTATS_USER, default root)
    #[arg(long, value_name = "user")]
    user: Option<String>,
    /// password (SRSTATS_PASSWORD, default empty)
    #[arg(long, value_name = "password")]
    password: Option<String>,
    /// comma separated list of databases to report on, default all (SRSTATS_DATABASES)
    #[arg(long, value_name = "db1,db2")]
    databases: Option<String>,
    /// storage architecture of the cluster
    #[arg(long, value_enum, default_value_t = RunMode::SharedNothing)]
    mode: RunMode,
    /// replication number to report partitions for
    #[arg(long, default_value_t = 1)]
    replica: i64,
    /// bucket number to report partitions for
    #[arg(long)]
    bucket: Option<i64>,
    /// report section
    #[arg(long, value_enum, default_value_t = ReportModule::All)]
    module: ReportModule,
    /// report output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
    /// directory for the report and doctor files
    #[arg(long, default_value = "output", value_name = "directory")]
    output_dir: PathBuf,
    /// run a diagnostic collector instead of the health report
    #[arg(long, value_enum)]
    doctor: Option<DoctorModule>,
    /// table name for the schema collector, view name for mv, tablet id for the tablet collector
    #[arg(long)]
    name: Option<String>,
    /// file with the statement for the query_dump collector
    #[arg(long, value_name = "file")]
    sql_file: Option<PathBuf>,
    /// backend address for the be_stack collector
    #[arg(long, value_name = "ip")]
    be_ip: Option<String>,
    /// number of recent queries for the performance_diagnostics collector
    #[arg(long, default_value_t = doctor::DEFAULT_QUERY_LIMIT)]
    limit: usize,
    /// find the tablets of unqueryable single replica tables on this backend
    #[arg(long, value_name = "backend id")]
    backend_id: Option<String>,
    /// csv file for the single replica check
    #[arg(long, default_value = single_replica::DEFAULT_OUTPUT_FILE)]
    output_file: PathBuf,
    /// open a new connection for every query
    #[arg(long)]
    connection_per_query: bool,
    /// write the connection settings given to .env; the password is never written
    #[arg(long)]
    write_dotenv: bool,
}

fn run(
    options: Opts,
) -> Result<()>
{
    let mut changed_options = HashMap::new();
    let settings = ConnectionSettings {
        host: utility::set_host(&options.host, &mut changed_options),
        port: utility::set_port(&options.port, &mut changed_options)?,
        user: utility::set_user(&options.user, &mut changed_options),
        password: utility::set_password(&options.password),
    };
    let databases = utility::set_databases(&options.databases, &mut changed_options);
    let policy = if options.connection_per_query { ConnectionPolicy::PerQuery } else { ConnectionPolicy::Persistent };

    let mut frontend = MysqlFrontend::connect(settings, policy)?;

    if let Some(backend_id) = &options.backend_id {
        single_replica::check_single_replica(&mut frontend, backend_id, &options.output_file)?;
    } else if let Some(module) = options.doctor {
        let output = OutputDirectory::create(&options.output_dir)?;
        let settings = DoctorSettings {
            name: options.name.clone(),
            sql_file: options.sql_file.clone(),
            be_ip: options.be_ip.clone(),
            limit: options.limit,
        };
        doctor::run_doctor(&mut frontend, module, &settings, &output)?;
    } else {
        let output = OutputDirectory::create(&options.output_dir)?;
        let settings = HealthReportSettings {
            mode: options.mode,
            targets: HealthTargets { replica: options.replica, bucket: options.bucket },
            module: options.module,
            format: options.format,
            databases,
        };
        let reportfiles = report::health_report(&mut frontend, &settings, &output)?;
        for file in &reportfiles.files {
            println!("{} {}", "Saved:".green(), file.display());
        }
    }

    utility::dotenv_writer(options.write_dotenv, changed_options, Path::new(".env"))
}

fn main()
{
    env_logger::init();
    dotenv().ok();
    let options = Opts::parse();

    if let Err(error) = run(options) {
        error!("{:#}", error);
        eprintln!("{} {:#}", "Error:".red(), error);
        process::exit(1);
    }
}
