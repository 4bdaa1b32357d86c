//! Module for collecting diagnostic information from the frontend.
//!
//! These are read-only collectors, every collector produces a single json document:
//!
//! | module          | source                                                              |
//! |-----------------|---------------------------------------------------------------------|
//! | cluster_state   | `SHOW PROC '/backends'`, `SHOW PROC '/frontends'`, `SHOW RESOURCES`, `SELECT current_version()` |
//! | backend_mapping | `SHOW PROC '/backends'`: backend host to backend id                  |
//! | session_vars    | `information_schema.verbose_session_variables`, changed only        |
//! | be_config       | `information_schema.be_configs`, different from default only         |
//! | fe_config       | `ADMIN SHOW FRONTEND CONFIG`                                         |
//! | all_configs     | fe_config, be_config and session_vars                                |
//! | schema          | `information_schema.tables`, `tables_config` and `partitions_meta`   |
//! | tablet          | `SHOW TABLET <id>` and the replica detail command it returns         |
//! | mv              | `information_schema.materialized_views`, `task_runs`, `sys.object_dependencies` and partitions |
//! | performance_diagnostics | the audit table and `SHOW PROC '/current_queries'` of every frontend, `SHOW PROCESSLIST` |
//! | query_dump      | `get_query_dump()` of the statement in a sql file                    |
//! | be_stack        | `ADMIN EXECUTE ON <backend id>` printing the stack of all threads    |
//!
//! The configuration, backend, tablet, mv and be_stack collectors run on the leader frontend.
//! When `partitions_meta` is not available, the schema collector falls back to `SHOW PARTITIONS`
//! and adds the tablets and a `COUNT(*)` row count.
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
