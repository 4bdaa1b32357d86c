//! Module for listing the databases, tables, partitions and tablets of the cluster.
//!
//! The sources are:
//! - `SHOW PROC '/dbs'`: the databases with their ids.
//! - `SHOW PROC '/dbs/<DbId>'`: the tables of a database.
//! - ``SHOW PARTITIONS FROM `db`.`table` ``: the partitions with replication number, buckets and data size.
//! - ``SHOW TABLET FROM `db`.`table` ``: the tablet replicas with backend and data size.
//! - ``SHOW CREATE TABLE `db`.`table` ``: the table definition.
//!
//! The internal schemas in [INTERNAL_DATABASES] are never part of the inventory.
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
