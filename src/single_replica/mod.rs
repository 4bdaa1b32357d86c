//! Module for finding the tablets that were lost with a backend.
//!
//! A table with a replication number of 1 has a single copy of every tablet. When the backend holding
//! such a tablet is gone, the table can't be queried anymore. This module:
//! 1. lists the tables with partitions of replication number 1 (`information_schema.partitions_meta`),
//! 2. checks every table with a `SELECT COUNT(1)`, tables that can be queried are skipped,
//! 3. reads the tablets of the others (`SHOW TABLET FROM`) and keeps the ones on the given backend,
//! 4. appends these as `TABLET_ID,BACKEND_ID` to a csv file.
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
