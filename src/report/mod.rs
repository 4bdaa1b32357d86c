//! Module for shaping the table health into reports.
//!
//! There are four report sections:
//! - `health_report`: one row per table, sorted on replica count, database and table, descending.
//! - `replica_partitions`: the partitions that have the target replication number.
//! - `bucket_partitions`: the partitions that have the target bucket count.
//! - `null_partitions`: the partitions without data.
//!
//! The partition sections are sorted on database and table, descending,
//! and only contain tables that have matching partitions.
//!
//! Every section is rendered as a text table, json or yaml, and saved in the output directory.
//! A text table is printed too.
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
