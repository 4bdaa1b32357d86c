//! Module for aggregating the replica and tablet health of every table.
//!
//! For every table the partitions are read to obtain:
//! - the total data size.
//! - the total replica count: replication number times buckets for every partition in shared-nothing
//!   mode, or the buckets in shared-data mode, where the data lives in object storage.
//! - the partitions that have the target replication number or the target bucket count.
//! - the partitions without data ("null partitions").
//!
//! The tablets are read to obtain the mean and the (sample) standard deviation of the tablet sizes,
//! which shows how evenly the data is spread over the tablets.
//! Tablets without data are left out of these statistics.
//!
//! All sizes in [TableHealth] are in megabytes, rounded to 2 decimals.
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
