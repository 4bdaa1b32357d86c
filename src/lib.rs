//! sr_stats: replica, tablet and configuration health of a StarRocks cluster.
//!
//! All information is read from a frontend (FE) using the MySQL protocol,
//! using `SHOW PROC`, `SHOW PARTITIONS`, `SHOW TABLET` and `information_schema` queries.
//!
extern crate serde;
extern crate serde_json;
#[macro_use]
extern crate serde_derive;
extern crate csv;

pub mod capacity;
pub mod doctor;
pub mod frontend;
pub mod inventory;
pub mod output;
pub mod report;
pub mod single_replica;
pub mod table_health;
pub mod utility;
