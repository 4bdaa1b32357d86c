//! Module for converting the human readable sizes the frontend reports.
//!
//! `SHOW PARTITIONS` and `SHOW TABLET` report the `DataSize` column as text, such as:
//! - `977B`
//! - `12KB`
//! - `14.2GB`
//! - `1.000 TB`
//!
//! The units are base 1024.
//!
mod functions;

pub use functions::*;
