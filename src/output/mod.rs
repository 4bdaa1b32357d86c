//! Module for writing results to the output directory.
//!
//! Every run gets a single timestamp (`YYYYmmdd_HHMMSS`, local time), and every file written in the
//! run is named `<name>_<timestamp>.<extension>`, so the files of subsequent runs do not overwrite
//! each other.
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
