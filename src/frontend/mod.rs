//! Module for talking to a StarRocks frontend (FE).
//!
//! The frontend speaks the MySQL protocol, default port 9030.
//! Everything sr_stats reads is obtained by running a statement and reading the result set;
//! every result set is turned into a vector of [ResultRow], which is a map of column name to the
//! textual value of the column, with `NULL` as `None`.
//!
//! The [Frontend] trait is implemented by:
//! - [MysqlFrontend]: a real frontend.
//! - [StaticFrontend]: canned result sets, keyed by statement.
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
