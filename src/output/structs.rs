//! The structs
//!
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct OutputDirectory {
    pub path: PathBuf,
    /// `YYYYmmdd_HHMMSS`
    pub timestamp: String,
}
