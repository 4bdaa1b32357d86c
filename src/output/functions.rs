//! The impls and functions
//!
use log::*;
use std::{fs, path::{Path, PathBuf}};
use chrono::Local;
use anyhow::{Context, Result};
use serde::Serialize;
use crate::output::OutputDirectory;

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

impl OutputDirectory {
    /// Create the directory (if it exists, it does nothing) with the current time as timestamp.
    pub fn create(
        path: &Path,
    ) -> Result<OutputDirectory>
    {
        OutputDirectory::with_timestamp(path, &Local::now().format(TIMESTAMP_FORMAT).to_string())
    }
    pub fn with_timestamp(
        path: &Path,
        timestamp: &str,
    ) -> Result<OutputDirectory>
    {
        fs::create_dir_all(path)
            .with_context(|| format!("Cannot create directory: {}", path.display()))?;
        Ok(OutputDirectory { path: path.to_path_buf(), timestamp: timestamp.to_string() })
    }
    pub fn file_path(
        &self,
        name: &str,
        extension: &str,
    ) -> PathBuf
    {
        self.path.join(format!("{}_{}.{}", name, self.timestamp, extension))
    }
    pub fn save_text(
        &self,
        name: &str,
        extension: &str,
        content: &str,
    ) -> Result<PathBuf>
    {
        let filepath = self.file_path(name, extension);
        fs::write(&filepath, content)
            .with_context(|| format!("Error saving: {}", filepath.display()))?;
        info!("saved: {}", filepath.display());
        Ok(filepath)
    }
    pub fn save_json<T: Serialize + ?Sized>(
        &self,
        name: &str,
        data: &T,
    ) -> Result<PathBuf>
    {
        let json = serde_json::to_string_pretty(data)
            .with_context(|| "Json serialization error")?;
        self.save_text(name, "json", &json)
    }
}

/// Append rows to a csv file, creating it if needed.
/// The header is written only if the file is empty.
pub fn append_csv<T: Serialize>(
    filepath: &Path,
    rows: &[T],
) -> Result<usize>
{
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(filepath)
        .with_context(|| format!("Cannot open file: {}", filepath.display()))?;
    let is_empty = file.metadata()
        .with_context(|| format!("Cannot read metadata of: {}", filepath.display()))?
        .len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(is_empty)
        .from_writer(file);
    for row in rows {
        writer.serialize(row)
            .with_context(|| format!("Unable to serialize row into: {}", filepath.display()))?;
    }
    writer.flush()
        .with_context(|| "Error flushing buffer")?;
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        name: String,
        size: f64,
    }

    #[test]
    fn unit_file_names_carry_timestamp() {
        let directory = tempfile::tempdir().unwrap();
        let output = OutputDirectory::with_timestamp(&directory.path().join("report"), "20240102_030405").unwrap();
        assert!(output.path.is_dir());
        assert_eq!(output.file_path("health_report", "json"), directory.path().join("report").join("health_report_20240102_030405.json"));
    }
    #[test]
    fn unit_save_json() {
        let directory = tempfile::tempdir().unwrap();
        let output = OutputDirectory::with_timestamp(directory.path(), "20240102_030405").unwrap();
        let rows = vec![Row { name: "orders".to_string(), size: 1.5 }];

        let json_file = output.save_json("tables", &rows).unwrap();
        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(json_file).unwrap()).unwrap();
        assert_eq!(json[0]["name"], "orders");
    }
    #[test]
    fn unit_append_csv_writes_header_once() {
        let directory = tempfile::tempdir().unwrap();
        let filepath = directory.path().join("tablets.csv");

        append_csv(&filepath, &[Row { name: "a".to_string(), size: 1.0 }]).unwrap();
        append_csv(&filepath, &[Row { name: "b".to_string(), size: 2.0 }]).unwrap();

        assert_eq!(fs::read_to_string(&filepath).unwrap(), "name,size\na,1.0\nb,2.0\n");
    }
}
