//! File-based data source.
//!
//! Reads a saved API response from disk.

use std::fs;
use std::path::{Path, PathBuf};

use super::{ApiResponse, DataSource};
use crate::data::MaintenanceRecord;

/// A data source that reads records from a JSON file.
///
/// The file holds a response body exactly as the API returns it, in either
/// the flat or the nested layout. It is read on the first poll and again
/// after each `reload()`; it is not watched for changes.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    last_error: Option<String>,
    /// Set until the next poll has read the file
    needs_read: bool,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            last_error: None,
            needs_read: true,
        }
    }

    /// Returns the path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the file.
    fn read_file(&mut self) -> Option<Vec<MaintenanceRecord>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "failed to read records file");
                self.last_error = Some(format!("Read error: {}", e));
                return None;
            }
        };

        match serde_json::from_str::<ApiResponse>(&content) {
            Ok(response) => {
                let records = response.normalize();
                tracing::info!(path = %self.path.display(), count = records.len(), "loaded maintenance records");
                self.last_error = None;
                Some(records)
            }
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "failed to parse records file");
                self.last_error = Some(format!("Parse error: {}", e));
                None
            }
        }
    }
}

impl DataSource for FileSource {
    fn poll(&mut self) -> Option<Vec<MaintenanceRecord>> {
        if !self.needs_read {
            return None;
        }
        self.needs_read = false;
        self.read_file()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn is_pending(&self) -> bool {
        self.needs_read
    }

    fn reload(&mut self) {
        self.needs_read = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Seek, Write};
    use tempfile::NamedTempFile;

    fn sample_json() -> &'static str {
        r#"{
            "data": [
                { "id": 2, "date": "2024-01-11", "odometer": 1500, "distance": 500, "oil": 2500 },
                { "id": 1, "date": "2024-01-01", "odometer": 1000, "distance": 0, "oil": 0 }
            ]
        }"#
    }

    #[test]
    fn test_file_source_new() {
        let source = FileSource::new("/tmp/oils.json");
        assert_eq!(source.path(), Path::new("/tmp/oils.json"));
        assert_eq!(source.description(), "file: /tmp/oils.json");
        assert!(source.error().is_none());
        assert!(source.is_pending());
    }

    #[test]
    fn test_file_source_poll_reads_once() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let mut source = FileSource::new(file.path());

        let records = source.poll().unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].date < records[1].date);
        assert!(!source.is_pending());

        // One load per request: nothing until reload
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_file_source_reload_rereads() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let mut source = FileSource::new(file.path());
        let _ = source.poll();

        file.as_file_mut().set_len(0).unwrap();
        file.rewind().unwrap();
        writeln!(file, r#"{{"data": []}}"#).unwrap();
        file.flush().unwrap();

        source.reload();
        let records = source.poll().unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_file_source_missing_file() {
        let mut source = FileSource::new("/nonexistent/path/oils.json");

        assert!(source.poll().is_none());
        assert!(source.error().unwrap().contains("Read error"));
    }

    #[test]
    fn test_file_source_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let mut source = FileSource::new(file.path());

        assert!(source.poll().is_none());
        assert!(source.error().unwrap().contains("Parse error"));
    }
}
