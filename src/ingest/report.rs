//! Per-run ingestion status.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileStatus {
    Ok,
    Error,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Ok => write!(f, "OK"),
            FileStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// Outcome of loading one source file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub file: String,
    pub collection: String,
    pub status: FileStatus,
    /// Documents inserted; zero on error
    pub rows: usize,
    pub message: Option<String>,
}

impl FileReport {
    pub fn ok(file: &str, collection: &str, rows: usize) -> Self {
        Self {
            file: file.to_string(),
            collection: collection.to_string(),
            status: FileStatus::Ok,
            rows,
            message: None,
        }
    }

    pub fn error(file: &str, collection: &str, message: impl Into<String>) -> Self {
        Self {
            file: file.to_string(),
            collection: collection.to_string(),
            status: FileStatus::Error,
            rows: 0,
            message: Some(message.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == FileStatus::Ok
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestionReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub files: Vec<FileReport>,
}

impl IngestionReport {
    pub fn succeeded(&self) -> usize {
        self.files.iter().filter(|f| f.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.files.len() - self.succeeded()
    }

    pub fn total_rows(&self) -> usize {
        self.files.iter().map(|f| f.rows).sum()
    }

    pub fn status_of(&self, file: &str) -> Option<FileStatus> {
        self.files.iter().find(|f| f.file == file).map(|f| f.status)
    }
}

impl fmt::Display for IngestionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for file in &self.files {
            writeln!(f, "{}: {}", file.file, file.status)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prints_one_line_per_file() {
        let now = Utc::now();
        let report = IngestionReport {
            started_at: now,
            finished_at: now,
            files: vec![
                FileReport::ok("ammos.csv", "ammos", 3),
                FileReport::error("bosses.csv", "bosses", "missing"),
            ],
        };
        assert_eq!(report.to_string(), "ammos.csv: OK\nbosses.csv: ERROR\n");
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.total_rows(), 3);
        assert_eq!(report.status_of("bosses.csv"), Some(FileStatus::Error));
        assert_eq!(
            serde_json::to_value(&report.files[1]).unwrap()["status"],
            serde_json::json!("ERROR")
        );
    }
}
