use std::fs::OpenOptions;
use std::io;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{Result, SysReportError};
use crate::metrics::{Column, MetricRow, LOG_HEADER};

/// Appends one row to the log, writing the header first when the file is new
/// or empty. Existing rows are never touched.
pub fn append_row(path: &Path, row: &MetricRow) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| SysReportError::LogOpen {
            path: path.to_path_buf(),
            source,
        })?;

    let is_new = file
        .metadata()
        .map(|m| m.len() == 0)
        .map_err(|source| SysReportError::LogOpen {
            path: path.to_path_buf(),
            source,
        })?;

    let write_err = |source: csv::Error| SysReportError::LogWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut wtr = csv::Writer::from_writer(file);
    if is_new {
        wtr.write_record(LOG_HEADER).map_err(write_err)?;
    }
    wtr.write_record(row.to_record()).map_err(write_err)?;
    wtr.flush().map_err(|e| write_err(e.into()))?;
    Ok(())
}

/// One data line of the log as stored, before any numeric interpretation.
#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    fields: Vec<String>,
}

impl LogEntry {
    pub fn new<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.fields.len() >= LOG_HEADER.len()
    }

    pub fn raw(&self, column: Column) -> &str {
        self.fields
            .get(column.index())
            .map(|s| s.trim())
            .unwrap_or("")
    }

    /// Numeric value of a column, `None` when it does not parse.
    pub fn value(&self, column: Column) -> Option<f64> {
        self.raw(column).parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

/// Reads every complete data row of the log. A missing file is zero rows;
/// unreadable lines and short rows are skipped.
pub fn read_log(path: &Path) -> Vec<LogEntry> {
    let mut rdr = match csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
    {
        Ok(rdr) => rdr,
        Err(e) => {
            match e.kind() {
                csv::ErrorKind::Io(source) if source.kind() == io::ErrorKind::NotFound => {
                    debug!(path = %path.display(), "No log file yet");
                }
                _ => warn!(path = %path.display(), error = %e, "Could not open log file"),
            }
            return Vec::new();
        }
    };

    let mut entries = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        match record {
            Ok(record) => {
                let entry = LogEntry::new(record.iter());
                if entry.is_complete() {
                    entries.push(entry);
                } else {
                    debug!(line = line + 2, fields = record.len(), "Skipping short log row");
                }
            }
            Err(e) => warn!(line = line + 2, error = %e, "Skipping unreadable log row"),
        }
    }
    entries
}
