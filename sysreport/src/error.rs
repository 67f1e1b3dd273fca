use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SysReportError {
    #[error("Failed to open log file {path}: {source}")]
    LogOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write log file {path}: {source}")]
    LogWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{0} is not set, add it to the environment or a .env file")]
    MissingWebhook(&'static str),

    #[error("{key} is not a valid http(s) URL: {value}")]
    InvalidWebhook { key: &'static str, value: String },

    #[error("Failed to render report: {0}")]
    Render(String),

    #[error("Failed to write report file {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Logging Error: {0}")]
    Logging(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, SysReportError>;
