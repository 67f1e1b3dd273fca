use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::config::Config;
use crate::delivery::{DeliveryOutcome, WebhookClient};
use crate::error::Result;
use crate::export::read_log;
use crate::report::{build_layout, write_pdf};
use crate::sensors::root_disk;
use crate::summary::{ReportSummary, StorageSummary};

/// Rendered report on disk, removed when dropped whatever happened in between.
pub struct TransientFile {
    path: PathBuf,
}

impl TransientFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TransientFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => info!(path = %self.path.display(), "Removed rendered report"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Could not remove rendered report"),
        }
    }
}

/// One Reporter cycle. The webhook is validated before the log is read or
/// any sensor is touched.
pub async fn run_reporter(config: &Config) -> Result<DeliveryOutcome> {
    let webhook = config.require_webhook()?;
    let client = WebhookClient::new(webhook)?;

    let storage = StorageSummary::from(root_disk());
    generate_and_deliver(config, Local::now().date_naive(), storage, &client).await
}

pub fn report_path(report_dir: &Path, date: NaiveDate) -> PathBuf {
    report_dir.join(format!("server_report_{}.pdf", date.format("%Y-%m-%d")))
}

/// Aggregates the log, renders the PDF, uploads it, then deletes the PDF.
/// Delivery problems are reported in the outcome, not as errors.
pub async fn generate_and_deliver(
    config: &Config,
    date: NaiveDate,
    storage: StorageSummary,
    client: &WebhookClient,
) -> Result<DeliveryOutcome> {
    println!("1. Reading daily log {}", config.log_file.display());
    let entries = read_log(&config.log_file);
    let summary = ReportSummary::new(date, &entries, storage);
    info!(rows = summary.rows, "Log aggregated");

    let report = TransientFile::new(report_path(&config.report_dir, date));
    println!("2. Rendering report {}", report.path().display());
    write_pdf(&build_layout(&summary, &entries), report.path())?;

    println!("3. Sending report to webhook...");
    let file_name = format!("report_{}.pdf", date.format("%Y-%m-%d"));
    let outcome = client
        .deliver_file(report.path(), &file_name, &summary.caption())
        .await;

    match &outcome {
        DeliveryOutcome::Delivered(_) => println!("✅ Report delivered."),
        DeliveryOutcome::Rejected { status, .. } => println!("⚠️ Delivery failed. Status: {status}"),
        DeliveryOutcome::Failed(reason) => println!("❌ Failed to send report: {reason}"),
    }

    drop(report);
    println!("Done.");
    Ok(outcome)
}
