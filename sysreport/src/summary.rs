use chrono::NaiveDate;

use crate::export::LogEntry;
use crate::metrics::{Column, DiskUsage, Reading};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Averages {
    pub cpu_percent: f64,
    pub temp_celsius: f64,
    pub ram_gb: f64,
    pub ping_ms: f64,
    pub download_mbps: f64,
    pub upload_mbps: f64,
}

/// Disk usage sampled at report time, rounded for display.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StorageSummary {
    pub total_gb: f64,
    pub used_gb: f64,
    pub percent: f64,
}

impl From<Reading<DiskUsage>> for StorageSummary {
    fn from(disk: Reading<DiskUsage>) -> Self {
        let disk = disk.or_zero();
        Self {
            total_gb: round_to(disk.total_gb(), 2),
            used_gb: round_to(disk.used_gb(), 2),
            percent: round_to(disk.percent(), 1),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReportSummary {
    pub date: NaiveDate,
    pub rows: usize,
    pub averages: Averages,
    pub storage: StorageSummary,
}

impl ReportSummary {
    pub fn new(date: NaiveDate, entries: &[LogEntry], storage: StorageSummary) -> Self {
        Self {
            date,
            rows: entries.len(),
            averages: average_columns(entries),
            storage,
        }
    }

    /// Text message sent alongside the rendered document.
    pub fn caption(&self) -> String {
        let a = &self.averages;
        format!(
            "📊 **Daily Report ({})**\n💾 RAM: {:.2}GB | 🌡️ Temp: {:.1}°C | 🚀 DL: {:.1}Mbps | 💿 Disk: {:.1}%",
            self.date.format("%Y-%m-%d"),
            a.ram_gb,
            a.temp_celsius,
            a.download_mbps,
            self.storage.percent,
        )
    }
}

/// Column means over complete rows. A field that does not parse adds nothing
/// to its column's sum but the row still counts; zero rows gives all zeros.
pub fn average_columns(entries: &[LogEntry]) -> Averages {
    if entries.is_empty() {
        return Averages::default();
    }

    let mut sums = [0.0f64; 6];
    for entry in entries {
        for (sum, column) in sums.iter_mut().zip(Column::NUMERIC) {
            *sum += entry.value(column).unwrap_or(0.0);
        }
    }

    let count = entries.len() as f64;
    let [cpu, temp, ram, ping, dl, ul] = sums.map(|s| s / count);
    Averages {
        cpu_percent: cpu,
        temp_celsius: temp,
        ram_gb: ram,
        ping_ms: ping,
        download_mbps: dl,
        upload_mbps: ul,
    }
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
