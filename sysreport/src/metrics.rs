use chrono::{DateTime, Local};

pub const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Fixed header of the CSV log. Column order matches [`Column`].
pub const LOG_HEADER: [&str; 7] = [
    "Jam", "CPU_%", "Suhu_C", "RAM_GB", "Ping_ms", "DL_Mbps", "UL_Mbps",
];

pub fn bytes_to_gib(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GIB
}

/// Ratio as a percentage, 0 when the whole is 0.
pub fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// A sensor or probe value that may not have been measurable on this host.
///
/// The log format has no way to represent a missing value, so
/// [`Reading::or_zero`] is what ends up on disk. Keeping the distinction up to
/// that point lets the terminal summary and logs say "n/a" instead of a
/// misleading zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading<T> {
    Measured(T),
    Unavailable,
}

impl<T> Reading<T> {
    pub fn measured(self) -> Option<T> {
        match self {
            Reading::Measured(v) => Some(v),
            Reading::Unavailable => None,
        }
    }
}

impl<T: Default> Reading<T> {
    pub fn or_zero(self) -> T {
        self.measured().unwrap_or_default()
    }
}

impl<T> From<Option<T>> for Reading<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Reading::Measured(v),
            None => Reading::Unavailable,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DiskUsage {
    pub total_bytes: u64,
    pub used_bytes: u64,
}

impl DiskUsage {
    /// Counts everything not available to unprivileged users as used, so
    /// blocks reserved for root (about 5% on ext4) show up in `used_bytes`.
    /// sysinfo exposes only total and available space.
    pub fn from_space(total: u64, available: u64) -> Self {
        Self {
            total_bytes: total,
            used_bytes: total.saturating_sub(available),
        }
    }

    pub fn total_gb(&self) -> f64 {
        bytes_to_gib(self.total_bytes)
    }

    pub fn used_gb(&self) -> f64 {
        bytes_to_gib(self.used_bytes)
    }

    pub fn percent(&self) -> f64 {
        percent_of(self.used_bytes as f64, self.total_bytes as f64)
    }
}

/// Everything read from the local machine in one Collector run.
#[derive(Clone, Debug)]
pub struct HostSample {
    pub taken_at: DateTime<Local>,
    pub cpu_percent: Reading<f64>,
    pub temp_celsius: Reading<f64>,
    pub mem_used_bytes: u64,
    pub mem_total_bytes: u64,
    pub disk: Reading<DiskUsage>,
}

impl HostSample {
    pub fn ram_used_gb(&self) -> f64 {
        bytes_to_gib(self.mem_used_bytes)
    }

    pub fn ram_total_gb(&self) -> f64 {
        bytes_to_gib(self.mem_total_bytes)
    }

    pub fn ram_percent(&self) -> f64 {
        percent_of(self.mem_used_bytes as f64, self.mem_total_bytes as f64)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NetworkSample {
    pub ping_ms: Reading<f64>,
    pub download_mbps: Reading<f64>,
    pub upload_mbps: Reading<f64>,
}

impl NetworkSample {
    pub fn unavailable() -> Self {
        Self {
            ping_ms: Reading::Unavailable,
            download_mbps: Reading::Unavailable,
            upload_mbps: Reading::Unavailable,
        }
    }
}

/// Columns of the log, in on-disk order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Column {
    Time,
    Cpu,
    Temp,
    Ram,
    Ping,
    Download,
    Upload,
}

impl Column {
    pub const NUMERIC: [Column; 6] = [
        Column::Cpu,
        Column::Temp,
        Column::Ram,
        Column::Ping,
        Column::Download,
        Column::Upload,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// One persisted observation.
#[derive(Clone, Debug, PartialEq)]
pub struct MetricRow {
    pub timestamp: String,
    pub cpu_percent: f64,
    pub temp_celsius: f64,
    pub ram_gb_used: f64,
    pub ping_ms: f64,
    pub download_mbps: f64,
    pub upload_mbps: f64,
}

impl MetricRow {
    pub fn from_samples(host: &HostSample, net: &NetworkSample) -> Self {
        Self {
            timestamp: host.taken_at.format("%H:%M").to_string(),
            cpu_percent: host.cpu_percent.or_zero(),
            temp_celsius: host.temp_celsius.or_zero(),
            ram_gb_used: host.ram_used_gb(),
            ping_ms: net.ping_ms.or_zero(),
            download_mbps: net.download_mbps.or_zero(),
            upload_mbps: net.upload_mbps.or_zero(),
        }
    }

    /// Fixed-precision text fields as written to the log.
    pub fn to_record(&self) -> [String; 7] {
        [
            self.timestamp.clone(),
            format!("{:.1}", self.cpu_percent),
            format!("{:.1}", self.temp_celsius),
            format!("{:.2}", self.ram_gb_used),
            format!("{:.1}", self.ping_ms),
            format!("{:.2}", self.download_mbps),
            format!("{:.2}", self.upload_mbps),
        ]
    }
}
