use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Local;
use sysinfo::{ComponentExt, DiskExt, ProcessorExt, System, SystemExt};
use tracing::{debug, warn};

use crate::metrics::{DiskUsage, HostSample, Reading};

/// Window between the two CPU refreshes that usage is computed over.
pub const CPU_SAMPLE_WINDOW: Duration = Duration::from_secs(1);

pub struct SystemSampler {
    sys: System,
    thermal_path: PathBuf,
}

impl SystemSampler {
    pub fn new(thermal_path: impl Into<PathBuf>) -> Self {
        Self {
            sys: System::new(),
            thermal_path: thermal_path.into(),
        }
    }

    pub async fn sample(&mut self) -> HostSample {
        let cpu_percent = self.cpu_percent().await;
        let temp_celsius = self.temperature();

        self.sys.refresh_memory();
        // sysinfo reports memory in KiB
        let mem_used_bytes = self.sys.used_memory().saturating_mul(1024);
        let mem_total_bytes = self.sys.total_memory().saturating_mul(1024);

        HostSample {
            taken_at: Local::now(),
            cpu_percent,
            temp_celsius,
            mem_used_bytes,
            mem_total_bytes,
            disk: disk_usage(&mut self.sys),
        }
    }

    async fn cpu_percent(&mut self) -> Reading<f64> {
        self.sys.refresh_cpu();
        tokio::time::sleep(CPU_SAMPLE_WINDOW).await;
        self.sys.refresh_cpu();

        let usage = self.sys.global_processor_info().cpu_usage();
        if usage.is_finite() {
            Reading::Measured(f64::from(usage).clamp(0.0, 100.0))
        } else {
            warn!("CPU usage not reported by the OS");
            Reading::Unavailable
        }
    }

    /// Thermal zone file first, then the hottest component sysinfo can see.
    pub fn temperature(&mut self) -> Reading<f64> {
        if let Reading::Measured(t) = read_thermal_zone(&self.thermal_path) {
            return Reading::Measured(t);
        }

        self.sys.refresh_components_list();
        let hottest = self
            .sys
            .components()
            .iter()
            .map(|c| f64::from(c.temperature()))
            .filter(|t| t.is_finite() && *t > 0.0)
            .fold(None, |acc: Option<f64>, t| Some(acc.map_or(t, |a| a.max(t))));

        if hottest.is_none() {
            debug!("No temperature sensor available");
        }
        hottest.into()
    }

}

/// Current usage of the root volume, read without any other sensor.
pub fn root_disk() -> Reading<DiskUsage> {
    disk_usage(&mut System::new())
}

fn disk_usage(sys: &mut System) -> Reading<DiskUsage> {
    sys.refresh_disks_list();
    sys.refresh_disks();
    let disks = sys
        .disks()
        .iter()
        .map(|d| (d.mount_point(), d.total_space(), d.available_space()));
    let usage = pick_root_disk(disks);
    if usage.is_none() {
        warn!("No mounted disk found for storage usage");
    }
    usage.into()
}

/// Reads a Linux thermal zone file, which holds millidegrees Celsius.
pub fn read_thermal_zone(path: &Path) -> Reading<f64> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Thermal zone unreadable");
            return Reading::Unavailable;
        }
    };

    match raw.trim().parse::<f64>() {
        Ok(milli) if milli.is_finite() => Reading::Measured(milli / 1000.0),
        _ => {
            warn!(path = %path.display(), value = raw.trim(), "Thermal zone value is not a number");
            Reading::Unavailable
        }
    }
}

/// Picks the volume mounted at `/`, falling back to the first listed one.
pub fn pick_root_disk<'a, I>(disks: I) -> Option<DiskUsage>
where
    I: IntoIterator<Item = (&'a Path, u64, u64)>,
{
    let mut first = None;
    for (mount, total, available) in disks {
        let usage = DiskUsage::from_space(total, available);
        if mount == Path::new("/") {
            return Some(usage);
        }
        first.get_or_insert(usage);
    }
    first
}
