use std::fmt::Write;
use std::path::Path;

use tracing::{info, warn};

use crate::alert::{Alert, AlertManager};
use crate::config::Config;
use crate::error::Result;
use crate::export::append_row;
use crate::metrics::{HostSample, MetricRow, NetworkSample, Reading};
use crate::sensors::SystemSampler;
use crate::speedtest::{run_speed_test, HttpSpeedProbe, SpeedProbe};

/// One Collector cycle: sample the host, run the speed test, append a row.
/// Only a failure to write the log is an error.
pub async fn run_collector(config: &Config, skip_speedtest: bool) -> Result<MetricRow> {
    println!("Sampling system metrics (waiting for speed test)...");

    let mut sampler = SystemSampler::new(&config.thermal_path);
    let host = sampler.sample().await;

    let network = if skip_speedtest || !config.speedtest.enabled {
        info!("Speed test disabled, network fields will be zero");
        NetworkSample::unavailable()
    } else {
        match HttpSpeedProbe::new(&config.speedtest) {
            Ok(probe) => measure_network(&probe, config).await,
            Err(e) => {
                warn!(error = %e, "Could not build speed test client");
                NetworkSample::unavailable()
            }
        }
    };

    record_sample(&config.log_file, &host, &network)
}

pub async fn measure_network(probe: &dyn SpeedProbe, config: &Config) -> NetworkSample {
    run_speed_test(probe, config.speedtest.attempts, config.speedtest.retry_delay).await
}

/// Prints the terminal summary and appends the row.
pub fn record_sample(log_file: &Path, host: &HostSample, network: &NetworkSample) -> Result<MetricRow> {
    let alerts = AlertManager::default().check(host);
    for alert in &alerts {
        warn!(level = %alert.level, "{}", alert.message);
    }
    print!("{}", terminal_summary(host, network, &alerts));

    let row = MetricRow::from_samples(host, network);
    append_row(log_file, &row)?;
    info!(path = %log_file.display(), time = %row.timestamp, "Row appended");
    println!("✅ Data saved to {}", log_file.display());
    Ok(row)
}

fn or_na(reading: Reading<f64>, render: impl Fn(f64) -> String) -> String {
    reading.measured().map(render).unwrap_or_else(|| "n/a".to_string())
}

pub fn terminal_summary(host: &HostSample, network: &NetworkSample, alerts: &[Alert]) -> String {
    let rule = "=".repeat(50);
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "⚡ SERVER MONITOR ⚡");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "🖥️  CPU Load    : {}", or_na(host.cpu_percent, |v| format!("{v:.2}%")));
    let _ = writeln!(out, "🌡️  CPU Temp    : {}", or_na(host.temp_celsius, |v| format!("{v:.1}°C")));
    let _ = writeln!(
        out,
        "🧠 RAM Usage   : {:.2} / {:.2} GB ({:.1}%)",
        host.ram_used_gb(),
        host.ram_total_gb(),
        host.ram_percent()
    );
    match host.disk.measured() {
        Some(disk) => {
            let _ = writeln!(
                out,
                "💾 Disk Usage  : {:.2} / {:.2} GB ({:.1}%)",
                disk.used_gb(),
                disk.total_gb(),
                disk.percent()
            );
        }
        None => {
            let _ = writeln!(out, "💾 Disk Usage  : n/a");
        }
    }
    let _ = writeln!(out, "{}", "-".repeat(50));
    let _ = writeln!(out, "📡 Ping        : {}", or_na(network.ping_ms, |v| format!("{v:.0} ms")));
    let _ = writeln!(out, "⬇️  Download    : {}", or_na(network.download_mbps, |v| format!("{v:.2} Mbps")));
    let _ = writeln!(out, "⬆️  Upload      : {}", or_na(network.upload_mbps, |v| format!("{v:.2} Mbps")));
    for alert in alerts {
        let _ = writeln!(out, "⚠️  {}", alert.message);
    }
    let _ = writeln!(out, "{rule}");
    out
}
