use std::fmt;

use crate::metrics::HostSample;

/// Temperature above which a reading is flagged, in °C.
pub const HOT_TEMPERATURE_C: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Warning,
    Critical,
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlertLevel::Warning => "warning",
            AlertLevel::Critical => "critical",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub message: String,
    pub level: AlertLevel,
}

#[derive(Debug, Clone)]
pub enum AlertRule {
    Temperature { threshold: f64, level: AlertLevel },
    CpuUsage { threshold: f64, level: AlertLevel },
    MemUsage { threshold: f64, level: AlertLevel },
    DiskUsage { threshold: f64, level: AlertLevel },
}

impl AlertRule {
    pub fn check(&self, sample: &HostSample) -> Option<Alert> {
        match *self {
            AlertRule::Temperature { threshold, level } => {
                let temp = sample.temp_celsius.measured()?;
                (temp > threshold).then(|| Alert {
                    message: format!("CPU temperature high: {temp:.1}°C"),
                    level,
                })
            }
            AlertRule::CpuUsage { threshold, level } => {
                let cpu = sample.cpu_percent.measured()?;
                (cpu > threshold).then(|| Alert {
                    message: format!("CPU usage high: {cpu:.1}%"),
                    level,
                })
            }
            AlertRule::MemUsage { threshold, level } => {
                let percent = sample.ram_percent();
                (percent > threshold).then(|| Alert {
                    message: format!("Memory usage high: {percent:.1}%"),
                    level,
                })
            }
            AlertRule::DiskUsage { threshold, level } => {
                let percent = sample.disk.measured()?.percent();
                (percent > threshold).then(|| Alert {
                    message: format!("Disk usage high: {percent:.1}%"),
                    level,
                })
            }
        }
    }
}

pub struct AlertManager {
    pub rules: Vec<AlertRule>,
}

impl Default for AlertManager {
    fn default() -> Self {
        Self {
            rules: vec![
                AlertRule::Temperature { threshold: HOT_TEMPERATURE_C, level: AlertLevel::Warning },
                AlertRule::CpuUsage { threshold: 90.0, level: AlertLevel::Warning },
                AlertRule::MemUsage { threshold: 90.0, level: AlertLevel::Warning },
                AlertRule::DiskUsage { threshold: 95.0, level: AlertLevel::Critical },
            ],
        }
    }
}

impl AlertManager {
    pub fn check(&self, sample: &HostSample) -> Vec<Alert> {
        self.rules.iter().filter_map(|rule| rule.check(sample)).collect()
    }
}

/// Whether a logged temperature cell should be highlighted in the report.
pub fn is_hot(temp_celsius: f64) -> bool {
    temp_celsius > HOT_TEMPERATURE_C
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{DiskUsage, Reading};
    use chrono::Local;

    fn sample(cpu: f64, temp: Reading<f64>) -> HostSample {
        HostSample {
            taken_at: Local::now(),
            cpu_percent: Reading::Measured(cpu),
            temp_celsius: temp,
            mem_used_bytes: 1,
            mem_total_bytes: 4,
            disk: Reading::Measured(DiskUsage::from_space(100, 2)),
        }
    }

    #[test]
    fn threshold_is_exclusive() {
        assert!(!is_hot(60.0));
        assert!(is_hot(60.1));
        assert!(!is_hot(55.0));
    }

    #[test]
    fn manager_reports_hot_busy_full_host() {
        let alerts = AlertManager::default().check(&sample(97.0, Reading::Measured(71.5)));
        let messages: Vec<&str> = alerts.iter().map(|a| a.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "CPU temperature high: 71.5°C",
                "CPU usage high: 97.0%",
                "Disk usage high: 98.0%",
            ]
        );
        assert_eq!(alerts[2].level, AlertLevel::Critical);
    }

    #[test]
    fn unavailable_temperature_never_alerts() {
        let alerts = AlertManager::default().check(&sample(10.0, Reading::Unavailable));
        assert!(alerts.iter().all(|a| !a.message.contains("temperature")));
    }
}
