use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;
use tracing::{debug, warn};

use crate::error::{Result, SysReportError};

pub const WEBHOOK_URL_KEY: &str = "DISCORD_WEBHOOK_URL";
const LOG_FILE_KEY: &str = "SYSREPORT_LOG_FILE";
const REPORT_DIR_KEY: &str = "SYSREPORT_REPORT_DIR";
const THERMAL_PATH_KEY: &str = "SYSREPORT_THERMAL_PATH";
const SPEEDTEST_KEY: &str = "SYSREPORT_SPEEDTEST";
const SPEEDTEST_PING_URL_KEY: &str = "SYSREPORT_SPEEDTEST_PING_URL";
const SPEEDTEST_DOWNLOAD_URL_KEY: &str = "SYSREPORT_SPEEDTEST_DOWNLOAD_URL";
const SPEEDTEST_UPLOAD_URL_KEY: &str = "SYSREPORT_SPEEDTEST_UPLOAD_URL";
const SPEEDTEST_ATTEMPTS_KEY: &str = "SYSREPORT_SPEEDTEST_ATTEMPTS";
const SPEEDTEST_RETRY_SECS_KEY: &str = "SYSREPORT_SPEEDTEST_RETRY_SECS";

const DEFAULT_LOG_FILE: &str = "daily_log.csv";
const DEFAULT_THERMAL_PATH: &str = "/sys/class/thermal/thermal_zone0/temp";
const DEFAULT_PING_URL: &str = "https://speed.cloudflare.com/__down?bytes=0";
const DEFAULT_DOWNLOAD_URL: &str = "https://speed.cloudflare.com/__down?bytes=25000000";
const DEFAULT_UPLOAD_URL: &str = "https://speed.cloudflare.com/__up";
const DEFAULT_UPLOAD_BYTES: usize = 10_000_000;
const DEFAULT_SPEEDTEST_ATTEMPTS: u32 = 3;
const DEFAULT_SPEEDTEST_RETRY_SECS: u64 = 15;

#[derive(Clone, Debug)]
pub struct SpeedTestConfig {
    pub enabled: bool,
    pub ping_url: String,
    pub download_url: String,
    pub upload_url: String,
    pub upload_bytes: usize,
    pub attempts: u32,
    pub retry_delay: Duration,
}

impl Default for SpeedTestConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ping_url: DEFAULT_PING_URL.to_string(),
            download_url: DEFAULT_DOWNLOAD_URL.to_string(),
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            upload_bytes: DEFAULT_UPLOAD_BYTES,
            attempts: DEFAULT_SPEEDTEST_ATTEMPTS,
            retry_delay: Duration::from_secs(DEFAULT_SPEEDTEST_RETRY_SECS),
        }
    }
}

/// Settings for one invocation. Built once from the environment and passed
/// down explicitly.
#[derive(Clone, Debug)]
pub struct Config {
    pub log_file: PathBuf,
    pub report_dir: PathBuf,
    pub thermal_path: PathBuf,
    pub webhook_url: Option<String>,
    pub speedtest: SpeedTestConfig,
}

impl Config {
    /// Merges a `.env` file from the working directory (if any) into the
    /// process environment, then reads the settings.
    pub fn from_env() -> Self {
        match dotenv::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
            Err(e) => debug!(error = %e, "No .env file loaded"),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let defaults = SpeedTestConfig::default();
        let speedtest = SpeedTestConfig {
            enabled: get(SPEEDTEST_KEY).map_or(true, |v| !is_off(&v)),
            ping_url: get(SPEEDTEST_PING_URL_KEY).unwrap_or(defaults.ping_url),
            download_url: get(SPEEDTEST_DOWNLOAD_URL_KEY).unwrap_or(defaults.download_url),
            upload_url: get(SPEEDTEST_UPLOAD_URL_KEY).unwrap_or(defaults.upload_url),
            upload_bytes: defaults.upload_bytes,
            attempts: parse_or(SPEEDTEST_ATTEMPTS_KEY, get(SPEEDTEST_ATTEMPTS_KEY), defaults.attempts),
            retry_delay: Duration::from_secs(parse_or(
                SPEEDTEST_RETRY_SECS_KEY,
                get(SPEEDTEST_RETRY_SECS_KEY),
                DEFAULT_SPEEDTEST_RETRY_SECS,
            )),
        };

        Self {
            log_file: get(LOG_FILE_KEY)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
            report_dir: get(REPORT_DIR_KEY)
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            thermal_path: get(THERMAL_PATH_KEY)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_THERMAL_PATH)),
            webhook_url: get(WEBHOOK_URL_KEY),
            speedtest,
        }
    }

    /// The webhook is mandatory for reporting. Checked before any report work
    /// starts.
    pub fn require_webhook(&self) -> Result<Url> {
        let raw = self
            .webhook_url
            .as_deref()
            .ok_or(SysReportError::MissingWebhook(WEBHOOK_URL_KEY))?;

        match Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url),
            _ => Err(SysReportError::InvalidWebhook {
                key: WEBHOOK_URL_KEY,
                value: raw.to_string(),
            }),
        }
    }
}

fn is_off(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "0" | "off" | "false" | "no" | "disabled"
    )
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> T
where
    T: std::str::FromStr + Copy + std::fmt::Display,
{
    match value {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, default = %default, "Invalid number, using default");
            default
        }),
        None => default,
    }
}
