use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::config::SpeedTestConfig;
use crate::metrics::{NetworkSample, Reading};

const PING_ROUNDS: usize = 3;

/// Measures latency and throughput against some remote endpoint.
///
/// [`HttpSpeedProbe`] is the default. It times single HTTP transfers, which
/// only approximates what a dedicated speed test service would report;
/// swap in another implementation for server selection or multi-stream
/// throughput.
#[async_trait]
pub trait SpeedProbe: Send + Sync {
    async fn measure(&self) -> Result<NetworkSample>;
}

/// Times plain HTTP transfers against configurable endpoints.
pub struct HttpSpeedProbe {
    client: reqwest::Client,
    ping_url: String,
    download_url: String,
    upload_url: String,
    upload_bytes: usize,
}

impl HttpSpeedProbe {
    pub fn new(config: &SpeedTestConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("sysreport/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            ping_url: config.ping_url.clone(),
            download_url: config.download_url.clone(),
            upload_url: config.upload_url.clone(),
            upload_bytes: config.upload_bytes,
        })
    }

    async fn ping_ms(&self) -> Result<f64> {
        let mut best: Option<Duration> = None;
        for _ in 0..PING_ROUNDS {
            let start = Instant::now();
            self.client
                .get(&self.ping_url)
                .send()
                .await
                .context("ping request failed")?
                .error_for_status()
                .context("ping endpoint returned an error status")?;
            let elapsed = start.elapsed();
            best = Some(best.map_or(elapsed, |b| b.min(elapsed)));
        }
        Ok(best.unwrap_or_default().as_secs_f64() * 1000.0)
    }

    async fn download_mbps(&self) -> Result<f64> {
        let start = Instant::now();
        let mut resp = self
            .client
            .get(&self.download_url)
            .send()
            .await
            .context("download request failed")?
            .error_for_status()
            .context("download endpoint returned an error status")?;

        let mut received = 0usize;
        while let Some(chunk) = resp.chunk().await.context("download interrupted")? {
            received += chunk.len();
        }
        Ok(megabits_per_second(received, start.elapsed()))
    }

    async fn upload_mbps(&self) -> Result<f64> {
        let payload = vec![0u8; self.upload_bytes];
        let start = Instant::now();
        self.client
            .post(&self.upload_url)
            .body(payload)
            .send()
            .await
            .context("upload request failed")?
            .error_for_status()
            .context("upload endpoint returned an error status")?;
        Ok(megabits_per_second(self.upload_bytes, start.elapsed()))
    }
}

#[async_trait]
impl SpeedProbe for HttpSpeedProbe {
    async fn measure(&self) -> Result<NetworkSample> {
        let ping = self.ping_ms().await?;
        let download = self.download_mbps().await?;
        let upload = self.upload_mbps().await?;
        Ok(NetworkSample {
            ping_ms: Reading::Measured(ping),
            download_mbps: Reading::Measured(download),
            upload_mbps: Reading::Measured(upload),
        })
    }
}

pub fn megabits_per_second(bytes: usize, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        bytes as f64 * 8.0 / secs / 1_000_000.0
    } else {
        0.0
    }
}

/// Runs the probe up to `attempts` times. Never fails: after the last failed
/// attempt every field is reported unavailable.
pub async fn run_speed_test(
    probe: &dyn SpeedProbe,
    attempts: u32,
    retry_delay: Duration,
) -> NetworkSample {
    let attempts = attempts.max(1);
    for attempt in 1..=attempts {
        info!(attempt, "Running speed test");
        match probe.measure().await {
            Ok(sample) => return sample,
            Err(e) if attempt < attempts => {
                let reason = format!("{e:#}");
                warn!(attempt, error = %reason, "Speed test failed, retrying");
                tokio::time::sleep(retry_delay).await;
            }
            Err(e) => {
                let reason = format!("{e:#}");
                error!(attempts, error = %reason, "Speed test failed, logging zeros");
            }
        }
    }
    NetworkSample::unavailable()
}
