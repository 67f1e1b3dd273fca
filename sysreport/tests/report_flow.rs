use std::path::Path;

use chrono::{Local, NaiveDate, TimeZone};
use reqwest::Url;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use sysreport::collector::record_sample;
use sysreport::config::Config;
use sysreport::delivery::{DeliveryOutcome, WebhookClient};
use sysreport::export::read_log;
use sysreport::metrics::{DiskUsage, HostSample, NetworkSample, Reading};
use sysreport::reporter::{generate_and_deliver, report_path};
use sysreport::summary::{average_columns, StorageSummary};

/// Accepts one request, answers with `status`, and hands back the raw request.
async fn one_shot_webhook(status_line: &'static str) -> (Url, JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 8192];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            if request_complete(&request) {
                break;
            }
        }
        let response = format!("HTTP/1.1 {status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });
    (Url::parse(&format!("http://{addr}/webhook")).unwrap(), handle)
}

fn request_complete(request: &[u8]) -> bool {
    let Some(header_end) = find(request, b"\r\n\r\n") else {
        return false;
    };
    let head = String::from_utf8_lossy(&request[..header_end]).to_ascii_lowercase();
    let body = &request[header_end + 4..];
    if let Some(len) = head
        .lines()
        .find_map(|l| l.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
    {
        return body.len() >= len;
    }
    head.contains("transfer-encoding: chunked") && body.ends_with(b"0\r\n\r\n")
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn sample(hour: u32, cpu: f64, temp: f64, ram_gib: u64) -> HostSample {
    HostSample {
        taken_at: Local.with_ymd_and_hms(2026, 10, 16, hour, 0, 0).unwrap(),
        cpu_percent: Reading::Measured(cpu),
        temp_celsius: Reading::Measured(temp),
        mem_used_bytes: ram_gib * 1024 * 1024 * 1024,
        mem_total_bytes: 8 * 1024 * 1024 * 1024,
        disk: Reading::Measured(DiskUsage::from_space(100, 40)),
    }
}

fn network(ping: f64, dl: f64, ul: f64) -> NetworkSample {
    NetworkSample {
        ping_ms: Reading::Measured(ping),
        download_mbps: Reading::Measured(dl),
        upload_mbps: Reading::Measured(ul),
    }
}

fn config_in(dir: &Path) -> Config {
    let mut config = Config::from_lookup(|_| None);
    config.log_file = dir.join("daily_log.csv");
    config.report_dir = dir.join("out");
    std::fs::create_dir_all(&config.report_dir).unwrap();
    config
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

#[tokio::test]
async fn logged_rows_are_averaged_and_delivered() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    record_sample(&config.log_file, &sample(9, 50.0, 55.0, 4), &network(20.0, 100.0, 10.0)).unwrap();
    record_sample(&config.log_file, &sample(10, 60.0, 65.0, 5), &network(30.0, 120.0, 12.0)).unwrap();

    let averages = average_columns(&read_log(&config.log_file));
    assert_eq!(averages.cpu_percent, 55.0);
    assert_eq!(averages.temp_celsius, 60.0);
    assert_eq!(averages.ram_gb, 4.5);
    assert_eq!(averages.ping_ms, 25.0);
    assert_eq!(averages.download_mbps, 110.0);
    assert_eq!(averages.upload_mbps, 11.0);

    let (url, server) = one_shot_webhook("204 No Content").await;
    let client = WebhookClient::new(url).unwrap();
    let storage = StorageSummary {
        total_gb: 58.0,
        used_gb: 12.5,
        percent: 21.6,
    };
    let outcome = generate_and_deliver(&config, date(), storage, &client).await.unwrap();
    assert_eq!(outcome, DeliveryOutcome::Delivered(204));

    let request = server.await.unwrap();
    let text = String::from_utf8_lossy(&request);
    assert!(text.starts_with("POST /webhook"));
    assert!(text.contains("name=\"content\""));
    assert!(text.contains("Daily Report (2026-10-16)"));
    assert!(text.contains("filename=\"report_2026-10-16.pdf\""));
    assert!(find(&request, b"%PDF").is_some());

    assert!(!report_path(&config.report_dir, date()).exists());
    assert_eq!(read_log(&config.log_file).len(), 2, "log is kept after reporting");
}

#[tokio::test]
async fn rejected_delivery_still_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let (url, server) = one_shot_webhook("500 Internal Server Error").await;
    let client = WebhookClient::new(url).unwrap();
    let outcome = generate_and_deliver(&config, date(), StorageSummary::default(), &client)
        .await
        .unwrap();
    server.await.unwrap();

    assert!(matches!(outcome, DeliveryOutcome::Rejected { status: 500, .. }));
    assert!(!report_path(&config.report_dir, date()).exists());
    assert!(!config.log_file.exists(), "reporting never creates the log");
}

#[tokio::test]
async fn empty_log_reports_zero_averages() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    std::fs::write(&config.log_file, "Jam,CPU_%,Suhu_C,RAM_GB,Ping_ms,DL_Mbps,UL_Mbps\n").unwrap();

    let (url, server) = one_shot_webhook("200 OK").await;
    let client = WebhookClient::new(url).unwrap();
    let outcome = generate_and_deliver(&config, date(), StorageSummary::default(), &client)
        .await
        .unwrap();

    let request = server.await.unwrap();
    let text = String::from_utf8_lossy(&request);
    assert!(outcome.is_delivered());
    assert!(text.contains("RAM: 0.00GB"));
    assert!(text.contains("Temp: 0.0°C"));
}
