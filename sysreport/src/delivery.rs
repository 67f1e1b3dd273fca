use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::{StatusCode, Url};
use tracing::{info, warn};

use crate::error::Result;

const MAX_BODY_LOG_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryOutcome {
    Delivered(u16),
    Rejected { status: u16, body: String },
    Failed(String),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered(_))
    }
}

/// Posts a document plus caption to a chat webhook as `multipart/form-data`
/// (`content` text field, `file` attachment). One attempt, no retries.
pub struct WebhookClient {
    client: reqwest::Client,
    url: Url,
}

impl WebhookClient {
    pub fn new(url: Url) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("sysreport/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, url })
    }

    pub async fn deliver_file(&self, path: &Path, file_name: &str, caption: &str) -> DeliveryOutcome {
        match tokio::fs::read(path).await {
            Ok(bytes) => self.deliver(bytes, file_name, caption).await,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read report for upload");
                DeliveryOutcome::Failed(format!("could not read {}: {e}", path.display()))
            }
        }
    }

    pub async fn deliver(&self, document: Vec<u8>, file_name: &str, caption: &str) -> DeliveryOutcome {
        let part = match Part::bytes(document)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")
        {
            Ok(part) => part,
            Err(e) => return DeliveryOutcome::Failed(e.to_string()),
        };
        let form = Form::new().text("content", caption.to_string()).part("file", part);

        let resp = match self.client.post(self.url.clone()).multipart(form).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = %e, "Webhook request failed");
                return DeliveryOutcome::Failed(e.to_string());
            }
        };

        let status = resp.status();
        if status == StatusCode::OK || status == StatusCode::NO_CONTENT {
            info!(status = status.as_u16(), "Report delivered");
            return DeliveryOutcome::Delivered(status.as_u16());
        }

        let body = match resp.text().await {
            Ok(text) => truncate(&text, MAX_BODY_LOG_CHARS),
            Err(e) => format!("[failed to read response body: {e}]"),
        };
        warn!(status = status.as_u16(), body = %body, "Webhook rejected the report");
        DeliveryOutcome::Rejected {
            status: status.as_u16(),
            body,
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
