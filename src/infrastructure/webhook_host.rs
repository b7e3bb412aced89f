use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::application::{AppError, AppResult, Host};

/// Forwards host calls as JSON to a bridge running inside the host process.
pub struct WebhookHost {
    client: reqwest::Client,
    url: String,
}

impl WebhookHost {
    pub fn new(url: String, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Host(e.to_string()))?;
        Ok(Self { client, url })
    }

    async fn send(&self, kind: &str, text: &str) -> AppResult<()> {
        let payload = HostAction { kind, text };

        self.client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Host(e.to_string()))?
            .error_for_status()
            .map_err(|e| AppError::Host(e.to_string()))?;

        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct HostAction<'a> {
    kind: &'a str,
    text: &'a str,
}

#[async_trait]
impl Host for WebhookHost {
    async fn run_command(&self, text: &str) -> AppResult<()> {
        self.send("command", text).await
    }

    async fn broadcast(&self, text: &str) -> AppResult<()> {
        self.send("broadcast", text).await
    }
}
