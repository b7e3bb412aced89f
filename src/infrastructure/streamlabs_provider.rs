use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;
use serde_json::Value;

use crate::application::{AppError, AppResult, DonationSource};

pub const DEFAULT_DONATIONS_URL: &str = "https://streamlabs.com/api/v1.0/donations";

pub struct StreamlabsDonationSource {
    client: reqwest::Client,
    url: String,
    access_token: String,
}

impl StreamlabsDonationSource {
    pub fn new(url: String, access_token: String, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Provider(e.to_string()))?;
        Ok(Self {
            client,
            url,
            access_token,
        })
    }
}

#[derive(Debug, Deserialize)]
struct DonationsResp {
    data: Vec<Value>,
}

#[async_trait]
impl DonationSource for StreamlabsDonationSource {
    async fn fetch(&self) -> AppResult<Vec<Value>> {
        let resp = self
            .client
            .get(&self.url)
            .query(&[("access_token", self.access_token.as_str())])
            .header(USER_AGENT, "streamrelay")
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| AppError::Provider(e.to_string()))?
            .error_for_status()
            .map_err(|e| AppError::Provider(e.to_string()))?;

        let body: DonationsResp = resp
            .json()
            .await
            .map_err(|e| AppError::Provider(e.to_string()))?;

        Ok(body.data)
    }
}
