use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::application::{AppError, AppResult, DonationSource};

/// Replays scripted fetch results in order; an exhausted script returns an empty feed.
#[derive(Default)]
pub struct FakeDonationSource {
    script: Mutex<VecDeque<AppResult<Vec<Value>>>>,
}

impl FakeDonationSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_batch(&self, records: Vec<Value>) -> &Self {
        if let Ok(mut s) = self.script.lock() {
            s.push_back(Ok(records));
        }
        self
    }

    pub fn push_failure(&self, reason: &str) -> &Self {
        if let Ok(mut s) = self.script.lock() {
            s.push_back(Err(AppError::Provider(reason.to_string())));
        }
        self
    }
}

#[async_trait]
impl DonationSource for FakeDonationSource {
    async fn fetch(&self) -> AppResult<Vec<Value>> {
        let mut s = self
            .script
            .lock()
            .map_err(|_| AppError::Provider("lock poisoned".into()))?;
        s.pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}
