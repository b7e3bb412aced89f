use async_trait::async_trait;

use crate::application::{AppResult, Host};

pub struct MultiHost {
    hosts: Vec<Box<dyn Host>>,
}

impl MultiHost {
    pub fn new(hosts: Vec<Box<dyn Host>>) -> Self {
        Self { hosts }
    }
}

#[async_trait]
impl Host for MultiHost {
    async fn run_command(&self, text: &str) -> AppResult<()> {
        // every host gets the call; the last failure is reported
        let mut last_err = None;
        for h in &self.hosts {
            if let Err(e) = h.run_command(text).await {
                last_err = Some(e);
            }
        }
        last_err.map_or(Ok(()), Err)
    }

    async fn broadcast(&self, text: &str) -> AppResult<()> {
        let mut last_err = None;
        for h in &self.hosts {
            if let Err(e) = h.broadcast(text).await {
                last_err = Some(e);
            }
        }
        last_err.map_or(Ok(()), Err)
    }
}
