use async_trait::async_trait;

use crate::application::{AppResult, Host};

/// Prints host calls to stdout; the `--dry-run` host.
pub struct ConsoleHost;

impl ConsoleHost {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Host for ConsoleHost {
    async fn run_command(&self, text: &str) -> AppResult<()> {
        println!("COMMAND: {}", text);
        Ok(())
    }

    async fn broadcast(&self, text: &str) -> AppResult<()> {
        println!("BROADCAST: {}", text);
        Ok(())
    }
}
