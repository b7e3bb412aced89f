use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, bail};
use serde::Deserialize;

use crate::infrastructure::memory_store::DEFAULT_SEEN_CAPACITY;
use crate::infrastructure::streamlabs_provider::DEFAULT_DONATIONS_URL;

pub const MIN_SEEN_CAPACITY: usize = 10;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub streamlabs: StreamlabsCfg,
    #[serde(default)]
    pub twitch: TwitchCfg,
    pub http: Option<HttpCfg>,
    #[serde(default)]
    pub host: HostCfg,
    /// event key -> cooldown in milliseconds
    #[serde(default)]
    pub cooldowns: HashMap<String, u64>,
    /// Extra YAML file of `event_key: [rules]`, relative to the config file.
    pub actions_file: Option<String>,
    /// event key -> `type:template` rule strings
    #[serde(default)]
    pub actions: HashMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct StreamlabsCfg {
    pub access_token: String,
    #[serde(default = "default_donations_url")]
    pub url: String,
    /// milliseconds
    #[serde(default = "default_check_interval")]
    pub check_interval: u64,
    /// milliseconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_seen_capacity")]
    pub seen_capacity: usize,
    #[serde(default)]
    pub skip_backlog: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TwitchCfg {
    pub channel_id: Option<String>,
    pub channel_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HttpCfg {
    #[serde(default = "default_bind")]
    pub bind: String,
    pub api_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HostCfg {
    pub webhook_url: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for HostCfg {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout: default_timeout(),
        }
    }
}

fn default_donations_url() -> String {
    DEFAULT_DONATIONS_URL.to_string()
}

fn default_check_interval() -> u64 {
    5000
}

fn default_timeout() -> u64 {
    5000
}

fn default_seen_capacity() -> usize {
    DEFAULT_SEEN_CAPACITY
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

impl Config {
    pub fn load_from_file(path: &str) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let mut cfg = Self::from_yaml_str(&raw)?;

        if let Some(file) = cfg.actions_file.clone() {
            let base = Path::new(path).parent().unwrap_or_else(|| Path::new("."));
            let actions_path = base.join(&file);
            let raw = std::fs::read_to_string(&actions_path)
                .with_context(|| format!("reading actions file {}", actions_path.display()))?;
            cfg.merge_actions(&raw)?;
        }

        Ok(cfg)
    }

    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        let raw = expand_env(raw, std::env::vars());
        let cfg: Config = serde_yaml::from_str(&raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Entries from `raw` replace inline entries with the same event key.
    pub fn merge_actions(&mut self, raw: &str) -> anyhow::Result<()> {
        let raw = expand_env(raw, std::env::vars());
        let extra: Option<HashMap<String, Vec<String>>> = serde_yaml::from_str(&raw)?;
        self.actions.extend(extra.unwrap_or_default());
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.streamlabs.access_token.trim().is_empty() {
            bail!("streamlabs.access_token must be set");
        }
        if self.streamlabs.check_interval == 0 {
            bail!("streamlabs.check_interval must be greater than 0");
        }
        if self.streamlabs.timeout == 0 || self.host.timeout == 0 {
            bail!("timeouts must be greater than 0");
        }
        if self.streamlabs.seen_capacity < MIN_SEEN_CAPACITY {
            bail!("streamlabs.seen_capacity must be at least {MIN_SEEN_CAPACITY}");
        }
        Ok(())
    }

    /// Backlog skipping only makes sense for a long-running poller: a single `--once` tick
    /// would prime the seen set and dispatch nothing.
    pub fn effective_skip_backlog(&self, once: bool) -> bool {
        if once && self.streamlabs.skip_backlog {
            tracing::warn!("streamlabs.skip_backlog is ignored with --once");
            return false;
        }
        self.streamlabs.skip_backlog
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.streamlabs.check_interval)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.streamlabs.timeout)
    }

    pub fn host_timeout(&self) -> Duration {
        Duration::from_millis(self.host.timeout)
    }
}

/// very small ${VAR} expansion to keep config simple
fn expand_env(s: &str, vars: impl IntoIterator<Item = (String, String)>) -> String {
    let mut out = s.to_string();
    for (k, v) in vars {
        out = out.replace(&format!("${{{}}}", k), &v);
    }
    out
}
