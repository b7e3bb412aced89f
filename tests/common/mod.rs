#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use streamrelay::application::usecases::DispatchEventUseCase;
use streamrelay::application::{AppError, AppResult, CooldownGate, EventPublisher, Host};
use streamrelay::domain::CooldownPolicy;
use streamrelay::infrastructure::memory_store::InMemoryRuleStore;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostCall {
    RunCommand(String),
    Broadcast(String),
}

/// Records every host call in order; optionally fails commands.
#[derive(Clone, Default)]
pub struct RecordingHost {
    calls: Arc<Mutex<Vec<HostCall>>>,
    fail_commands: bool,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_commands() -> Self {
        Self {
            fail_commands: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Host for RecordingHost {
    async fn run_command(&self, text: &str) -> AppResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(HostCall::RunCommand(text.to_string()));
        if self.fail_commands {
            return Err(AppError::Host("server offline".into()));
        }
        Ok(())
    }

    async fn broadcast(&self, text: &str) -> AppResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(HostCall::Broadcast(text.to_string()));
        Ok(())
    }
}

pub fn rules(entries: &[(&str, Vec<&str>)]) -> InMemoryRuleStore {
    let raw: HashMap<String, Vec<String>> = entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
        .collect();
    InMemoryRuleStore::from_raw(&raw)
}

pub fn engine(
    rules: InMemoryRuleStore,
    cooldowns: &[(&str, u64)],
    host: RecordingHost,
    publisher: Option<Arc<dyn EventPublisher>>,
) -> Arc<DispatchEventUseCase> {
    let policy = CooldownPolicy::new(
        cooldowns
            .iter()
            .map(|(k, ms)| (k.to_string(), *ms))
            .collect(),
    );
    Arc::new(DispatchEventUseCase {
        rules: Arc::new(rules),
        cooldowns: Arc::new(CooldownGate::new(policy)),
        host: Arc::new(host),
        publisher,
    })
}
