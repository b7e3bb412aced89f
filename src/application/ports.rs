use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{ActionRule, DonationId, Event};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("provider error: {0}")]
    Provider(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("host error: {0}")]
    Host(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// What the dispatch engine did with one event, published for live subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRecord {
    pub event: Event,
    pub fired: usize,
    pub at_millis: u64,
}

/// Fetch the current donation feed as raw records, in provider order.
#[async_trait]
pub trait DonationSource: Send + Sync {
    async fn fetch(&self) -> AppResult<Vec<Value>>;
}

/// Ids of donation records already handed to dispatch.
#[async_trait]
pub trait SeenStore: Send + Sync {
    async fn has_seen(&self, id: &DonationId) -> AppResult<bool>;
    async fn mark_seen(&self, id: &DonationId) -> AppResult<()>;
    /// Make room for at least `min_capacity` ids. Returns true if the store grew.
    async fn reserve(&self, min_capacity: usize) -> AppResult<bool>;
}

/// event key -> ordered action rules
#[async_trait]
pub trait RuleStore: Send + Sync {
    async fn rules_for(&self, event_key: &str) -> AppResult<Vec<ActionRule>>;
}

/// The two side effects the host exposes.
#[async_trait]
pub trait Host: Send + Sync {
    /// Run with console privileges.
    async fn run_command(&self, text: &str) -> AppResult<()>;
    /// Send to every connected participant.
    async fn broadcast(&self, text: &str) -> AppResult<()>;
}

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, record: &DispatchRecord) -> AppResult<()>;
}
