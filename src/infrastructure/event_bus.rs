use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::application::{AppResult, DispatchRecord, EventPublisher};

#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DispatchRecord>,
}

impl EventBus {
    pub fn new(buffer: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DispatchRecord> {
        self.tx.subscribe()
    }

    pub fn send(&self, record: DispatchRecord) {
        // no subscribers is fine; slow ones lag and miss records
        let _ = self.tx.send(record);
    }
}

#[async_trait]
impl EventPublisher for EventBus {
    async fn publish(&self, record: &DispatchRecord) -> AppResult<()> {
        self.send(record.clone());
        Ok(())
    }
}
