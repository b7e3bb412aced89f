use std::sync::Arc;

use crate::application::{
    CooldownGate, DispatchRecord, EventPublisher, Host, RuleStore, now_millis,
};
use crate::domain::{ActionKind, Event};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Cooldown still running; nothing ran.
    Suppressed,
    /// Number of host calls issued (unknown kinds excluded).
    Fired(usize),
}

/// Cooldown check, rule lookup, rendering and host calls for one event.
/// Shared by the poller and the push ingress.
pub struct DispatchEventUseCase {
    pub rules: Arc<dyn RuleStore>,
    pub cooldowns: Arc<CooldownGate>,
    pub host: Arc<dyn Host>,
    pub publisher: Option<Arc<dyn EventPublisher>>,
}

impl DispatchEventUseCase {
    pub async fn execute(&self, event: &Event) -> DispatchOutcome {
        self.execute_at(event, now_millis()).await
    }

    pub async fn execute_at(&self, event: &Event, now_ms: u64) -> DispatchOutcome {
        if !self.cooldowns.try_fire(&event.event_key, now_ms) {
            tracing::debug!(event_key = %event.event_key, "on cooldown, skipping");
            return DispatchOutcome::Suppressed;
        }

        let rules = match self.rules.rules_for(&event.event_key).await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(event_key = %event.event_key, "rule lookup failed: {e}");
                Vec::new()
            }
        };

        let mut fired = 0;
        for rule in &rules {
            let text = rule.render(event);
            // host outcome is not ours to act on; a failure never stops the next rule
            let result = match &rule.kind {
                ActionKind::Command => self.host.run_command(&text).await,
                ActionKind::Broadcast => self.host.broadcast(&text).await,
                ActionKind::Unknown(kind) => {
                    tracing::warn!(event_key = %event.event_key, "Unknown action type: {kind}");
                    continue;
                }
            };
            fired += 1;
            if let Err(e) = result {
                tracing::warn!(event_key = %event.event_key, kind = %rule.kind, "host call failed: {e}");
            }
        }

        tracing::info!(
            event_key = %event.event_key,
            username = %event.username,
            fired,
            "event dispatched"
        );

        if let Some(publisher) = &self.publisher {
            let record = DispatchRecord {
                event: event.clone(),
                fired,
                at_millis: now_ms,
            };
            if let Err(e) = publisher.publish(&record).await {
                tracing::debug!("publish dispatch record failed: {e}");
            }
        }

        DispatchOutcome::Fired(fired)
    }
}
