use std::collections::HashMap;

/// Per event key minimum gap between two firings, in milliseconds.
#[derive(Clone, Debug, Default)]
pub struct CooldownPolicy {
    durations: HashMap<String, u64>,
}

impl CooldownPolicy {
    pub fn new(durations: HashMap<String, u64>) -> Self {
        Self { durations }
    }

    /// 0 when the key has no configured cooldown.
    pub fn cooldown_ms(&self, event_key: &str) -> u64 {
        self.durations.get(event_key).copied().unwrap_or(0)
    }
}
