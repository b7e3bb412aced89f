use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::domain::CooldownPolicy;

/// Last successful firing per event key.
///
/// The check and the update happen under the entry's shard lock, so two callers racing on the
/// same key cannot both get through one cooldown window. Unrelated keys rarely contend.
#[derive(Debug, Default)]
pub struct CooldownGate {
    policy: CooldownPolicy,
    last_fired: DashMap<String, u64>,
}

impl CooldownGate {
    pub fn new(policy: CooldownPolicy) -> Self {
        Self {
            policy,
            last_fired: DashMap::new(),
        }
    }

    /// Returns true and records `now_ms` if the key may fire; leaves state untouched otherwise.
    pub fn try_fire(&self, event_key: &str, now_ms: u64) -> bool {
        let cooldown = self.policy.cooldown_ms(event_key);
        match self.last_fired.entry(event_key.to_string()) {
            Entry::Occupied(mut e) => {
                if now_ms.saturating_sub(*e.get()) < cooldown {
                    return false;
                }
                e.insert(now_ms);
                true
            }
            Entry::Vacant(e) => {
                e.insert(now_ms);
                true
            }
        }
    }
}

pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
