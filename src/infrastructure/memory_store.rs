use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::application::{AppError, AppResult, RuleStore, SeenStore};
use crate::domain::{ActionRule, DonationId};

pub const DEFAULT_SEEN_CAPACITY: usize = 1000;

/// Seen donation ids, capped at `capacity`. Lookups and inserts both refresh an id,
/// so the least recently touched id is forgotten first.
#[derive(Clone)]
pub struct InMemorySeenStore {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    capacity: usize,
    tick: u64,
    seen: HashMap<DonationId, u64>,
    // (id, stamp) in touch order; entries whose stamp no longer matches `seen` are stale
    order: VecDeque<(DonationId, u64)>,
}

impl Inner {
    fn touch(&mut self, id: &DonationId) {
        self.tick += 1;
        let stamp = self.tick;
        self.seen.insert(id.clone(), stamp);
        self.order.push_back((id.clone(), stamp));
        self.evict();
    }

    fn evict(&mut self) {
        while self.seen.len() > self.capacity {
            let Some((oldest, stamp)) = self.order.pop_front() else {
                break;
            };
            if self.seen.get(&oldest) == Some(&stamp) {
                self.seen.remove(&oldest);
            }
        }
        if self.order.len() > self.capacity.saturating_mul(2) {
            let seen = &self.seen;
            self.order.retain(|(id, stamp)| seen.get(id) == Some(stamp));
        }
    }
}

impl InMemorySeenStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                capacity: capacity.max(1),
                tick: 0,
                seen: HashMap::new(),
                order: VecDeque::new(),
            })),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|i| i.seen.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().map(|i| i.capacity).unwrap_or(0)
    }
}

impl Default for InMemorySeenStore {
    fn default() -> Self {
        Self::new(DEFAULT_SEEN_CAPACITY)
    }
}

#[async_trait]
impl SeenStore for InMemorySeenStore {
    async fn has_seen(&self, id: &DonationId) -> AppResult<bool> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| AppError::Storage("lock poisoned".into()))?;
        if inner.seen.contains_key(id) {
            inner.touch(id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn mark_seen(&self, id: &DonationId) -> AppResult<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| AppError::Storage("lock poisoned".into()))?;
        inner.touch(id);
        Ok(())
    }

    async fn reserve(&self, min_capacity: usize) -> AppResult<bool> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| AppError::Storage("lock poisoned".into()))?;
        if min_capacity <= inner.capacity {
            return Ok(false);
        }
        inner.capacity = min_capacity;
        Ok(true)
    }
}

/// Action rules loaded once from config, read-only afterwards.
#[derive(Clone, Default)]
pub struct InMemoryRuleStore {
    rules: Arc<HashMap<String, Vec<ActionRule>>>,
}

impl InMemoryRuleStore {
    pub fn new(rules: HashMap<String, Vec<ActionRule>>) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }

    /// Parses `type:template` strings per event key. Malformed strings are logged and dropped;
    /// the remaining rules of that key keep their order.
    pub fn from_raw(raw: &HashMap<String, Vec<String>>) -> Self {
        let mut rules = HashMap::with_capacity(raw.len());
        for (event_key, lines) in raw {
            let mut parsed = Vec::with_capacity(lines.len());
            for line in lines {
                match ActionRule::parse(line) {
                    Ok(rule) => parsed.push(rule),
                    Err(e) => tracing::warn!(event_key = %event_key, "skipping rule: {e}"),
                }
            }
            rules.insert(event_key.clone(), parsed);
        }
        Self::new(rules)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl RuleStore for InMemoryRuleStore {
    async fn rules_for(&self, event_key: &str) -> AppResult<Vec<ActionRule>> {
        Ok(self.rules.get(event_key).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::ActionKind;

    fn id(n: u64) -> DonationId {
        DonationId::from_record(&json!({ "donation_id": n }))
    }

    #[tokio::test]
    async fn remembers_marked_ids() {
        let store = InMemorySeenStore::new(10);
        assert!(!store.has_seen(&id(1)).await.unwrap());
        store.mark_seen(&id(1)).await.unwrap();
        assert!(store.has_seen(&id(1)).await.unwrap());
        store.mark_seen(&id(1)).await.unwrap();
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn evicts_oldest_past_capacity() {
        let store = InMemorySeenStore::new(3);
        for n in 1..=5 {
            store.mark_seen(&id(n)).await.unwrap();
        }
        assert_eq!(store.len(), 3);
        assert!(!store.has_seen(&id(1)).await.unwrap());
        assert!(!store.has_seen(&id(2)).await.unwrap());
        for n in 3..=5 {
            assert!(store.has_seen(&id(n)).await.unwrap());
        }
    }

    #[tokio::test]
    async fn lookup_refreshes_an_id() {
        let store = InMemorySeenStore::new(2);
        store.mark_seen(&id(1)).await.unwrap();
        store.mark_seen(&id(2)).await.unwrap();
        // 1 is now the most recently touched
        assert!(store.has_seen(&id(1)).await.unwrap());
        store.mark_seen(&id(3)).await.unwrap();

        assert!(store.has_seen(&id(1)).await.unwrap());
        assert!(!store.has_seen(&id(2)).await.unwrap());
        assert!(store.has_seen(&id(3)).await.unwrap());
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn repeated_touches_keep_order_queue_bounded() {
        let store = InMemorySeenStore::new(4);
        for _ in 0..100 {
            store.mark_seen(&id(1)).await.unwrap();
        }
        let inner = store.inner.lock().unwrap();
        assert_eq!(inner.seen.len(), 1);
        assert!(inner.order.len() <= 8);
    }

    #[tokio::test]
    async fn reserve_only_grows() {
        let store = InMemorySeenStore::new(3);
        assert!(!store.reserve(2).await.unwrap());
        assert!(!store.reserve(3).await.unwrap());
        assert_eq!(store.capacity(), 3);
        assert!(store.reserve(5).await.unwrap());
        assert_eq!(store.capacity(), 5);
        for n in 1..=5 {
            store.mark_seen(&id(n)).await.unwrap();
        }
        assert_eq!(store.len(), 5);
    }

    #[tokio::test]
    async fn malformed_rule_is_skipped_and_siblings_kept() {
        let raw = HashMap::from([(
            "twitch_channel_points".to_string(),
            vec![
                "command:say hi".to_string(),
                "invalidrule".to_string(),
                "broadcast:hello".to_string(),
            ],
        )]);
        let store = InMemoryRuleStore::from_raw(&raw);

        let rules = store.rules_for("twitch_channel_points").await.unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].kind, ActionKind::Command);
        assert_eq!(rules[1].kind, ActionKind::Broadcast);
        assert_eq!(store.rule_count(), 2);
    }

    #[tokio::test]
    async fn unknown_key_has_no_rules() {
        let store = InMemoryRuleStore::default();
        assert!(store.rules_for("nope").await.unwrap().is_empty());
    }
}
