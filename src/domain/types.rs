use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier used to dedup donation records between polls.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DonationId(String);

const ID_FIELDS: [&str; 3] = ["donation_id", "id", "_id"];
const FINGERPRINT_FIELDS: [&str; 7] = [
    "platform",
    "type",
    "name",
    "amount",
    "formatted_amount",
    "message",
    "created_at",
];

impl DonationId {
    /// Uses the provider's own id when the record has one, otherwise a fingerprint of its fields.
    pub fn from_record(record: &Value) -> Self {
        for key in ID_FIELDS {
            match record.get(key) {
                Some(Value::String(s)) if !s.is_empty() => return Self(format!("{}:{}", key, s)),
                Some(Value::Number(n)) => return Self(format!("{}:{}", key, n)),
                _ => {}
            }
        }

        let parts: Vec<String> = FINGERPRINT_FIELDS
            .iter()
            .map(|k| record.get(*k).map(text_of).unwrap_or_default())
            .collect();
        Self(format!("fp:{}", parts.join("|")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DonationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// JSON scalar as plain text; `null`, arrays and objects give "".
pub fn text_of(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Push notification for a channel-points reward redemption.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelPointsRedemption {
    pub user: RedemptionUser,
    pub reward: RedemptionReward,
    #[serde(default, alias = "channel_id")]
    pub channel_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionUser {
    #[serde(alias = "display_name")]
    pub display_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionReward {
    pub title: String,
    pub cost: u64,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn prefers_provider_id() {
        let a = DonationId::from_record(&json!({"donation_id": 42, "name": "a"}));
        let b = DonationId::from_record(&json!({"donation_id": 42, "name": "b"}));
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "donation_id:42");

        let c = DonationId::from_record(&json!({"id": "abc"}));
        assert_eq!(c.as_str(), "id:abc");
    }

    #[test]
    fn falls_back_to_fingerprint() {
        let r = json!({"type": "donation", "platform": "streamlabs", "name": "Bob", "amount": 5});
        let a = DonationId::from_record(&r);
        assert_eq!(a, DonationId::from_record(&r.clone()));
        assert_eq!(a.as_str(), "fp:streamlabs|donation|Bob|5|||");

        let other = json!({"type": "donation", "platform": "streamlabs", "name": "Bob", "amount": 6});
        assert_ne!(a, DonationId::from_record(&other));
    }

    #[test]
    fn redemption_accepts_camel_and_snake_case() {
        let camel: ChannelPointsRedemption = serde_json::from_value(json!({
            "user": {"displayName": "Bob"},
            "reward": {"title": "Hydrate", "cost": 500},
            "channelId": "99"
        }))
        .unwrap();
        let snake: ChannelPointsRedemption = serde_json::from_value(json!({
            "user": {"display_name": "Bob"},
            "reward": {"title": "Hydrate", "cost": 500},
            "channel_id": "99"
        }))
        .unwrap();
        assert_eq!(camel, snake);
        assert_eq!(camel.channel_id.as_deref(), Some("99"));
    }
}
