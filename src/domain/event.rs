use serde::{Deserialize, Serialize};

/// Event key used for every channel-points redemption.
pub const CHANNEL_POINTS_KEY: &str = "twitch_channel_points";
pub const TWITCH_PLATFORM: &str = "twitch";

/// Canonical event shape shared by every inbound source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub event_key: String, // rule lookup + cooldown key, e.g. "youtube_donation"
    pub platform: String,
    pub username: String,
    pub amount: String,           // raw numeric text or ""
    pub formatted_amount: String, // display form or ""
    pub message: String,
}

impl Event {
    pub fn make_event_key(platform: &str, event_type: &str) -> String {
        format!("{}_{}", platform, event_type)
    }
}
