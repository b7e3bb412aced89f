use serde_json::Value;

use super::{CHANNEL_POINTS_KEY, ChannelPointsRedemption, Event, TWITCH_PLATFORM, text_of};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("donation record is not a JSON object")]
    NotAnObject,
    #[error("donation record missing required field: {0}")]
    MissingField(&'static str),
}

/// Builds an event from one entry of the donation feed's `data` array.
pub fn from_donation_record(raw: &Value) -> Result<Event, NormalizeError> {
    let obj = raw.as_object().ok_or(NormalizeError::NotAnObject)?;

    let required = |key: &'static str| -> Result<String, NormalizeError> {
        obj.get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(NormalizeError::MissingField(key))
    };
    let optional = |key: &str| obj.get(key).map(text_of).unwrap_or_default();

    let event_type = required("type")?;
    let platform = required("platform")?;
    let username = required("name")?;

    Ok(Event {
        event_key: Event::make_event_key(&platform, &event_type),
        platform,
        username,
        amount: optional("amount"),
        formatted_amount: optional("formatted_amount"),
        message: optional("message"),
    })
}

/// Channel-points redemptions carry the reward title in both `formatted_amount` and `message`.
pub fn from_channel_points_redemption(raw: &ChannelPointsRedemption) -> Event {
    Event {
        event_key: CHANNEL_POINTS_KEY.to_string(),
        platform: TWITCH_PLATFORM.to_string(),
        username: raw.user.display_name.clone(),
        amount: raw.reward.cost.to_string(),
        formatted_amount: raw.reward.title.clone(),
        message: raw.reward.title.clone(),
    }
}
