use std::sync::Arc;

use crate::application::usecases::{DispatchEventUseCase, DispatchOutcome};
use crate::domain::{ChannelPointsRedemption, from_channel_points_redemption};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedeemOutcome {
    /// Redemption belongs to a channel we do not listen to.
    Ignored,
    Dispatched(DispatchOutcome),
}

/// Push path: one redemption notification in, one dispatch out.
pub struct RedeemChannelPointsUseCase {
    pub dispatch: Arc<DispatchEventUseCase>,
    pub channel_id: Option<String>,
}

impl RedeemChannelPointsUseCase {
    pub async fn execute(&self, redemption: &ChannelPointsRedemption) -> RedeemOutcome {
        if let (Some(expected), Some(got)) = (&self.channel_id, &redemption.channel_id) {
            if expected != got {
                tracing::debug!(channel_id = %got, "redemption for another channel, ignoring");
                return RedeemOutcome::Ignored;
            }
        }

        let event = from_channel_points_redemption(redemption);
        RedeemOutcome::Dispatched(self.dispatch.execute(&event).await)
    }
}
