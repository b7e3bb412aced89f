pub mod dispatch_event;
pub mod poll_donations;
pub mod redeem_channel_points;

pub use dispatch_event::*;
pub use poll_donations::*;
pub use redeem_channel_points::*;
