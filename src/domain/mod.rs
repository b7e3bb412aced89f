pub mod types;
pub mod event;
pub mod action;
pub mod template;
pub mod normalize;
pub mod policy;

pub use types::*;
pub use event::*;
pub use action::*;
pub use template::*;
pub use normalize::*;
pub use policy::*;
