pub mod cooldown;
pub mod ports;
pub mod usecases;

pub use cooldown::*;
pub use ports::*;
