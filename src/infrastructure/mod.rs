pub mod memory_store;
pub mod fake_provider;
pub mod streamlabs_provider;
pub mod console_host;
pub mod webhook_host;
pub mod multi_host;
pub mod event_bus;
