pub mod app_config;
pub mod memory;
pub mod repos;

pub use app_config::{AuthConfig, BusinessRules, Config, ServerConfig};
pub use memory::{MemStore, StoreError, StoreState};
