//! Application Layer
//!
//! Ports: 出站端口（CacheStore, TtsClient, MessageDirectory）
//! Services: RequestCoordinator / RegenerationEngine / CacheMaintenance

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
