pub mod capabilities;
pub mod config;
pub mod error;

pub use capabilities::{BaseUri, CapabilityConfig};
pub use config::Config;
pub use error::ConfigError;
