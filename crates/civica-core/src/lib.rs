pub mod config;
pub mod error;

pub use config::{AssistantConfig, CivicaConfig, GeneralConfig};
pub use error::{CivicaError, Result};
