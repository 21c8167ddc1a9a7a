pub mod settings;

pub use settings::{LoggingConfig, Settings, VaultConfig};
