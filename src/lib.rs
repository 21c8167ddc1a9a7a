pub mod config;
pub mod error;
pub mod logger;
pub mod vault;

pub use config::Settings;
pub use error::JournalError;
pub use vault::analytics::{EntryAnalyzer, EntryStats, VaultSummary};
pub use vault::entry::Entry;
pub use vault::search::SearchEngine;
pub use vault::storage::{Addressing, AddressingStrategy, EntryStore};
pub use vault::Vault;

pub type Result<T> = std::result::Result<T, JournalError>;
