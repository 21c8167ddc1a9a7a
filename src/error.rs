use std::path::PathBuf;

/// Error types for vault and entry storage operations
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid entry address: {0:?}")]
    InvalidAddress(String),

    #[error("Vault directory does not exist: {}", .0.display())]
    VaultNotFound(PathBuf),

    #[error("Not a valid jrnl vault (missing .jrnl marker): {}", .0.display())]
    MarkerMissing(PathBuf),

    #[error("No vault is open")]
    VaultClosed,

    #[error("Analytics pattern error: {0}")]
    Analytics(#[from] regex::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl JournalError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
