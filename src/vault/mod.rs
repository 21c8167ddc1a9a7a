pub mod analytics;
pub mod codec;
pub mod entry;
pub mod search;
pub mod storage;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::JournalError;
use crate::logger::Logger;
use crate::Result;
use storage::{Addressing, EntryStore};

/// Marker file whose presence makes a directory a vault.
pub const MARKER_FILE: &str = ".jrnl";
pub const MARKER_CONTENTS: &str = "jrnl vault v1.0\n";

/// A directory of entries plus its open/closed state.
///
/// An open vault owns exactly one [`EntryStore`]; `open` and `close` are the
/// only places that replace or drop it.
#[derive(Debug)]
pub struct Vault {
    path: Option<PathBuf>,
    store: Option<EntryStore>,
    addressing: Addressing,
    logger: Logger,
}

impl Vault {
    pub fn new() -> Self {
        Self::with_addressing(Addressing::default())
    }

    pub fn with_addressing(addressing: Addressing) -> Self {
        Self {
            path: None,
            store: None,
            addressing,
            logger: Logger::new("Vault"),
        }
    }

    /// Creates the directory tree and marker file. An existing directory is
    /// accepted untouched.
    pub fn create_vault(path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let logger = Logger::new("Vault");

        if path.exists() {
            logger.debug(&format!("Vault directory already exists: {}", path.display()));
            return Ok(());
        }

        fs::create_dir_all(path).map_err(|e| {
            logger.warn(&format!("Failed to create vault directory: {}", path.display()));
            JournalError::io(path, e)
        })?;

        let marker = path.join(MARKER_FILE);
        fs::write(&marker, MARKER_CONTENTS).map_err(|e| {
            logger.warn(&format!("Failed to create vault marker file: {}", marker.display()));
            JournalError::io(&marker, e)
        })?;

        logger.info(&format!("Created vault at: {}", path.display()));
        Ok(())
    }

    /// True when `path` is a directory containing the marker file.
    pub fn is_vault(path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        path.is_dir() && path.join(MARKER_FILE).exists()
    }

    /// Opens `path`, replacing any store already held. On failure the vault is
    /// left exactly as it was.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if !path.is_dir() {
            self.logger
                .warn(&format!("Vault directory does not exist: {}", path.display()));
            return Err(JournalError::VaultNotFound(path.to_path_buf()));
        }

        if !path.join(MARKER_FILE).exists() {
            self.logger.warn(&format!(
                "Not a valid jrnl vault (missing {} marker): {}",
                MARKER_FILE,
                path.display()
            ));
            return Err(JournalError::MarkerMissing(path.to_path_buf()));
        }

        self.close();
        self.store = Some(EntryStore::new(path, self.addressing.strategy()));
        self.path = Some(path.to_path_buf());

        self.logger.info(&format!("Opened vault: {}", path.display()));
        Ok(())
    }

    /// Drops the owned store. Closing a closed vault does nothing.
    pub fn close(&mut self) {
        if let Some(store) = self.store.take() {
            self.logger
                .info(&format!("Closed vault: {}", store.path().display()));
        }
        self.path = None;
    }

    pub fn is_open(&self) -> bool {
        self.store.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Base name of the open directory, empty when closed.
    pub fn name(&self) -> String {
        self.path
            .as_deref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn addressing(&self) -> Addressing {
        self.addressing
    }

    pub fn store(&self) -> Option<&EntryStore> {
        self.store.as_ref()
    }

    /// The open store, or [`JournalError::VaultClosed`].
    pub fn require_store(&self) -> Result<&EntryStore> {
        self.store.as_ref().ok_or(JournalError::VaultClosed)
    }
}

impl Default for Vault {
    fn default() -> Self {
        Self::new()
    }
}
