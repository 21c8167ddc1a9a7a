pub mod addressing;

use std::cmp::Reverse;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::WalkDir;

use crate::error::JournalError;
use crate::logger::Logger;
use crate::vault::codec::{self, FileTimes};
use crate::vault::entry::{Entry, ENTRY_EXTENSION};
use crate::Result;

// Re-exports for convenience
pub use addressing::{
    sanitize, slug, Addressing, AddressingStrategy, FilenameAddressing, IdentifierAddressing,
    MAX_SLUG_LEN,
};

/// Directory-backed collection of entry files.
///
/// Nothing is cached: every `list`/`load` goes back to the filesystem.
#[derive(Debug)]
pub struct EntryStore {
    path: PathBuf,
    strategy: Box<dyn AddressingStrategy>,
    logger: Logger,
}

impl EntryStore {
    pub fn new(path: impl Into<PathBuf>, strategy: Box<dyn AddressingStrategy>) -> Self {
        Self {
            path: path.into(),
            strategy,
            logger: Logger::new("EntryStore"),
        }
    }

    pub fn identifier_addressed(path: impl Into<PathBuf>) -> Self {
        Self::new(path, Box::new(IdentifierAddressing))
    }

    pub fn filename_derived(path: impl Into<PathBuf>) -> Self {
        Self::new(path, Box::new(FilenameAddressing))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn strategy(&self) -> &dyn AddressingStrategy {
        self.strategy.as_ref()
    }

    /// Entry file names, newest modification first; ties fall back to name order.
    pub fn list(&self) -> Vec<String> {
        if !self.path.is_dir() {
            self.logger
                .warn(&format!("Vault directory does not exist: {}", self.path.display()));
            return Vec::new();
        }

        let mut files: Vec<(SystemTime, String)> = WalkDir::new(&self.path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| is_entry_file(e.path()))
            .filter_map(|e| {
                let name = e.file_name().to_str()?.to_string();
                let modified = e
                    .metadata()
                    .ok()
                    .and_then(|m| m.modified().ok())
                    .unwrap_or(SystemTime::UNIX_EPOCH);
                Some((modified, name))
            })
            .collect();

        files.sort_by(|(a_time, a_name), (b_time, b_name)| {
            Reverse(a_time).cmp(&Reverse(b_time)).then_with(|| a_name.cmp(b_name))
        });

        files.into_iter().map(|(_, name)| name).collect()
    }

    /// Loads one entry. Any I/O failure yields an empty sentinel entry.
    pub fn load(&self, address: &str) -> Entry {
        match self.try_load(address) {
            Ok(entry) => entry,
            Err(e) => {
                self.logger.warn(&format!("Failed to load {}: {}", address, e));
                Entry::default()
            }
        }
    }

    pub fn try_load(&self, address: &str) -> Result<Entry> {
        let path = self.entry_path(address)?;
        self.logger.debug(&format!("Reading {}", path.display()));

        let bytes = fs::read(&path).map_err(|e| JournalError::io(&path, e))?;
        let times = fs::metadata(&path)
            .map(|m| FileTimes::from_metadata(&m))
            .unwrap_or_else(|_| FileTimes::now());
        let text = String::from_utf8_lossy(&bytes);

        let mut entry = codec::decode(&text, address_stem(address), times);
        entry.set_location(address);
        Ok(entry)
    }

    /// Every loadable entry in `list()` order; empty results are dropped.
    pub fn load_all(&self) -> Vec<Entry> {
        let addresses = self.list();
        let total = addresses.len();

        let entries: Vec<Entry> = addresses
            .iter()
            .map(|address| self.load(address))
            .filter(|entry| !entry.is_empty())
            .collect();

        if entries.len() < total {
            self.logger.debug(&format!(
                "Skipped {} empty or unreadable entries",
                total - entries.len()
            ));
        }
        entries
    }

    /// Writes the entry, assigning its location on first save.
    ///
    /// The file is written to a temporary sibling and renamed into place, so a
    /// failed save never leaves a truncated entry behind. An existing file keeps
    /// its permissions. The entry's location is only updated once the write has
    /// succeeded.
    pub fn save(&self, entry: &mut Entry) -> Result<()> {
        let address = self.address_of(entry);
        let path = self.entry_path(&address)?;
        let encoded = codec::encode(entry, self.strategy.embeds_id());

        self.write_atomic(&path, encoded.as_bytes()).map_err(|e| {
            self.logger
                .warn(&format!("Failed to write {}: {}", path.display(), e));
            JournalError::io(&path, e)
        })?;

        self.logger.debug(&format!("Saved {}", path.display()));
        entry.set_location(address);
        Ok(())
    }

    /// Builds a fresh entry and saves it in one step.
    pub fn create(&self, title: &str, content: &str) -> Result<Entry> {
        let mut entry = Entry::new(title, content);
        self.save(&mut entry)?;
        Ok(entry)
    }

    pub fn delete(&self, address: &str) -> Result<()> {
        let path = self.entry_path(address)?;
        fs::remove_file(&path).map_err(|e| {
            self.logger
                .warn(&format!("Failed to delete {}: {}", path.display(), e));
            JournalError::io(&path, e)
        })?;

        self.logger.debug(&format!("Deleted {}", path.display()));
        Ok(())
    }

    pub fn exists(&self, address: &str) -> bool {
        self.entry_path(address)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    /// The entry's current location, or the one the strategy would assign.
    pub fn address_of(&self, entry: &Entry) -> String {
        match entry.location() {
            Some(location) => location.to_string(),
            None => self.strategy.derive_address(entry),
        }
    }

    /// Resolves a bare file name inside the store directory.
    pub fn entry_path(&self, address: &str) -> Result<PathBuf> {
        let is_bare_name = !address.is_empty()
            && address != "."
            && address != ".."
            && !address.contains(['/', '\\']);

        if !is_bare_name {
            return Err(JournalError::InvalidAddress(address.to_string()));
        }
        Ok(self.path.join(address))
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> std::io::Result<()> {
        let mut temp = tempfile::NamedTempFile::new_in(&self.path)?;
        temp.write_all(contents)?;
        if let Ok(existing) = fs::metadata(path) {
            temp.as_file().set_permissions(existing.permissions())?;
        }
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

fn is_entry_file(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(ENTRY_EXTENSION)
}

fn address_stem(address: &str) -> &str {
    address
        .strip_suffix(ENTRY_EXTENSION)
        .and_then(|s| s.strip_suffix('.'))
        .unwrap_or(address)
}
