use std::fmt;
use std::str::FromStr;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::vault::entry::{Entry, ENTRY_EXTENSION};

/// Longest slug the filename-derived layout will put in a file name.
pub const MAX_SLUG_LEN: usize = 50;

/// Maps an entry to the file name it is first written to.
///
/// Stores only consult the strategy for entries that have never been saved;
/// once an entry carries a location that location is reused as-is.
pub trait AddressingStrategy: fmt::Debug + Send + Sync {
    fn derive_address(&self, entry: &Entry) -> String;

    /// Whether the front matter carries an `id` line.
    fn embeds_id(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str;
}

/// `<id>.md`
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentifierAddressing;

impl AddressingStrategy for IdentifierAddressing {
    fn derive_address(&self, entry: &Entry) -> String {
        entry.filename()
    }

    fn name(&self) -> &'static str {
        "identifier"
    }
}

/// `<yyyy-mm-dd>_<slug>.md`, dated by the entry's local creation day.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilenameAddressing;

impl AddressingStrategy for FilenameAddressing {
    fn derive_address(&self, entry: &Entry) -> String {
        let date = entry.created().with_timezone(&Local).format("%Y-%m-%d");
        format!("{}_{}.{}", date, slug(entry.title()), ENTRY_EXTENSION)
    }

    fn embeds_id(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "filename"
    }
}

/// Lower-cases, turns every non letter/digit into `-`, collapses runs of `-`
/// and trims them from both ends.
pub fn sanitize(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());
    for c in name.to_lowercase().chars() {
        if c.is_alphanumeric() {
            sanitized.push(c);
        } else if !sanitized.is_empty() && !sanitized.ends_with('-') {
            sanitized.push('-');
        }
    }

    while sanitized.ends_with('-') {
        sanitized.pop();
    }
    sanitized
}

/// Sanitized title capped at [`MAX_SLUG_LEN`] characters, `untitled` when nothing survives.
pub fn slug(title: &str) -> String {
    let sanitized = sanitize(title);
    if sanitized.is_empty() {
        return "untitled".to_string();
    }
    sanitized.chars().take(MAX_SLUG_LEN).collect()
}

/// Addressing scheme selected through configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Addressing {
    #[default]
    #[serde(rename = "identifier")]
    Identifier,
    #[serde(rename = "filename")]
    FilenameDerived,
}

impl Addressing {
    pub fn strategy(self) -> Box<dyn AddressingStrategy> {
        match self {
            Addressing::Identifier => Box::new(IdentifierAddressing),
            Addressing::FilenameDerived => Box::new(FilenameAddressing),
        }
    }
}

impl fmt::Display for Addressing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.strategy().name())
    }
}

impl FromStr for Addressing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "identifier" | "id" => Ok(Addressing::Identifier),
            "filename" | "filename-derived" => Ok(Addressing::FilenameDerived),
            other => Err(format!("unknown addressing scheme: {}", other)),
        }
    }
}
