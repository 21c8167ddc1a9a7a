use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// File extension shared by every entry file in a vault.
pub const ENTRY_EXTENSION: &str = "md";

/// One journal record.
///
/// `id` and `created` are fixed at construction. Title and content are only
/// reachable through setters, which bump `modified` in the same call so the
/// two can never be observed out of step. Titles are kept on a single line
/// without surrounding whitespace, the form they take on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    id: String,
    title: String,
    content: String,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
    location: Option<String>,
}

impl Entry {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: normalize_title(title.into()),
            content: content.into(),
            created: now,
            modified: now,
            location: None,
        }
    }

    /// Rebuilds an entry from persisted fields. A `modified` earlier than
    /// `created` is clamped up to `created`.
    pub fn from_parts(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        created: DateTime<Utc>,
        modified: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: normalize_title(title.into()),
            content: content.into(),
            created,
            modified: modified.max(created),
            location: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    /// Store-relative file name this entry was last persisted to.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = normalize_title(title.into());
        self.touch();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.touch();
    }

    pub(crate) fn set_location(&mut self, location: impl Into<String>) {
        self.location = Some(location.into());
    }

    /// True when both title and content are empty; this is how a failed load shows up.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.content.is_empty()
    }

    /// `<id>.md`, the identifier-addressed file name.
    pub fn filename(&self) -> String {
        format!("{}.{}", self.id, ENTRY_EXTENSION)
    }

    fn touch(&mut self) {
        // The wall clock may step backwards; modified never drops below created.
        self.modified = now().max(self.created);
    }
}

impl Default for Entry {
    fn default() -> Self {
        Self::new("", "")
    }
}

/// Folds line breaks into spaces and trims the ends.
pub(crate) fn normalize_title(title: String) -> String {
    if title.contains(['\n', '\r']) {
        return title
            .split(['\n', '\r'])
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string();
    }

    let trimmed = title.trim();
    if trimmed.len() == title.len() {
        title
    } else {
        trimmed.to_string()
    }
}

/// Current wall-clock time at the one-second precision the on-disk format keeps.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}
