use serde::Serialize;

use crate::vault::entry::Entry;

pub const TITLE_MATCH_SCORE: u32 = 100;
pub const TITLE_PREFIX_BONUS: u32 = 50;
pub const CONTENT_OCCURRENCE_SCORE: u32 = 10;

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult<'a> {
    pub entry: &'a Entry,
    pub score: u32,
}

/// Case-insensitive substring ranking over an in-memory entry list.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchEngine;

impl SearchEngine {
    pub fn new() -> Self {
        Self
    }

    /// Matching entries, best first. A blank query returns `entries` as given.
    pub fn search(&self, entries: &[Entry], query: &str) -> Vec<Entry> {
        if query.trim().is_empty() {
            return entries.to_vec();
        }

        self.rank(entries, query)
            .into_iter()
            .map(|result| result.entry.clone())
            .collect()
    }

    /// Scored matches sorted by descending score. Order among equal scores is
    /// unspecified. A blank query yields every entry with score 0 in input order.
    pub fn rank<'a>(&self, entries: &'a [Entry], query: &str) -> Vec<SearchResult<'a>> {
        if query.trim().is_empty() {
            return entries
                .iter()
                .map(|entry| SearchResult { entry, score: 0 })
                .collect();
        }

        let needle = query.to_lowercase();
        let mut results: Vec<SearchResult<'a>> = entries
            .iter()
            .filter_map(|entry| {
                score_lowered(entry, &needle).map(|score| SearchResult { entry, score })
            })
            .collect();

        results.sort_by(|a, b| b.score.cmp(&a.score));
        results
    }

    /// Relevance of one entry, `None` when it does not match at all.
    pub fn score(&self, entry: &Entry, query: &str) -> Option<u32> {
        if query.trim().is_empty() {
            return None;
        }
        score_lowered(entry, &query.to_lowercase())
    }
}

fn score_lowered(entry: &Entry, needle: &str) -> Option<u32> {
    let title = entry.title().to_lowercase();
    let content = entry.content().to_lowercase();

    let in_title = title.contains(needle);
    let occurrences = content.matches(needle).count() as u32;
    if !in_title && occurrences == 0 {
        return None;
    }

    let mut score = 0;
    if in_title {
        score += TITLE_MATCH_SCORE;
        if title.starts_with(needle) {
            score += TITLE_PREFIX_BONUS;
        }
    }
    score += occurrences * CONTENT_OCCURRENCE_SCORE;
    Some(score)
}
