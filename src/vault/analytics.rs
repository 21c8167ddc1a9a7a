// src/vault/analytics.rs - Writing statistics for entries and whole vaults
use std::collections::{BTreeMap, HashMap};

use chrono::{Local, NaiveDate};
use pulldown_cmark::{Event, Parser, TagEnd};
use regex::Regex;
use serde::Serialize;

use crate::logger::Logger;
use crate::vault::entry::Entry;
use crate::Result;

const WORDS_PER_MINUTE: usize = 200;
const TOP_WORDS: usize = 10;
const MIN_FREQUENT_WORD_LEN: usize = 4;

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "is", "was", "are", "were", "be", "been", "being", "have", "has", "had", "do",
    "does", "did", "will", "would", "should", "could", "may", "might", "can", "this", "that",
    "these", "those", "i", "you", "he", "she", "it", "we", "they",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryStats {
    pub word_count: usize,
    pub character_count: usize,
    pub character_count_no_spaces: usize,
    pub line_count: usize,
    pub paragraph_count: usize,
    pub sentence_count: usize,
    pub reading_time_minutes: usize,
    pub avg_word_length: f64,
    pub avg_sentence_length: f64,
    pub checksum: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordFrequency {
    pub word: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VaultSummary {
    pub total_entries: usize,
    pub total_words: usize,
    pub average_words: f64,
    pub longest_entry_words: usize,
    pub shortest_entry_words: usize,
    pub first_entry: Option<NaiveDate>,
    pub latest_entry: Option<NaiveDate>,
    pub entries_by_month: BTreeMap<String, usize>,
    pub top_words: Vec<WordFrequency>,
}

pub struct EntryAnalyzer {
    logger: Logger,
    word_regex: Regex,
    paragraph_regex: Regex,
    sentence_regex: Regex,
}

impl EntryAnalyzer {
    pub fn new() -> Result<Self> {
        let word_regex = Regex::new(r"\b[a-z]+\b")?;
        let paragraph_regex = Regex::new(r"\n\s*\n")?;
        let sentence_regex = Regex::new(r"[.!?]+")?;

        Ok(Self {
            logger: Logger::new("EntryAnalyzer"),
            word_regex,
            paragraph_regex,
            sentence_regex,
        })
    }

    pub fn analyze(&self, entry: &Entry) -> EntryStats {
        let content = entry.content();
        let plain_text = self.extract_plain_text(content);

        let words: Vec<&str> = plain_text.split_whitespace().collect();
        let word_count = words.len();
        let sentence_count = self.count_sentences(&plain_text);
        let letters: usize = words.iter().map(|w| w.chars().count()).sum();

        EntryStats {
            word_count,
            character_count: content.chars().count(),
            character_count_no_spaces: content.chars().filter(|c| *c != ' ').count(),
            line_count: content.matches('\n').count() + 1,
            paragraph_count: self.count_paragraphs(content),
            sentence_count,
            reading_time_minutes: estimate_reading_time(word_count),
            avg_word_length: ratio(letters, word_count),
            avg_sentence_length: ratio(word_count, sentence_count),
            checksum: calculate_checksum(content),
        }
    }

    pub fn summarize(&self, entries: &[Entry]) -> VaultSummary {
        self.logger
            .debug(&format!("Summarizing {} entries", entries.len()));

        if entries.is_empty() {
            return VaultSummary::default();
        }

        let mut summary = VaultSummary {
            total_entries: entries.len(),
            shortest_entry_words: usize::MAX,
            ..VaultSummary::default()
        };
        let mut frequencies: HashMap<String, usize> = HashMap::new();

        for entry in entries {
            let plain_text = self.extract_plain_text(entry.content());
            let words = plain_text.split_whitespace().count();

            summary.total_words += words;
            summary.longest_entry_words = summary.longest_entry_words.max(words);
            summary.shortest_entry_words = summary.shortest_entry_words.min(words);

            let created = entry.created().with_timezone(&Local).date_naive();
            summary.first_entry = Some(summary.first_entry.map_or(created, |d| d.min(created)));
            summary.latest_entry = Some(summary.latest_entry.map_or(created, |d| d.max(created)));
            *summary
                .entries_by_month
                .entry(created.format("%Y-%m").to_string())
                .or_insert(0) += 1;

            let lowered = plain_text.to_lowercase();
            for word in self.word_regex.find_iter(&lowered).map(|m| m.as_str()) {
                if word.len() >= MIN_FREQUENT_WORD_LEN && !STOP_WORDS.contains(&word) {
                    *frequencies.entry(word.to_string()).or_insert(0) += 1;
                }
            }
        }

        summary.average_words = round2(summary.total_words as f64 / entries.len() as f64);
        summary.top_words = top_words(frequencies);
        summary
    }

    /// Markdown rendered down to its text, one space between blocks.
    pub fn extract_plain_text(&self, content: &str) -> String {
        let mut plain_text = String::new();

        for event in Parser::new(content) {
            match event {
                Event::Text(text) | Event::Code(text) => plain_text.push_str(&text),
                Event::SoftBreak | Event::HardBreak => plain_text.push(' '),
                Event::End(tag) if is_block_end(&tag) => plain_text.push(' '),
                _ => {}
            }
        }

        plain_text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn count_paragraphs(&self, content: &str) -> usize {
        self.paragraph_regex
            .split(content.trim())
            .filter(|p| !p.trim().is_empty())
            .count()
    }

    fn count_sentences(&self, text: &str) -> usize {
        self.sentence_regex
            .split(text)
            .filter(|s| !s.trim().is_empty())
            .count()
    }
}

fn is_block_end(tag: &TagEnd) -> bool {
    matches!(
        tag,
        TagEnd::Paragraph
            | TagEnd::Heading(_)
            | TagEnd::BlockQuote
            | TagEnd::CodeBlock
            | TagEnd::Item
            | TagEnd::TableCell
    )
}

fn top_words(frequencies: HashMap<String, usize>) -> Vec<WordFrequency> {
    let mut ranked: Vec<WordFrequency> = frequencies
        .into_iter()
        .map(|(word, count)| WordFrequency { word, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    ranked.truncate(TOP_WORDS);
    ranked
}

fn estimate_reading_time(word_count: usize) -> usize {
    ((word_count + WORDS_PER_MINUTE / 2) / WORDS_PER_MINUTE).max(1)
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    round2(numerator as f64 / denominator as f64)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn calculate_checksum(content: &str) -> String {
    blake3::hash(content.as_bytes()).to_hex().to_string()
}
