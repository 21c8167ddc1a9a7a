// src/vault/codec.rs - Front matter + Markdown entry format
//
// ---
// id: <id>              (identifier-addressed vaults only)
// title: <title>
// created: <ISO-8601>
// modified: <ISO-8601>
// ---
//
// # <title>             (only when the title is non-empty)
//
// <content>
//
// The block closes at the first "\n---\n" after the opening line. Content is
// written verbatim and never escaped.

use std::collections::HashMap;
use std::fs::Metadata;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SecondsFormat, SubsecRound, TimeZone, Utc};

use crate::logger::Logger;
use crate::vault::entry::{self, Entry};

const OPENING: &str = "---\n";
const CLOSING: &str = "\n---\n";

fn logger() -> Logger {
    Logger::new("Codec")
}

/// Filesystem timestamps used when a file carries no front matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTimes {
    pub created: Option<DateTime<Utc>>,
    pub modified: DateTime<Utc>,
}

impl FileTimes {
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let modified = metadata
            .modified()
            .map(|t| DateTime::<Utc>::from(t).trunc_subsecs(0))
            .unwrap_or_else(|_| entry::now());
        // Birth time is unsupported on some filesystems.
        let created = metadata
            .created()
            .ok()
            .map(|t| DateTime::<Utc>::from(t).trunc_subsecs(0));

        Self { created, modified }
    }

    pub fn now() -> Self {
        Self {
            created: None,
            modified: entry::now(),
        }
    }

    fn creation(&self) -> DateTime<Utc> {
        self.created.unwrap_or(self.modified)
    }
}

pub fn encode(entry: &Entry, include_id: bool) -> String {
    // Entries built through serde bypass the title normalization.
    let title = entry::normalize_title(entry.title().to_string());
    let mut out = String::with_capacity(entry.content().len() + title.len() * 2 + 128);

    out.push_str(OPENING);
    if include_id {
        out.push_str(&format!("id: {}\n", entry.id()));
    }
    out.push_str(&format!("title: {}\n", title));
    out.push_str(&format!("created: {}\n", format_timestamp(entry.created())));
    out.push_str(&format!("modified: {}\n", format_timestamp(entry.modified())));
    out.push_str("---\n\n");

    if !title.is_empty() {
        out.push_str(&format!("# {}\n\n", title));
    }

    out.push_str(entry.content());
    out
}

/// Decodes an entry file. Never fails: unreadable metadata degrades field by
/// field, and text without a closed front matter block is taken as body only.
pub fn decode(text: &str, fallback_id: &str, times: FileTimes) -> Entry {
    let text = text.replace("\r\n", "\n");

    match split_front_matter(&text) {
        Some((block, body)) => decode_front_matter(block, body, fallback_id),
        None => {
            if text.starts_with(OPENING) {
                logger().warn(&format!(
                    "Unterminated front matter in {}, reading as plain text",
                    fallback_id
                ));
            }
            decode_body_only(&text, fallback_id, times)
        }
    }
}

pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Accepts RFC 3339, naive date-times (taken as local time) and bare dates.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc).trunc_subsecs(0));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return local_to_utc(naive);
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(local_to_utc)
}

fn local_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc).trunc_subsecs(0))
}

fn split_front_matter(text: &str) -> Option<(&str, &str)> {
    if !text.starts_with(OPENING) {
        return None;
    }

    // Search from the opening line's own newline so an empty block closes.
    let close = text[3..].find(CLOSING)? + 3;
    let block = text.get(OPENING.len()..close).unwrap_or("");
    Some((block, &text[close + CLOSING.len()..]))
}

fn decode_front_matter(block: &str, body: &str, fallback_id: &str) -> Entry {
    let mut fields: HashMap<&str, &str> = HashMap::new();
    for line in block.lines() {
        if let Some((key, value)) = line.split_once(':') {
            fields.entry(key.trim()).or_insert(value.trim());
        }
    }

    let id = fields
        .get("id")
        .copied()
        .filter(|id| !id.is_empty())
        .unwrap_or(fallback_id);
    let title = fields.get("title").copied().unwrap_or_default();
    let created = timestamp_field(&fields, "created", fallback_id);
    let modified = timestamp_field(&fields, "modified", fallback_id);
    let content = strip_title_heading(body.trim(), title);

    Entry::from_parts(id, title, content, created, modified)
}

fn decode_body_only(text: &str, fallback_id: &str, times: FileTimes) -> Entry {
    let (title, content) = match text.strip_prefix("# ").and_then(|rest| rest.split_once('\n')) {
        Some((heading, rest)) => (heading.trim(), rest.trim()),
        None => ("", text),
    };

    Entry::from_parts(fallback_id, title, content, times.creation(), times.modified)
}

fn timestamp_field(fields: &HashMap<&str, &str>, key: &str, source: &str) -> DateTime<Utc> {
    match fields.get(key) {
        Some(value) => parse_timestamp(value).unwrap_or_else(|| {
            logger().warn(&format!(
                "Unparsable {} timestamp {:?} in {}, using current time",
                key, value, source
            ));
            entry::now()
        }),
        None => entry::now(),
    }
}

/// Drops a leading `# <title>` line, but only when it reproduces the title exactly.
fn strip_title_heading<'a>(body: &'a str, title: &str) -> &'a str {
    if title.is_empty() {
        return body;
    }

    let heading = format!("# {}", title);
    match body.strip_prefix(heading.as_str()) {
        Some("") => "",
        Some(rest) if rest.starts_with('\n') => rest.trim(),
        _ => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn fixed_entry(title: &str, content: &str) -> Entry {
        let created = Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap();
        let modified = Utc.with_ymd_and_hms(2024, 3, 6, 21, 15, 42).unwrap();
        Entry::from_parts("0b9f3c1e-5d5a-4d8e-9a51-3f1b8e2c7a10", title, content, created, modified)
    }

    fn file_times() -> FileTimes {
        FileTimes {
            created: Some(Utc.with_ymd_and_hms(2022, 1, 2, 3, 4, 5).unwrap()),
            modified: Utc.with_ymd_and_hms(2022, 2, 3, 4, 5, 6).unwrap(),
        }
    }

    #[test]
    fn test_encode_identifier_layout() {
        let entry = fixed_entry("Trip to the coast", "Sand everywhere.\n\nWorth it.");

        insta::assert_snapshot!(encode(&entry, true), @r###"
---
id: 0b9f3c1e-5d5a-4d8e-9a51-3f1b8e2c7a10
title: Trip to the coast
created: 2024-03-05T09:30:00Z
modified: 2024-03-06T21:15:42Z
---

# Trip to the coast

Sand everywhere.

Worth it.
"###);
    }

    #[test]
    fn test_encode_without_id_or_title() {
        let entry = fixed_entry("", "just words");
        let encoded = encode(&entry, false);

        assert_eq!(
            encoded,
            "---\ntitle: \ncreated: 2024-03-05T09:30:00Z\nmodified: 2024-03-06T21:15:42Z\n---\n\njust words"
        );
    }

    #[test]
    fn test_encode_folds_multiline_title() {
        let entry = fixed_entry("first\nsecond", "body");
        let encoded = encode(&entry, true);

        assert!(encoded.contains("title: first second\n"));
        assert!(encoded.contains("# first second\n\n"));
    }

    #[test]
    fn test_round_trip() {
        let entry = fixed_entry("Trip to the coast", "Sand everywhere.\n\n---\n\nWorth it.");
        let decoded = decode(&encode(&entry, true), "ignored", file_times());

        assert_eq!(decoded.id(), entry.id());
        assert_eq!(decoded.title(), entry.title());
        assert_eq!(decoded.content(), entry.content());
        assert_eq!(decoded.created(), entry.created());
        assert_eq!(decoded.modified(), entry.modified());
    }

    #[test]
    fn test_round_trip_title_with_surrounding_whitespace() {
        for title in ["Monday ", "  Monday", "\tMonday \n"] {
            let entry = fixed_entry(title, "body");
            let decoded = decode(&encode(&entry, true), "ignored", file_times());

            assert_eq!(decoded.title(), "Monday");
            assert_eq!(decoded.content(), "body");
            assert_eq!(decoded, entry);
        }
    }

    #[test]
    fn test_round_trip_blank_title() {
        let entry = fixed_entry(" ", "body");
        let encoded = encode(&entry, true);
        let decoded = decode(&encoded, "ignored", file_times());

        assert!(!encoded.contains("\n# "));
        assert_eq!(decoded.title(), "");
        assert_eq!(decoded.content(), "body");
    }

    #[test]
    fn test_round_trip_empty_content() {
        let entry = fixed_entry("Heading only", "");
        let decoded = decode(&encode(&entry, true), "ignored", file_times());

        assert_eq!(decoded.title(), "Heading only");
        assert_eq!(decoded.content(), "");
    }

    #[test]
    fn test_decode_falls_back_to_external_id() {
        let entry = fixed_entry("No id here", "body");
        let decoded = decode(&encode(&entry, false), "2024-03-05_no-id-here", file_times());

        assert_eq!(decoded.id(), "2024-03-05_no-id-here");
        assert_eq!(decoded.created(), entry.created());
    }

    #[test]
    fn test_decode_ignores_unknown_keys_and_order() {
        let text = "---\nmood: sunny\nmodified: 2024-01-02T00:00:00Z\ntitle: Re: plans\ncreated: 2024-01-01T00:00:00Z\n---\n\n# Re: plans\n\nBody";
        let decoded = decode(text, "fallback", file_times());

        assert_eq!(decoded.title(), "Re: plans");
        assert_eq!(decoded.content(), "Body");
        assert_eq!(decoded.created(), Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(decoded.modified(), Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_decode_bad_timestamp_uses_current_time() {
        let before = entry::now();
        let text = "---\ntitle: Broken\ncreated: yesterday-ish\nmodified: 2024-13-45\n---\n\nstill here";
        let decoded = decode(text, "fallback", file_times());

        assert_eq!(decoded.title(), "Broken");
        assert_eq!(decoded.content(), "still here");
        assert!(decoded.created() >= before);
        assert!(decoded.created() <= entry::now() + Duration::seconds(1));
        assert!(decoded.modified() >= decoded.created());
    }

    #[test]
    fn test_decode_naive_local_timestamp() {
        let naive = NaiveDate::from_ymd_opt(2023, 7, 14)
            .unwrap()
            .and_hms_opt(18, 5, 0)
            .unwrap();
        let expected = local_to_utc(naive).unwrap();

        assert_eq!(parse_timestamp("2023-07-14T18:05:00"), Some(expected));
        assert_eq!(parse_timestamp("2023-07-14 18:05:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2023-07-14T18:05:00+02:00"),
            Some(Utc.with_ymd_and_hms(2023, 7, 14, 16, 5, 0).unwrap())
        );
        assert!(parse_timestamp("not a date").is_none());
    }

    #[test]
    fn test_decode_keeps_mismatched_heading() {
        let text = "---\ntitle: Monday\n---\n\n# Tuesday\n\nwrong day";
        let decoded = decode(text, "fallback", file_times());

        assert_eq!(decoded.content(), "# Tuesday\n\nwrong day");
    }

    #[test]
    fn test_decode_keeps_heading_with_title_prefix() {
        let text = "---\ntitle: Day\n---\n\n# Day two\n\nmore";
        let decoded = decode(text, "fallback", file_times());

        assert_eq!(decoded.content(), "# Day two\n\nmore");
    }

    #[test]
    fn test_decode_body_only_recovers_heading() {
        let decoded = decode("# Loose note\n\nWritten elsewhere.\n", "loose", file_times());

        assert_eq!(decoded.id(), "loose");
        assert_eq!(decoded.title(), "Loose note");
        assert_eq!(decoded.content(), "Written elsewhere.");
        assert_eq!(decoded.created(), file_times().created.unwrap());
        assert_eq!(decoded.modified(), file_times().modified);
    }

    #[test]
    fn test_decode_body_only_without_birth_time() {
        let times = FileTimes {
            created: None,
            modified: file_times().modified,
        };
        let decoded = decode("plain text", "plain", times);

        assert_eq!(decoded.title(), "");
        assert_eq!(decoded.content(), "plain text");
        assert_eq!(decoded.created(), times.modified);
    }

    #[test]
    fn test_decode_unterminated_block_is_body_only() {
        assert_eq!(logger().name(), "Codec");
        let text = "---\ntitle: Never closed\ncreated: 2024-01-01T00:00:00Z\n\nbody text";
        let decoded = decode(text, "broken", file_times());

        assert_eq!(decoded.title(), "");
        assert_eq!(decoded.content(), text);
        assert_eq!(decoded.modified(), file_times().modified);
    }

    #[test]
    fn test_decode_crlf_line_endings() {
        let text = "---\r\ntitle: Windows\r\ncreated: 2024-01-01T00:00:00Z\r\nmodified: 2024-01-01T00:00:00Z\r\n---\r\n\r\n# Windows\r\n\r\nline one\r\nline two";
        let decoded = decode(text, "fallback", file_times());

        assert_eq!(decoded.title(), "Windows");
        assert_eq!(decoded.content(), "line one\nline two");
    }

    #[test]
    fn test_decode_degenerate_inputs() {
        for text in ["", "---", "---\n", "---\n---\n", "\n\n", "# ", "#"] {
            let decoded = decode(text, "odd", file_times());
            assert_eq!(decoded.id(), "odd");
            assert!(decoded.modified() >= decoded.created());
        }

        assert!(decode("", "odd", file_times()).is_empty());
        assert!(decode("---\n---\n", "odd", file_times()).is_empty());
    }

    #[test]
    fn test_decode_blank_id_uses_fallback() {
        let text = "---\nid: \ntitle: t\n---\n\nbody";
        assert_eq!(decode(text, "from-name", file_times()).id(), "from-name");
    }
}
