//! Capture date extraction from the sidecar's `formatted` timestamp.
//!
//! Exports write strings like `Jan 5, 2021, 3:04:05 PM UTC`, but the space
//! before `PM` or `UTC` is often a no-break space, sometimes stored as a
//! literal `\u202f` escape. Normalization happens in two stages, always in
//! this order:
//!
//! 1. [`decode_unicode_escapes`] turns `\uXXXX`, `\UXXXXXXXX` and `\xHH`
//!    escapes, plus the single-character ones (`\t`, `\n`, `\\`, ...), into
//!    the characters they name.
//! 2. [`strip_non_ascii`] replaces everything outside printable ASCII with a
//!    plain space.

use crate::error::DateError;
use crate::metadata::SidecarMetadata;
use chrono::{NaiveDate, NaiveDateTime};
use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::LazyLock;

pub const TIMESTAMP_FORMAT: &str = "%b %d, %Y, %I:%M:%S %p UTC";

static ESCAPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\\u([dD][89abAB][0-9a-fA-F]{2})\\u([dD][c-fC-F][0-9a-fA-F]{2})|\\u([0-9a-fA-F]{4})|\\U([0-9a-fA-F]{8})|\\x([0-9a-fA-F]{2})|\\([\\'"abfnrtv])"#,
    )
    .expect("Invalid regex for unicode escapes")
});

fn hex(caps: &Captures, group: usize) -> Option<u32> {
    caps.get(group)
        .and_then(|m| u32::from_str_radix(m.as_str(), 16).ok())
}

fn decode_escape(caps: &Captures) -> Option<char> {
    if let (Some(high), Some(low)) = (hex(caps, 1), hex(caps, 2)) {
        let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
        return char::from_u32(code);
    }
    if let Some(simple) = caps.get(6) {
        return match simple.as_str() {
            "a" => Some('\u{07}'),
            "b" => Some('\u{08}'),
            "f" => Some('\u{0c}'),
            "n" => Some('\n'),
            "r" => Some('\r'),
            "t" => Some('\t'),
            "v" => Some('\u{0b}'),
            other => other.chars().next(),
        };
    }
    [3, 4, 5]
        .into_iter()
        .find_map(|group| hex(caps, group))
        .and_then(char::from_u32)
}

/// Decodes backslash escapes into literal characters, repeating until no
/// decodable escape remains. Escapes naming invalid code points (such as a
/// lone surrogate) are kept verbatim.
#[must_use]
pub fn decode_unicode_escapes(input: &str) -> String {
    let mut current = input.to_string();
    loop {
        let decoded = ESCAPE_RE
            .replace_all(&current, |caps: &Captures| match decode_escape(caps) {
                Some(ch) => ch.to_string(),
                None => caps[0].to_string(),
            })
            .into_owned();
        if decoded == current {
            return decoded;
        }
        current = decoded;
    }
}

/// Replaces every character outside `0x20..=0x7E` with an ASCII space.
#[must_use]
pub fn strip_non_ascii(input: &str) -> String {
    input
        .chars()
        .map(|ch| if matches!(ch, ' '..='~') { ch } else { ' ' })
        .collect()
}

#[must_use]
pub fn normalize_timestamp(raw: &str) -> String {
    strip_non_ascii(&decode_unicode_escapes(raw))
}

pub fn parse_timestamp(raw: &str) -> Result<NaiveDate, DateError> {
    let normalized = normalize_timestamp(raw);
    let compact = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDateTime::parse_from_str(&compact, TIMESTAMP_FORMAT)
        .map(|dt| dt.date())
        .map_err(|source| DateError::Unparseable {
            raw: raw.to_string(),
            normalized,
            source,
        })
}

pub fn capture_date(metadata: &SidecarMetadata) -> Result<NaiveDate, DateError> {
    let taken_time = metadata.taken_time().ok_or(DateError::MissingTakenTime)?;
    let formatted = taken_time
        .get("formatted")
        .and_then(Value::as_str)
        .ok_or(DateError::MissingTimestamp)?;
    parse_timestamp(formatted)
}
