//! Shared validation for priorities, thought content, and latency values.
#![allow(dead_code)]

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Maximum stored thought content, in bytes. Longer content is truncated,
/// not rejected.
pub const MAX_CONTENT_BYTES: usize = 50_000;

/// Thought priority tier.
///
/// Variant order is the synthesis ranking: Critical sorts first, Low last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "P0")]
    Critical,
    #[serde(rename = "P1")]
    Normal,
    #[serde(rename = "P2")]
    Low,
}

impl Priority {
    /// The wire/storage token for this tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "P0",
            Priority::Normal => "P1",
            Priority::Low => "P2",
        }
    }

    /// Parse an exact tier token. Case-sensitive; anything but P0/P1/P2 is
    /// rejected.
    pub fn from_token(token: &str) -> Result<Self, Error> {
        match token {
            "P0" => Ok(Priority::Critical),
            "P1" => Ok(Priority::Normal),
            "P2" => Ok(Priority::Low),
            other => Err(Error::InvalidPriority(other.to_string())),
        }
    }

    /// Sort rank used by the storage layer (0 = Critical).
    pub fn rank(&self) -> i64 {
        *self as i64
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::from_token(s)
    }
}

impl ToSql for Priority {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Priority {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let token = value.as_str()?;
        Priority::from_token(token).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// Normalize a priority token: empty defaults to Normal, exact tier tokens
/// pass through, everything else is an error.
pub fn normalize_priority(token: &str) -> Result<Priority, Error> {
    if token.is_empty() {
        return Ok(Priority::Normal);
    }
    Priority::from_token(token)
}

/// Validate thought content.
///
/// Trimming applies to the emptiness check only; the stored content keeps
/// its original whitespace. Over-length content is silently truncated to
/// [`MAX_CONTENT_BYTES`], backing off to the nearest UTF-8 boundary.
pub fn normalize_content(content: &str) -> Result<String, Error> {
    if content.trim().is_empty() {
        return Err(Error::EmptyContent);
    }

    if content.len() <= MAX_CONTENT_BYTES {
        return Ok(content.to_string());
    }

    let mut end = MAX_CONTENT_BYTES;
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    Ok(content[..end].to_string())
}

/// Clamp a latency value: negatives become 0, never an error.
pub fn normalize_latency(ms: i64) -> i64 {
    ms.max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_accepts_exact_tokens() {
        assert_eq!(normalize_priority("P0").unwrap(), Priority::Critical);
        assert_eq!(normalize_priority("P1").unwrap(), Priority::Normal);
        assert_eq!(normalize_priority("P2").unwrap(), Priority::Low);
    }

    #[test]
    fn test_priority_empty_defaults_to_normal() {
        assert_eq!(normalize_priority("").unwrap(), Priority::Normal);
    }

    #[test]
    fn test_priority_rejects_lowercase() {
        assert!(normalize_priority("p0").is_err());
        assert!(normalize_priority("p1").is_err());
    }

    #[test]
    fn test_priority_rejects_unknown() {
        assert!(normalize_priority("P9").is_err());
        assert!(normalize_priority("critical").is_err());
        assert!(normalize_priority("P0 ").is_err());
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Critical < Priority::Normal);
        assert!(Priority::Normal < Priority::Low);
        assert_eq!(Priority::Critical.rank(), 0);
        assert_eq!(Priority::Low.rank(), 2);
    }

    #[test]
    fn test_priority_token_roundtrip() {
        for p in [Priority::Critical, Priority::Normal, Priority::Low] {
            assert_eq!(Priority::from_token(p.as_str()).unwrap(), p);
        }
    }

    #[test]
    fn test_content_accepts_valid() {
        let content = normalize_content("Hello world").unwrap();
        assert_eq!(content, "Hello world");
    }

    #[test]
    fn test_content_keeps_surrounding_whitespace() {
        let content = normalize_content("  padded  ").unwrap();
        assert_eq!(content, "  padded  ");
    }

    #[test]
    fn test_content_rejects_empty() {
        assert!(matches!(normalize_content(""), Err(Error::EmptyContent)));
    }

    #[test]
    fn test_content_rejects_whitespace_only() {
        assert!(matches!(
            normalize_content("   \t\n  "),
            Err(Error::EmptyContent)
        ));
    }

    #[test]
    fn test_content_truncates_long_input() {
        let long = "a".repeat(100_000);
        let content = normalize_content(&long).unwrap();
        assert_eq!(content.len(), MAX_CONTENT_BYTES);
    }

    #[test]
    fn test_content_truncation_respects_utf8_boundary() {
        // 4-byte codepoints straddle the 50 000 byte mark.
        let long = "🦫".repeat(20_000);
        let content = normalize_content(&long).unwrap();
        assert!(content.len() <= MAX_CONTENT_BYTES);
        assert_eq!(content.len() % 4, 0);
        assert!(content.chars().all(|c| c == '🦫'));
    }

    #[test]
    fn test_content_preserves_unicode() {
        let content = normalize_content("Hello 🦫").unwrap();
        assert_eq!(content, "Hello 🦫");
    }

    #[test]
    fn test_latency_clamps_negative() {
        assert_eq!(normalize_latency(-100), 0);
        assert_eq!(normalize_latency(-1), 0);
    }

    #[test]
    fn test_latency_passes_valid() {
        assert_eq!(normalize_latency(0), 0);
        assert_eq!(normalize_latency(500), 500);
        assert_eq!(normalize_latency(999_999_999_999), 999_999_999_999);
    }
}
