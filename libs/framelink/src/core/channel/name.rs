// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Channel names, embedded rate hints and derived sync-object names.
//!
//! A channel name may carry a rate hint suffix: `Cam|FPS=30` or
//! `Cam|FPS=30000/1001`. The part before the suffix (the base name) is what
//! discovery and the frame-sync event use, so producers and consumers
//! converge whether or not they spell the hint.

use std::fmt;

use super::FrameRate;

/// Separator introducing the rate hint suffix.
pub const RATE_HINT_SEPARATOR: &str = "|FPS=";

/// Prefix of the kernel-visible frame-sync event derived from a base name.
pub const SYNC_EVENT_PREFIX: &str = "Spout-Sync-";

/// A parsed channel name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelName {
    full: String,
    base_len: usize,
}

impl ChannelName {
    pub fn parse(raw: impl Into<String>) -> Self {
        let full = raw.into();
        let base_len = base_name(&full).len();
        Self { full, base_len }
    }

    /// The name exactly as given, including any rate hint.
    pub fn as_str(&self) -> &str {
        &self.full
    }

    /// The name with any rate hint stripped.
    pub fn base(&self) -> &str {
        &self.full[..self.base_len]
    }

    pub fn is_empty(&self) -> bool {
        self.base_len == 0
    }

    /// Rate parsed from the hint suffix, if present and positive.
    pub fn rate_hint(&self) -> Option<FrameRate> {
        parse_rate_hint(&self.full)
    }

    /// Name of the frame-sync event shared by every endpoint of this channel.
    pub fn sync_object_name(&self) -> String {
        sync_object_name(&self.full)
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

impl From<&str> for ChannelName {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for ChannelName {
    fn from(raw: String) -> Self {
        Self::parse(raw)
    }
}

/// Strip a `|FPS=` suffix, returning the base name.
pub fn base_name(raw: &str) -> &str {
    match raw.find(RATE_HINT_SEPARATOR) {
        Some(idx) => &raw[..idx],
        None => raw,
    }
}

/// Parse the `|FPS=<num>[/<den>]` suffix.
///
/// Components are read like C `atoi` (leading digits, trailing junk ignored);
/// non-positive components yield `None`.
pub fn parse_rate_hint(raw: &str) -> Option<FrameRate> {
    let idx = raw.find(RATE_HINT_SEPARATOR)?;
    let hint = &raw[idx + RATE_HINT_SEPARATOR.len()..];

    let (numerator, denominator) = match hint.split_once('/') {
        Some((num, den)) => (leading_int(num), leading_int(den)),
        None => (leading_int(hint), 1),
    };

    if numerator > 0 && denominator > 0 {
        Some(FrameRate::new(
            u32::try_from(numerator).ok()?,
            u32::try_from(denominator).ok()?,
        ))
    } else {
        None
    }
}

/// Derive the frame-sync event name. The rate hint never participates.
pub fn sync_object_name(raw: &str) -> String {
    format!("{}{}", SYNC_EVENT_PREFIX, base_name(raw))
}

fn leading_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for byte in digits.bytes() {
        if !byte.is_ascii_digit() {
            break;
        }
        value = value.saturating_mul(10).saturating_add((byte - b'0') as i64);
    }

    if negative { -value } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name_strips_hint() {
        assert_eq!(base_name("Cam|FPS=30"), "Cam");
        assert_eq!(base_name("Cam|FPS=30000/1001"), "Cam");
        assert_eq!(base_name("Cam"), "Cam");
        assert_eq!(base_name("|FPS=30"), "");
    }

    #[test]
    fn test_sync_object_name_ignores_hint() {
        assert_eq!(sync_object_name("Foo|FPS=30/1"), sync_object_name("Foo"));
        assert_eq!(sync_object_name("Foo"), "Spout-Sync-Foo");
    }

    #[test]
    fn test_rate_hint_whole_number() {
        assert_eq!(parse_rate_hint("Cam|FPS=30"), Some(FrameRate::new(30, 1)));
    }

    #[test]
    fn test_rate_hint_fraction() {
        assert_eq!(
            parse_rate_hint("Cam|FPS=30000/1001"),
            Some(FrameRate::new(30000, 1001))
        );
    }

    #[test]
    fn test_rate_hint_rejects_non_positive() {
        assert_eq!(parse_rate_hint("Cam|FPS=0"), None);
        assert_eq!(parse_rate_hint("Cam|FPS=30/0"), None);
        assert_eq!(parse_rate_hint("Cam|FPS=-5"), None);
        assert_eq!(parse_rate_hint("Cam|FPS=abc"), None);
        assert_eq!(parse_rate_hint("Cam"), None);
    }

    #[test]
    fn test_rate_hint_atoi_semantics() {
        assert_eq!(parse_rate_hint("Cam|FPS=24fps"), Some(FrameRate::new(24, 1)));
        assert_eq!(parse_rate_hint("Cam|FPS= 25/1"), Some(FrameRate::new(25, 1)));
    }

    #[test]
    fn test_channel_name_accessors() {
        let name = ChannelName::parse("Cam|FPS=30");
        assert_eq!(name.as_str(), "Cam|FPS=30");
        assert_eq!(name.base(), "Cam");
        assert_eq!(name.rate_hint(), Some(FrameRate::fps(30)));
        assert!(!name.is_empty());
        assert!(ChannelName::parse("").is_empty());
    }
}
