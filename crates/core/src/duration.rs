//! Human-readable duration strings
//!
//! Parses the compact `1h30m`, `45s`, `1.5s`, `250ms` notation used by
//! environment configuration into [`std::time::Duration`], and formats durations
//! back into the same notation.
//!
//! Supported units: `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`, `d`, `w`.
//! Components may be chained (`1m30s`) and carry a decimal fraction (`1.5h`).
//! The bare string `0` is accepted as zero.

use crate::error::{Error, ErrorCode, Result};
use std::time::Duration;

const NANOS_PER_UNIT: &[(&str, f64)] = &[
    ("ns", 1.0),
    ("us", 1e3),
    ("µs", 1e3),
    ("ms", 1e6),
    ("s", 1e9),
    ("m", 60.0 * 1e9),
    ("h", 3_600.0 * 1e9),
    ("d", 86_400.0 * 1e9),
    ("w", 604_800.0 * 1e9),
];

/// Parse a duration string such as `30s` or `1m30s`
pub fn parse_duration(input: &str) -> Result<Duration> {
    let text = input.trim();

    if text.is_empty() {
        return Err(invalid(input, "duration is empty"));
    }
    if text == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total_nanos = 0f64;
    let mut rest = text;

    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return Err(invalid(input, "expected a number"));
        }

        let (number, after_number) = rest.split_at(number_len);
        let value: f64 = number
            .parse()
            .map_err(|_| invalid(input, format!("`{number}` is not a number")))?;

        let unit_len = after_number
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after_number.len());
        let (unit, remainder) = after_number.split_at(unit_len);

        let factor = NANOS_PER_UNIT
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, factor)| *factor)
            .ok_or_else(|| {
                if unit.is_empty() {
                    invalid(input, format!("missing unit after `{number}`"))
                } else {
                    invalid(input, format!("unknown unit `{unit}`"))
                }
            })?;

        total_nanos += value * factor;
        rest = remainder;
    }

    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return Err(invalid(input, "duration is too large"));
    }

    Ok(Duration::from_nanos(total_nanos.round() as u64))
}

/// Format a duration using the largest whole units (`1m30s`, `250ms`)
pub fn format_duration(duration: Duration) -> String {
    if duration.is_zero() {
        return "0s".to_string();
    }

    if duration.subsec_nanos() % 1_000_000 != 0 {
        return format!("{}ns", duration.as_nanos());
    }
    if duration.subsec_millis() != 0 {
        return format!("{}ms", duration.as_millis());
    }

    let mut secs = duration.as_secs();
    let mut out = String::new();
    for (unit, size) in [("h", 3_600), ("m", 60), ("s", 1)] {
        if secs >= size {
            out.push_str(&format!("{}{unit}", secs / size));
            secs %= size;
        }
    }
    out
}

fn invalid(input: &str, reason: impl Into<String>) -> Error {
    Error::new(
        ErrorCode::InvalidConfigValue,
        format!("Invalid duration `{input}`: {}", reason.into()),
    )
    .with_suggestion("Use a value such as `30s`, `1m30s` or `500ms`")
}

/// Serde adapter storing a [`Duration`] as a human-readable string
///
/// ```rust,ignore
/// #[derive(Serialize, Deserialize)]
/// struct Settings {
///     #[serde(with = "cookbook_core::duration::serde_human")]
///     timeout: Duration,
/// }
/// ```
pub mod serde_human {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_duration(*duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_duration(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_units() {
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("2h").unwrap(), Duration::from_secs(7_200));
        assert_eq!(parse_duration("1d").unwrap(), Duration::from_secs(86_400));
        assert_eq!(parse_duration("15us").unwrap(), Duration::from_micros(15));
    }

    #[test]
    fn test_parse_compound_and_fractional() {
        assert_eq!(parse_duration("1m30s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1_500));
        assert_eq!(
            parse_duration("1h2m3s4ms").unwrap(),
            Duration::from_millis(3_723_004)
        );
        assert_eq!(parse_duration(" 10s ").unwrap(), Duration::from_secs(10));
    }

    #[test]
    fn test_parse_zero() {
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration("0s").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", "abc", "30", "10x", "s", "1..5s", "-5s"] {
            let err = parse_duration(input).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidConfigValue, "input: {input:?}");
        }
    }

    #[test]
    fn test_format() {
        assert_eq!(format_duration(Duration::from_secs(90)), "1m30s");
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_secs(3_600)), "1h");
        assert_eq!(format_duration(Duration::ZERO), "0s");
    }

    #[test]
    fn test_format_parses_back() {
        for duration in [
            Duration::from_secs(30),
            Duration::from_millis(1_250),
            Duration::from_secs(3_725),
        ] {
            assert_eq!(parse_duration(&format_duration(duration)).unwrap(), duration);
        }
    }
}
