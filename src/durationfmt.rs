//! Flexible duration syntax for CLI flags, plus human-readable formatting
//! for log output.
//!
//! Accepted forms, all non-negative:
//! - bare integer: seconds (`"120"` → 2 minutes, `"0"` → zero)
//! - clock notation: `H:MM` or `H:MM:SS` with minutes/seconds below 60
//! - suffixed integer: `90s`, `5m`, `1h` (suffix is case-insensitive)
//!
//! Anything else is a configuration error surfaced before startup.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parses the flexible duration syntax. The error string is shown verbatim
/// by the CLI layer, so it names the offending value and lists examples.
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let s = value.trim();

    if let Ok(seconds) = s.parse::<u64>() {
        return Ok(Duration::from_secs(seconds));
    }

    if s.contains(':') {
        return parse_clock(s).ok_or_else(|| invalid(value));
    }

    let lower = s.to_ascii_lowercase();
    let (digits, unit_seconds) = if let Some(d) = lower.strip_suffix('s') {
        (d, 1)
    } else if let Some(d) = lower.strip_suffix('m') {
        (d, 60)
    } else if let Some(d) = lower.strip_suffix('h') {
        (d, 3600)
    } else {
        return Err(invalid(value));
    };

    let count: u64 = digits.parse().map_err(|_| invalid(value))?;
    count
        .checked_mul(unit_seconds)
        .map(Duration::from_secs)
        .ok_or_else(|| invalid(value))
}

/// Parses `H:MM` / `H:MM:SS` clock notation. Minutes and seconds must be
/// below 60; hours are unbounded.
fn parse_clock(s: &str) -> Option<Duration> {
    let fields: Vec<u64> = s
        .split(':')
        .map(|part| part.parse::<u64>().ok())
        .collect::<Option<_>>()?;

    let seconds = match fields[..] {
        [hours, minutes] if minutes < 60 => hours.checked_mul(3600)?.checked_add(minutes * 60)?,
        [hours, minutes, secs] if minutes < 60 && secs < 60 => hours
            .checked_mul(3600)?
            .checked_add(minutes * 60)?
            .checked_add(secs)?,
        _ => return None,
    };
    Some(Duration::from_secs(seconds))
}

fn invalid(value: &str) -> String {
    format!("invalid duration '{value}' (examples: 120, 00:02:00, 90s, 5m, 1h)")
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Renders a duration as the largest applicable units, e.g. `1h 2m 3s`.
/// Sub-second precision is dropped; zero renders as `0s`.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let days = total / 86400;
    let hours = (total % 86400) / 3600;
    let mins = (total % 3600) / 60;
    let secs = total % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if mins > 0 {
        parts.push(format!("{mins}m"));
    }
    if secs > 0 || parts.is_empty() {
        parts.push(format!("{secs}s"));
    }

    parts.join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_integer_is_seconds() {
        assert_eq!(parse_duration("30"), Ok(Duration::from_secs(30)));
        assert_eq!(parse_duration("0"), Ok(Duration::ZERO));
        assert_eq!(parse_duration("120"), Ok(Duration::from_secs(120)));
    }

    #[test]
    fn suffixed_forms() {
        assert_eq!(parse_duration("90s"), Ok(Duration::from_secs(90)));
        assert_eq!(parse_duration("5m"), Ok(Duration::from_secs(300)));
        assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
    }

    #[test]
    fn suffix_is_case_insensitive() {
        assert_eq!(parse_duration("90S"), Ok(Duration::from_secs(90)));
        assert_eq!(parse_duration("5M"), Ok(Duration::from_secs(300)));
        assert_eq!(parse_duration("2H"), Ok(Duration::from_secs(7200)));
    }

    #[test]
    fn clock_notation() {
        assert_eq!(parse_duration("00:02:00"), Ok(Duration::from_secs(120)));
        assert_eq!(parse_duration("1:30"), Ok(Duration::from_secs(5400)));
        assert_eq!(parse_duration("0:00:45"), Ok(Duration::from_secs(45)));
        assert_eq!(parse_duration("26:00:00"), Ok(Duration::from_secs(26 * 3600)));
    }

    #[test]
    fn clock_rejects_out_of_range_fields() {
        assert!(parse_duration("0:60").is_err());
        assert!(parse_duration("0:00:60").is_err());
        assert!(parse_duration("1:2:3:4").is_err());
        assert!(parse_duration(":30").is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("5x").is_err());
        assert!(parse_duration("-5").is_err());
        assert!(parse_duration("-5m").is_err());
        assert!(parse_duration("1.5h").is_err());
        assert!(parse_duration("m").is_err());
    }

    #[test]
    fn error_message_names_the_value() {
        let err = parse_duration("bogus").unwrap_err();
        assert!(err.contains("bogus"));
    }

    #[test]
    fn oversized_values_are_rejected_not_wrapped() {
        assert!(parse_duration(&format!("{}h", u64::MAX)).is_err());
    }

    #[test]
    fn formats_largest_units_first() {
        assert_eq!(format_duration(Duration::ZERO), "0s");
        assert_eq!(format_duration(Duration::from_secs(59)), "59s");
        assert_eq!(format_duration(Duration::from_secs(60)), "1m");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(3661)), "1h 1m 1s");
        assert_eq!(format_duration(Duration::from_secs(90061)), "1d 1h 1m 1s");
    }
}
