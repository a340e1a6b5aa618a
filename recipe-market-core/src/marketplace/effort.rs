//! Estimated-effort durations
//!
//! Listings carry their estimated effort as an ISO-8601 duration literal of
//! the `PnDTnHnMn.nS` shape (`PT5M`, `PT1H30M`, `P1D`, `-PT0.5S`). Days are
//! folded into hours when rendering, so `P1D` is written back as `PT24H`.

use chrono::TimeDelta;

use crate::error::{MarketplaceError, MarketplaceResult};

const NANOS_PER_SECOND: i128 = 1_000_000_000;
const NANOS_PER_MINUTE: i128 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: i128 = 60 * NANOS_PER_MINUTE;
const NANOS_PER_DAY: i128 = 24 * NANOS_PER_HOUR;

/// Parse an ISO-8601 duration literal
pub fn parse_effort(text: &str) -> MarketplaceResult<TimeDelta> {
    let invalid = |reason: &str| MarketplaceError::InvalidDuration {
        value: text.to_string(),
        reason: reason.to_string(),
    };

    let upper = text.trim().to_ascii_uppercase();
    let (negative, unsigned) = match upper.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, upper.strip_prefix('+').unwrap_or(&upper)),
    };

    let body = unsigned
        .strip_prefix('P')
        .ok_or_else(|| invalid("expected leading 'P' designator"))?;

    let (date_part, time_part) = match body.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (body, None),
    };

    let mut total: i128 = 0;
    let mut components = 0;

    if !date_part.is_empty() {
        let days = date_part
            .strip_suffix('D')
            .ok_or_else(|| invalid("only a day component may precede 'T'"))?;
        let days = parse_whole(days).ok_or_else(|| invalid("day count is not a whole number"))?;
        total = accumulate(total, days, NANOS_PER_DAY)
            .ok_or_else(|| invalid("duration out of range"))?;
        components += 1;
    }

    if let Some(time) = time_part {
        if time.is_empty() {
            return Err(invalid("'T' must be followed by a time component"));
        }

        let mut remaining = time;
        for (designator, unit) in [('H', NANOS_PER_HOUR), ('M', NANOS_PER_MINUTE)] {
            if let Some(idx) = remaining.find(designator) {
                let amount = parse_whole(&remaining[..idx])
                    .ok_or_else(|| invalid("time component is not a whole number"))?;
                total = accumulate(total, amount, unit)
                    .ok_or_else(|| invalid("duration out of range"))?;
                remaining = &remaining[idx + 1..];
                components += 1;
            }
        }

        if !remaining.is_empty() {
            let seconds = remaining
                .strip_suffix('S')
                .ok_or_else(|| invalid("unrecognized trailing time component"))?;
            let nanos = parse_seconds(seconds)
                .ok_or_else(|| invalid("seconds must be a decimal number"))?
                .ok_or_else(|| invalid("duration out of range"))?;
            total = total
                .checked_add(nanos)
                .ok_or_else(|| invalid("duration out of range"))?;
            components += 1;
        }
    }

    if components == 0 {
        return Err(invalid("no duration components present"));
    }

    let seconds = i64::try_from(total / NANOS_PER_SECOND)
        .map_err(|_| invalid("duration out of range"))?;
    let nanos = (total % NANOS_PER_SECOND) as u32;
    let delta = TimeDelta::new(seconds, nanos).ok_or_else(|| invalid("duration out of range"))?;

    Ok(if negative { -delta } else { delta })
}

/// Render a duration in the canonical `PTnHnMn.nS` form
pub fn format_effort(delta: &TimeDelta) -> String {
    if delta.is_zero() {
        return "PT0S".to_string();
    }

    let abs = delta.abs();
    let total_seconds = abs.num_seconds();
    let nanos = abs.subsec_nanos();

    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    let mut out = String::new();
    if *delta < TimeDelta::zero() {
        out.push('-');
    }
    out.push_str("PT");
    if hours != 0 {
        out.push_str(&format!("{hours}H"));
    }
    if minutes != 0 {
        out.push_str(&format!("{minutes}M"));
    }
    if seconds != 0 || nanos != 0 {
        out.push_str(&seconds.to_string());
        if nanos != 0 {
            let fraction = format!("{nanos:09}");
            out.push('.');
            out.push_str(fraction.trim_end_matches('0'));
        }
        out.push('S');
    }
    out
}

/// `total + amount * unit`, or `None` on overflow
fn accumulate(total: i128, amount: i128, unit: i128) -> Option<i128> {
    amount.checked_mul(unit)?.checked_add(total)
}

fn parse_whole(digits: &str) -> Option<i128> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Outer `None` for a malformed literal, inner `None` when it overflows
fn parse_seconds(text: &str) -> Option<Option<i128>> {
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (text, ""),
    };

    let whole = parse_whole(whole)?;
    let mut fraction_nanos = 0;
    if !fraction.is_empty() {
        if fraction.len() > 9 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let padded = format!("{fraction:0<9}");
        fraction_nanos = padded.parse::<i128>().ok()?;
    }
    Some(accumulate(fraction_nanos, whole, NANOS_PER_SECOND))
}

#[cfg(test)]
mod effort_tests {
    use super::*;

    #[test]
    fn test_parse_minutes() {
        assert_eq!(parse_effort("PT5M").unwrap(), TimeDelta::minutes(5));
    }

    #[test]
    fn test_parse_mixed_components() {
        let parsed = parse_effort("P1DT2H30M15.5S").unwrap();
        let expected = TimeDelta::days(1)
            + TimeDelta::hours(2)
            + TimeDelta::minutes(30)
            + TimeDelta::milliseconds(15_500);
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_parse_is_case_insensitive_and_signed() {
        assert_eq!(parse_effort("pt10s").unwrap(), TimeDelta::seconds(10));
        assert_eq!(parse_effort("-PT1M").unwrap(), TimeDelta::minutes(-1));
    }

    #[test]
    fn test_parse_rejects_malformed_literals() {
        for bad in ["5M", "P", "PT", "PT5X", "PTM", "P1H", "PT1.2.3S", "five minutes"] {
            let err = parse_effort(bad).unwrap_err();
            assert!(
                err.to_string().contains(bad),
                "error for {bad:?} should name the literal, got: {err}"
            );
        }
    }

    #[test]
    fn test_parse_overflowing_counts_is_an_error() {
        for huge in [
            "P99999999999999999999999999999999D",
            "PT99999999999999999999999999999999999H",
            "PT99999999999999999999999999999999999M",
            "PT99999999999999999999999999999999.5S",
            "P106751991167301DT1H",
        ] {
            let err = parse_effort(huge).unwrap_err();
            assert!(
                matches!(err, MarketplaceError::InvalidDuration { ref value, .. } if value == huge),
                "unexpected error for {huge:?}: {err}"
            );
        }
    }

    #[test]
    fn test_format_canonical() {
        assert_eq!(format_effort(&TimeDelta::minutes(5)), "PT5M");
        assert_eq!(format_effort(&TimeDelta::days(1)), "PT24H");
        assert_eq!(format_effort(&TimeDelta::zero()), "PT0S");
        assert_eq!(format_effort(&TimeDelta::milliseconds(1500)), "PT1.5S");
        assert_eq!(format_effort(&TimeDelta::minutes(-90)), "-PT1H30M");
    }

    #[test]
    fn test_format_then_parse_is_stable() {
        let delta = parse_effort("P2DT3M0.25S").unwrap();
        assert_eq!(parse_effort(&format_effort(&delta)).unwrap(), delta);
    }
}
