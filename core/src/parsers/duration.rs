//! Signed magnitude-plus-unit durations (`1h30m`, `-1.5s`, `500ms`).

use std::sync::LazyLock;

use chrono::TimeDelta;
use regex::Regex;

use super::ValueError;

const NANOS_PER_SECOND: u128 = 1_000_000_000;

// One `<decimal><unit>` component; every group may be empty and is checked
// by the caller.
static COMPONENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]*)(?:\.([0-9]*))?([^0-9.]*)").expect("static regex must compile")
});

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "\u{00b5}s" | "\u{03bc}s" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(NANOS_PER_SECOND),
        "m" => Some(60 * NANOS_PER_SECOND),
        "h" => Some(3_600 * NANOS_PER_SECOND),
        _ => None,
    }
}

/// Parses a duration such as `1h30m`, `-1.5s` or `300ms`.
///
/// The total must fit a signed 64-bit count of nanoseconds. The bare string
/// `0` is accepted without a unit.
///
/// # Examples
///
/// ```
/// use chrono::TimeDelta;
/// use protoflag_core::parse_duration;
///
/// assert_eq!(parse_duration("1h30m").unwrap(), TimeDelta::minutes(90));
/// assert_eq!(parse_duration("-1.5s").unwrap(), TimeDelta::milliseconds(-1500));
/// assert_eq!(parse_duration("0").unwrap(), TimeDelta::zero());
/// assert!(parse_duration("10").is_err());
/// assert!(parse_duration("3d").is_err());
/// ```
pub fn parse_duration(raw: &str) -> Result<TimeDelta, ValueError> {
    let err = |reason: &'static str| ValueError::DurationFormat {
        raw: raw.to_string(),
        reason,
    };

    let (negative, mut rest) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    if rest == "0" {
        return Ok(TimeDelta::zero());
    }
    if rest.is_empty() {
        return Err(err("empty duration"));
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let caps = COMPONENT_RE
            .captures(rest)
            .ok_or_else(|| err("invalid duration"))?;
        let whole = caps.get(1).map_or("", |m| m.as_str());
        let fraction = caps.get(2).map_or("", |m| m.as_str());
        let unit = caps.get(3).map_or("", |m| m.as_str());
        let consumed = caps.get(0).map_or(0, |m| m.end());

        if whole.is_empty() && fraction.is_empty() {
            return Err(err("expected a number"));
        }
        if unit.is_empty() {
            return Err(err("missing unit"));
        }
        let scale = unit_nanos(unit).ok_or_else(|| err("unknown unit"))?;

        let whole_value = if whole.is_empty() {
            0
        } else {
            whole.parse::<u128>().map_err(|_| err("overflow"))?
        };
        total = whole_value
            .checked_mul(scale)
            .and_then(|v| total.checked_add(v))
            .ok_or_else(|| err("overflow"))?;

        if !fraction.is_empty() {
            // Digits past nanosecond precision of the largest unit cannot
            // change the result.
            let digits = &fraction[..fraction.len().min(18)];
            let numerator: u128 = digits.parse().map_err(|_| err("invalid fraction"))?;
            let denominator = 10u128.pow(digits.len() as u32);
            total = total
                .checked_add(numerator * scale / denominator)
                .ok_or_else(|| err("overflow"))?;
        }

        rest = &rest[consumed..];
    }

    let limit = if negative {
        i64::MAX as u128 + 1
    } else {
        i64::MAX as u128
    };
    if total > limit {
        return Err(err("overflow"));
    }

    let nanos = if negative {
        (total as i128).wrapping_neg() as i64
    } else {
        total as i64
    };
    Ok(TimeDelta::nanoseconds(nanos))
}

/// Formats a duration in the form [`parse_duration`] reads back:
/// `1h30m0s`, `1.5s`, `500ms`, `0s`.
///
/// # Examples
///
/// ```
/// use chrono::TimeDelta;
/// use protoflag_core::format_duration;
///
/// assert_eq!(format_duration(TimeDelta::minutes(90)), "1h30m0s");
/// assert_eq!(format_duration(TimeDelta::milliseconds(1500)), "1.5s");
/// assert_eq!(format_duration(TimeDelta::microseconds(-250)), "-250\u{00b5}s");
/// assert_eq!(format_duration(TimeDelta::zero()), "0s");
/// ```
pub fn format_duration(duration: TimeDelta) -> String {
    let total =
        duration.num_seconds() as i128 * NANOS_PER_SECOND as i128 + duration.subsec_nanos() as i128;
    if total == 0 {
        return "0s".to_string();
    }

    let mut out = String::new();
    if total < 0 {
        out.push('-');
    }
    let mut rest = total.unsigned_abs();

    if rest < NANOS_PER_SECOND {
        let (scale, unit) = if rest < 1_000 {
            (1, "ns")
        } else if rest < 1_000_000 {
            (1_000, "\u{00b5}s")
        } else {
            (1_000_000, "ms")
        };
        out.push_str(&(rest / scale).to_string());
        out.push_str(&fraction_digits(rest % scale, scale));
        out.push_str(unit);
        return out;
    }

    let hours = rest / (3_600 * NANOS_PER_SECOND);
    rest %= 3_600 * NANOS_PER_SECOND;
    let minutes = rest / (60 * NANOS_PER_SECOND);
    rest %= 60 * NANOS_PER_SECOND;

    if hours > 0 {
        out.push_str(&format!("{hours}h{minutes}m"));
    } else if minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    out.push_str(&(rest / NANOS_PER_SECOND).to_string());
    out.push_str(&fraction_digits(rest % NANOS_PER_SECOND, NANOS_PER_SECOND));
    out.push('s');
    out
}

fn fraction_digits(remainder: u128, scale: u128) -> String {
    if remainder == 0 {
        return String::new();
    }
    let width = scale.to_string().len() - 1;
    let digits = format!("{remainder:0width$}");
    format!(".{}", digits.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compound_and_fractional_units() {
        assert_eq!(
            parse_duration("2h45m30.5s").unwrap(),
            TimeDelta::milliseconds(((2 * 60 + 45) * 60 + 30) * 1000 + 500)
        );
        assert_eq!(parse_duration("1.5\u{00b5}s").unwrap(), TimeDelta::nanoseconds(1500));
        assert_eq!(parse_duration("1.5us").unwrap(), TimeDelta::nanoseconds(1500));
        assert_eq!(parse_duration(".5m").unwrap(), TimeDelta::seconds(30));
        assert_eq!(parse_duration("+10ns").unwrap(), TimeDelta::nanoseconds(10));
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        for raw in ["", "-", "s", "1", "1.s5", ".s", "1x", "1h-5m", "--1s"] {
            assert!(
                matches!(parse_duration(raw), Err(ValueError::DurationFormat { .. })),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_enforces_i64_nanosecond_range() {
        assert_eq!(
            parse_duration("9223372036854775807ns").unwrap(),
            TimeDelta::nanoseconds(i64::MAX)
        );
        assert_eq!(
            parse_duration("-9223372036854775808ns").unwrap(),
            TimeDelta::nanoseconds(i64::MIN)
        );
        assert!(parse_duration("9223372036854775808ns").is_err());
        assert!(parse_duration("2562048h").is_err());
    }

    #[test]
    fn test_format_round_trips() {
        for nanos in [1, 999, 1_500, 2_000_000, 59_999_999_999, 3_600_000_000_000, -90_061_001_000_000] {
            let d = TimeDelta::nanoseconds(nanos);
            let raw = format_duration(d);
            assert_eq!(parse_duration(&raw).unwrap(), d, "formatted as {raw:?}");
        }
        assert_eq!(format_duration(TimeDelta::seconds(90)), "1m30s");
        assert_eq!(format_duration(TimeDelta::nanoseconds(i64::MAX)), "2562047h47m16.854775807s");
    }
}
