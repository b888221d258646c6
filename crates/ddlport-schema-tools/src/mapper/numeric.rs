//! Range-driven narrowing of sampled bounds
//!
//! Bounds arrive as the source engine's text and may exceed 64-bit range, so
//! all comparisons go through [`BigDecimal`].

use std::str::FromStr;

use bigdecimal::{BigDecimal, Signed, Zero};
use chrono::NaiveDateTime;

use super::MappedType;

/// Exclusive upper bounds for unsigned integer types, narrowest first
const UNSIGNED_TIERS: [(&str, &str); 5] = [
    ("TINYINT", "256"),
    ("SMALLINT", "65536"),
    ("MEDIUMINT", "16777216"),
    ("INT", "4294967296"),
    ("BIGINT", "18446744073709551616"),
];

/// Exclusive upper bounds on `max(|min|, max)` for signed integer types
const SIGNED_TIERS: [(&str, &str); 5] = [
    ("TINYINT", "128"),
    ("SMALLINT", "32768"),
    ("MEDIUMINT", "8388608"),
    ("INT", "2147483648"),
    ("BIGINT", "9223372036854775808"),
];

const TIMESTAMP_FLOOR: &str = "1970-01-01 00:00:01";
const TIMESTAMP_CEILING: &str = "2038-01-19 03:14:07";

/// Parses a sampled bound, missing or unparseable bounds count as zero
pub fn parse_bound(value: Option<&str>) -> BigDecimal {
    value
        .and_then(|text| BigDecimal::from_str(text.trim()).ok())
        .unwrap_or_else(BigDecimal::zero)
}

/// Smallest MySQL integer type holding every value in `[min, max]`.
///
/// Ranges starting at zero or above pick an unsigned type. Ranges beyond
/// the widest integer fall back to `NUMERIC` (unsigned) or `DECIMAL`.
pub fn narrowest_integer(min: Option<&str>, max: Option<&str>) -> MappedType {
    let min = parse_bound(min);
    let max = parse_bound(max);

    if !min.is_negative() {
        return first_tier(&UNSIGNED_TIERS, &max)
            .map(MappedType::unsigned)
            .unwrap_or_else(|| MappedType::new("NUMERIC"));
    }

    let magnitude = std::cmp::max(min.abs(), max);
    first_tier(&SIGNED_TIERS, &magnitude)
        .map(MappedType::new)
        .unwrap_or_else(|| MappedType::new("DECIMAL"))
}

fn first_tier(tiers: &[(&'static str, &'static str)], value: &BigDecimal) -> Option<&'static str> {
    tiers.iter().find_map(|(name, bound)| {
        let bound = BigDecimal::from_str(bound).ok()?;
        (*value < bound).then_some(*name)
    })
}

/// Whether sampled datetime bounds fit MySQL's `TIMESTAMP` range.
///
/// Both bounds must be present and readable.
pub fn fits_timestamp_range(min: Option<&str>, max: Option<&str>) -> bool {
    let (Some(min), Some(max)) = (min.and_then(parse_datetime), max.and_then(parse_datetime))
    else {
        return false;
    };
    let (Some(floor), Some(ceiling)) = (parse_datetime(TIMESTAMP_FLOOR), parse_datetime(TIMESTAMP_CEILING))
    else {
        return false;
    };
    min >= floor && max <= ceiling
}

/// Reads the date and time-of-day part of an engine's datetime text,
/// ignoring fractional seconds and offsets
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(parsed);
        }
    }

    let head = text.get(..19)?.replace('T', " ");
    NaiveDateTime::parse_from_str(&head, "%Y-%m-%d %H:%M:%S").ok()
}
