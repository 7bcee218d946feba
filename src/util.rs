// Utility helpers for parsing and basic statistics.
//
// This module centralizes the forgiving timestamp/text handling so the
// aggregators can assume clean, typed values.
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use num_format::{Locale, ToFormattedString};
use std::collections::HashMap;
use std::hash::Hash;

use crate::types::RawTimestamp;

/// Parse a textual timestamp into UTC while being forgiving about the
/// formats that show up in store exports.
///
/// - RFC 3339 with any offset (converted to UTC).
/// - `YYYY-MM-DDTHH:MM:SS[.f]` and `YYYY-MM-DD HH:MM:SS[.f]`, taken as UTC.
/// - `YYYY-MM-DD`, taken as midnight UTC.
/// - A bare integer, taken as epoch milliseconds.
///
/// Returns `None` for anything that cannot be safely parsed.
pub fn parse_timestamp_safe(s: Option<&str>) -> Option<DateTime<Utc>> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    s.parse::<i64>().ok().and_then(DateTime::from_timestamp_millis)
}

pub fn resolve_timestamp(raw: Option<&RawTimestamp>) -> Option<DateTime<Utc>> {
    match raw? {
        RawTimestamp::Millis(ms) => DateTime::from_timestamp_millis(*ms),
        RawTimestamp::FractionalMillis(ms) if ms.is_finite() => {
            DateTime::from_timestamp_micros((ms * 1000.0).round() as i64)
        }
        RawTimestamp::FractionalMillis(_) => None,
        RawTimestamp::Seconds {
            seconds,
            nanoseconds,
        } => DateTime::from_timestamp(*seconds, *nanoseconds),
        RawTimestamp::Text(text) => parse_timestamp_safe(Some(text)),
    }
}

/// Treat blank strings the same as missing ones.
pub fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Signed hours from `start` to `end`, keeping sub-millisecond spans
/// non-zero. Falls back to coarser units when nanoseconds overflow.
pub fn hours_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let span = end - start;
    if let Some(ns) = span.num_nanoseconds() {
        ns as f64 / 3_600_000_000_000.0
    } else if let Some(us) = span.num_microseconds() {
        us as f64 / 3_600_000_000.0
    } else {
        span.num_milliseconds() as f64 / 3_600_000.0
    }
}

pub fn average(v: &[f64]) -> f64 {
    // Standard arithmetic mean; returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// Count occurrences of each key, keeping keys in first-seen order.
pub fn tally<K, I>(keys: I) -> Vec<(K, usize)>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = K>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, usize)> = Vec::new();
    for key in keys {
        match index.get(&key) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                index.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }
    counts
}

/// The entry with the highest count; on ties the earliest entry wins.
pub fn first_max<K>(counts: &[(K, usize)]) -> Option<&(K, usize)> {
    counts.iter().fold(None, |best, entry| match best {
        Some(b) if b.1 >= entry.1 => Some(b),
        _ => Some(entry),
    })
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus locale-aware thousands separators (`1,234.5`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Used for counts in console messages (e.g., `9,855 reports loaded`).
    n.to_formatted_string(&Locale::en)
}

/// Sub-hour durations render as whole minutes (`45m`), anything longer as
/// hours with one decimal (`2.5h`).
pub fn format_hours(hours: f64) -> String {
    if hours < 1.0 {
        format!("{}m", (hours * 60.0).round() as i64)
    } else {
        format!("{:.1}h", hours)
    }
}
