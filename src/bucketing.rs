use chrono::{DateTime, Datelike, Utc};
use log::debug;
use std::collections::HashMap;
use strum_macros::{Display, EnumString};

use crate::types::{IncidentReport, Status, TrendBucket};

/// Period size for trend charting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Granularity {
    /// One bucket per calendar date (`5/15/2024`).
    Day,
    /// One bucket per weekday (`Sun`..`Sat`).
    #[default]
    Week,
    /// One bucket per week of the month (`Week 1`..`Week 5`).
    Month,
}

pub fn bucket_key(ts: DateTime<Utc>, granularity: Granularity) -> String {
    match granularity {
        Granularity::Day => ts.format("%-m/%-d/%Y").to_string(),
        Granularity::Week => ts.format("%a").to_string(),
        Granularity::Month => format!("Week {}", ts.day().div_ceil(7)),
    }
}

/// Group reports into trend buckets.
///
/// Buckets come back in the order their key was first seen, not sorted by
/// time. Reports without `reported_at` are left out entirely.
pub fn bucket(records: &[IncidentReport], granularity: Granularity) -> Vec<TrendBucket> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<TrendBucket> = Vec::new();
    let mut skipped = 0usize;

    for r in records {
        let Some(ts) = r.reported_at else {
            skipped += 1;
            continue;
        };
        let key = bucket_key(ts, granularity);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            buckets.push(TrendBucket {
                period: key,
                total: 0,
                resolved: 0,
                pending: 0,
            });
            buckets.len() - 1
        });
        let b = &mut buckets[slot];
        b.total += 1;
        if r.status == Status::Resolved {
            b.resolved += 1;
        } else {
            b.pending += 1;
        }
    }

    debug!(
        "bucketed {} reports into {} {} buckets ({} without timestamp)",
        records.len() - skipped,
        buckets.len(),
        granularity,
        skipped
    );
    buckets
}
