//! Frequency patterns and keyword sentiment over a report collection.

use chrono::Timelike;
use log::debug;
use serde::Serialize;
use strum_macros::Display;

use crate::normalize::NO_LOCATION;
use crate::types::{IncidentReport, Pattern, PatternKind, SentimentSummary, Severity};
use crate::util::{first_max, tally};

/// A location needs more than this many reports to be a hotspot.
pub const HOTSPOT_THRESHOLD: usize = 2;
/// The busiest hour needs more than this many reports.
pub const PEAK_HOUR_THRESHOLD: usize = 3;
/// The top category needs more than this many reports.
pub const TRENDING_THRESHOLD: usize = 5;

pub fn detect_patterns(records: &[IncidentReport]) -> Vec<Pattern> {
    let patterns: Vec<Pattern> = [
        location_hotspot(records),
        peak_reporting_hour(records),
        trending_category(records),
    ]
    .into_iter()
    .flatten()
    .collect();
    debug!("detected {} patterns over {} reports", patterns.len(), records.len());
    patterns
}

/// Reports without a location share the `NO_LOCATION` sentinel, which is
/// not a place and never forms a hotspot.
fn location_hotspot(records: &[IncidentReport]) -> Option<Pattern> {
    let counts = tally(
        records
            .iter()
            .map(|r| r.location.as_str())
            .filter(|loc| *loc != NO_LOCATION),
    );
    let (location, count) = *first_max(&counts)?;
    (count > HOTSPOT_THRESHOLD).then(|| Pattern {
        kind: PatternKind::GeographicHotspot,
        subject: location.to_string(),
        count,
        severity: Severity::High,
        description: format!("{count} reports from {location}"),
    })
}

fn peak_reporting_hour(records: &[IncidentReport]) -> Option<Pattern> {
    let mut hours = [0usize; 24];
    for ts in records.iter().filter_map(|r| r.reported_at) {
        hours[ts.hour() as usize] += 1;
    }
    let (hour, &count) = hours
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, &usize)>, (h, c)| match best {
            Some(b) if *b.1 >= *c => Some(b),
            _ => Some((h, c)),
        })?;
    (count > PEAK_HOUR_THRESHOLD).then(|| Pattern {
        kind: PatternKind::PeakReportingTime,
        subject: format!("{hour:02}:00"),
        count,
        severity: Severity::Medium,
        description: format!("Most reports ({count}) are submitted around {hour:02}:00"),
    })
}

fn trending_category(records: &[IncidentReport]) -> Option<Pattern> {
    let counts = tally(records.iter().map(|r| r.category));
    let (category, count) = *first_max(&counts)?;
    (count > TRENDING_THRESHOLD).then(|| Pattern {
        kind: PatternKind::TrendingIssue,
        subject: category.to_string(),
        count,
        severity: Severity::Medium,
        description: format!("{category} is the most reported category ({count} reports)"),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Sentiment {
    Urgent,
    Negative,
    Positive,
}

pub struct SentimentRule {
    pub sentiment: Sentiment,
    pub keywords: &'static [&'static str],
}

/// Evaluated top to bottom; the first rule with a matching keyword wins.
/// "urgent" sits in the negative set on purpose.
pub const SENTIMENT_RULES: [SentimentRule; 3] = [
    SentimentRule {
        sentiment: Sentiment::Urgent,
        keywords: &["emergency", "critical", "immediately", "danger", "safety", "accident"],
    },
    SentimentRule {
        sentiment: Sentiment::Negative,
        keywords: &["broken", "dangerous", "urgent", "failed", "complaint", "issue", "problem"],
    },
    SentimentRule {
        sentiment: Sentiment::Positive,
        keywords: &["fixed", "resolved", "thanks", "great", "good", "quick", "helpful"],
    },
];

/// Sentiment of one report, matched case-insensitively over title and
/// description.
pub fn classify(report: &IncidentReport) -> Option<Sentiment> {
    let text = format!("{} {}", report.title, report.description).to_lowercase();
    SENTIMENT_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| text.contains(k)))
        .map(|rule| rule.sentiment)
}

pub fn classify_sentiment(records: &[IncidentReport]) -> SentimentSummary {
    let mut summary = SentimentSummary {
        total: records.len(),
        ..SentimentSummary::default()
    };
    for sentiment in records.iter().filter_map(classify) {
        match sentiment {
            Sentiment::Urgent => summary.urgent += 1,
            Sentiment::Negative => summary.negative += 1,
            Sentiment::Positive => summary.positive += 1,
        }
    }
    summary
}
