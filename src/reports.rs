use chrono::{DateTime, Duration, Utc};
use strum_macros::{Display, EnumString};

use crate::latency::average_resolution_time;
use crate::patterns::classify_sentiment;
use crate::types::{
    Category, IncidentReport, LabelCount, PeriodComparison, Priority, RecentActivityRow,
    Status, StatusCount, SummaryStats, Trend,
};
use crate::util::tally;

const ALERT_WINDOW_HOURS: i64 = 24;
const COMPARISON_WINDOW_DAYS: i64 = 30;
const RECENT_WINDOW_DAYS: i64 = 7;
const SHORT_DESCRIPTION_LEN: usize = 100;

/// Look-back window for the overview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TimeRange {
    Week,
    Month,
    Quarter,
    #[default]
    All,
}

impl TimeRange {
    #[must_use]
    pub const fn days(self) -> Option<i64> {
        match self {
            Self::Week => Some(7),
            Self::Month => Some(30),
            Self::Quarter => Some(90),
            Self::All => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub status: Option<Status>,
    pub category: Option<Category>,
    pub search: Option<String>,
}

impl ReportFilter {
    pub fn matches(&self, r: &IncidentReport) -> bool {
        if self.status.is_some_and(|s| s != r.status) {
            return false;
        }
        if self.category.is_some_and(|c| c != r.category) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                [&r.title, &r.description, &r.location, &r.user_email]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&term))
            }
            _ => true,
        }
    }
}

pub fn filter_reports(records: &[IncidentReport], filter: &ReportFilter) -> Vec<IncidentReport> {
    records.iter().filter(|r| filter.matches(r)).cloned().collect()
}

/// Reports inside `range` ending at `now`. Reports without a timestamp
/// only survive [`TimeRange::All`].
pub fn within_range(
    records: &[IncidentReport],
    range: TimeRange,
    now: DateTime<Utc>,
) -> Vec<IncidentReport> {
    let Some(days) = range.days() else {
        return records.to_vec();
    };
    let start = now - Duration::days(days);
    records
        .iter()
        .filter(|r| r.reported_at.is_some_and(|ts| ts >= start))
        .cloned()
        .collect()
}

pub fn status_breakdown(records: &[IncidentReport]) -> Vec<StatusCount> {
    Status::all()
        .iter()
        .map(|&status| StatusCount {
            status,
            count: records.iter().filter(|r| r.status == status).count(),
        })
        .collect()
}

fn ranked_counts<K: ToString>(counts: Vec<(K, usize)>) -> Vec<LabelCount> {
    let mut rows: Vec<LabelCount> = counts
        .into_iter()
        .map(|(label, count)| LabelCount {
            label: label.to_string(),
            count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

pub fn count_by_category(records: &[IncidentReport]) -> Vec<LabelCount> {
    ranked_counts(tally(records.iter().map(|r| r.category)))
}

pub fn count_by_location(records: &[IncidentReport]) -> Vec<LabelCount> {
    ranked_counts(tally(records.iter().map(|r| r.location.as_str())))
}

/// High and critical reports raised in the last 24 hours.
pub fn active_alerts(records: &[IncidentReport], now: DateTime<Utc>) -> usize {
    let start = now - Duration::hours(ALERT_WINDOW_HOURS);
    records
        .iter()
        .filter(|r| matches!(r.priority, Priority::High | Priority::Critical))
        .filter(|r| r.reported_at.is_some_and(|ts| ts >= start && ts <= now))
        .count()
}

/// Whole-percent change from `previous` to `current`. A zero baseline
/// reads as +100% when anything happened and 0% otherwise.
pub fn percent_change(current: usize, previous: usize) -> i64 {
    if previous == 0 {
        return if current > 0 { 100 } else { 0 };
    }
    let change = (current as f64 - previous as f64) / previous as f64 * 100.0;
    change.round() as i64
}

/// Current window is `[now - 30d, now]`, previous is `[now - 60d, now - 30d)`.
pub fn period_comparison(records: &[IncidentReport], now: DateTime<Utc>) -> PeriodComparison {
    let window = Duration::days(COMPARISON_WINDOW_DAYS);
    let split = now - window;
    let floor = split - window;

    let (mut current_total, mut current_resolved) = (0usize, 0usize);
    let (mut previous_total, mut previous_resolved) = (0usize, 0usize);
    for r in records {
        let Some(ts) = r.reported_at else { continue };
        let resolved = usize::from(r.status == Status::Resolved);
        if ts >= split && ts <= now {
            current_total += 1;
            current_resolved += resolved;
        } else if ts >= floor && ts < split {
            previous_total += 1;
            previous_resolved += resolved;
        }
    }

    let total_change_pct = percent_change(current_total, previous_total);
    let resolved_change_pct = percent_change(current_resolved, previous_resolved);
    PeriodComparison {
        current_total,
        previous_total,
        total_change_pct,
        total_trend: Trend::from_change(total_change_pct),
        current_resolved,
        previous_resolved,
        resolved_change_pct,
        resolved_trend: Trend::from_change(resolved_change_pct),
    }
}

/// First sentence of `text`, cut to 100 characters.
pub fn short_description(text: &str) -> String {
    let first = text.split('.').next().unwrap_or_default();
    if first.chars().count() > SHORT_DESCRIPTION_LEN {
        let cut: String = first.chars().take(SHORT_DESCRIPTION_LEN).collect();
        format!("{cut}...")
    } else {
        first.to_string()
    }
}

/// Reports from the last 7 days, newest first.
pub fn recent_activity(
    records: &[IncidentReport],
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<RecentActivityRow> {
    let start = now - Duration::days(RECENT_WINDOW_DAYS);
    let mut recent: Vec<&IncidentReport> = records
        .iter()
        .filter(|r| r.reported_at.is_some_and(|ts| ts >= start))
        .collect();
    recent.sort_by(|a, b| b.reported_at.cmp(&a.reported_at));
    recent
        .into_iter()
        .take(limit)
        .map(|r| RecentActivityRow {
            reported: r
                .reported_at
                .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            title: r.title.clone(),
            status: r.status,
            summary: short_description(&r.description),
        })
        .collect()
}

pub fn generate_summary(records: &[IncidentReport], now: DateTime<Utc>) -> SummaryStats {
    let latency = average_resolution_time(records);
    SummaryStats {
        total_reports: records.len(),
        resolved_reports: records.iter().filter(|r| r.status == Status::Resolved).count(),
        active_alerts: active_alerts(records, now),
        average_response_time: latency.to_string(),
        resolution_latency: latency,
        comparison: period_comparison(records, now),
        status_breakdown: status_breakdown(records),
        by_category: count_by_category(records),
        by_location: count_by_location(records),
        sentiment: classify_sentiment(records),
    }
}
