use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::normalize::normalize;
use crate::types::{Category, IncidentReport, Priority, RawReport, Status};

/// Wednesday 2024-05-15 12:00:00 UTC.
pub fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

pub fn hours_ago(hours: i64) -> DateTime<Utc> {
    reference_now() - Duration::hours(hours)
}

/// A normalized report with no timestamps and every field defaulted.
pub fn blank() -> IncidentReport {
    normalize(RawReport::default())
}

pub fn reported(ts: DateTime<Utc>) -> IncidentReport {
    IncidentReport {
        reported_at: Some(ts),
        ..blank()
    }
}

pub fn with_status(mut report: IncidentReport, status: Status) -> IncidentReport {
    report.status = status;
    report
}

pub fn with_priority(mut report: IncidentReport, priority: Priority) -> IncidentReport {
    report.priority = priority;
    report.priority_declared = true;
    report
}

pub fn with_category(mut report: IncidentReport, category: Category) -> IncidentReport {
    report.category = category;
    report
}

pub fn with_location(mut report: IncidentReport, location: &str) -> IncidentReport {
    report.location = location.to_string();
    report
}

pub fn with_text(mut report: IncidentReport, title: &str, description: &str) -> IncidentReport {
    report.title = title.to_string();
    report.description = description.to_string();
    report
}

pub fn with_id(mut report: IncidentReport, id: &str) -> IncidentReport {
    report.id = id.to_string();
    report
}
