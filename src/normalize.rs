//! Coerces raw export documents into [`IncidentReport`]s.
//!
//! Text fields fall back to fixed sentinels and enum fields to their
//! defaults, so nothing downstream branches on absence. Timestamps are the
//! exception: a report without `reportedAt` keeps `None` and the temporal
//! aggregators skip it.

use std::str::FromStr;

use crate::types::{IncidentReport, MediaAttachment, Priority, RawReport};
use crate::util::{non_blank, resolve_timestamp};

pub const UNTITLED: &str = "Untitled Report";
pub const NO_DESCRIPTION: &str = "No description provided";
pub const NO_LOCATION: &str = "Location not specified";
pub const UNKNOWN_SUBMITTER: &str = "Unknown";

fn parse_enum<T: FromStr>(raw: Option<&str>) -> Option<T> {
    raw.and_then(|v| T::from_str(v.trim()).ok())
}

pub fn normalize(raw: RawReport) -> IncidentReport {
    let declared = parse_enum::<Priority>(raw.priority.as_deref());
    let media = non_blank(raw.media_url).map(|url| MediaAttachment {
        url,
        is_video: raw.is_video.unwrap_or(false),
    });

    IncidentReport {
        id: non_blank(raw.id).unwrap_or_default(),
        title: non_blank(raw.title).unwrap_or_else(|| UNTITLED.to_string()),
        description: non_blank(raw.description).unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        category: parse_enum(raw.category.as_deref()).unwrap_or_default(),
        priority: declared.unwrap_or_default(),
        priority_declared: declared.is_some(),
        status: parse_enum(raw.status.as_deref()).unwrap_or_default(),
        location: non_blank(raw.location).unwrap_or_else(|| NO_LOCATION.to_string()),
        reported_at: resolve_timestamp(raw.reported_at.as_ref()),
        updated_at: resolve_timestamp(raw.updated_at.as_ref()),
        media,
        user_email: non_blank(raw.user_email).unwrap_or_else(|| UNKNOWN_SUBMITTER.to_string()),
    }
}

pub fn normalize_all<I>(raws: I) -> Vec<IncidentReport>
where
    I: IntoIterator<Item = RawReport>,
{
    raws.into_iter().map(normalize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, RawTimestamp, Status};

    #[test]
    fn empty_record_gets_every_default() {
        let report = normalize(RawReport::default());
        assert_eq!(report.status, Status::Pending);
        assert_eq!(report.priority, Priority::Medium);
        assert!(!report.priority_declared);
        assert_eq!(report.category, Category::Other);
        assert_eq!(report.title, UNTITLED);
        assert_eq!(report.description, NO_DESCRIPTION);
        assert_eq!(report.location, NO_LOCATION);
        assert_eq!(report.user_email, UNKNOWN_SUBMITTER);
        assert!(report.reported_at.is_none());
        assert!(report.updated_at.is_none());
        assert!(report.media.is_none());
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let report = normalize(RawReport {
            title: Some("  ".into()),
            location: Some(String::new()),
            ..RawReport::default()
        });
        assert_eq!(report.title, UNTITLED);
        assert_eq!(report.location, NO_LOCATION);
    }

    #[test]
    fn parses_enums_case_insensitively() {
        let report = normalize(RawReport {
            status: Some("In-Progress".into()),
            priority: Some("HIGH".into()),
            category: Some("public safety".into()),
            ..RawReport::default()
        });
        assert_eq!(report.status, Status::InProgress);
        assert_eq!(report.priority, Priority::High);
        assert!(report.priority_declared);
        assert_eq!(report.category, Category::PublicSafety);
    }

    #[test]
    fn unknown_enum_values_fall_back_to_defaults() {
        let report = normalize(RawReport {
            status: Some("archived".into()),
            priority: Some("urgent".into()),
            category: Some("Noise".into()),
            ..RawReport::default()
        });
        assert_eq!(report.status, Status::Pending);
        assert_eq!(report.priority, Priority::Medium);
        assert!(!report.priority_declared);
        assert_eq!(report.category, Category::Other);
    }

    #[test]
    fn passes_timestamps_and_media_through() {
        let report = normalize(RawReport {
            reported_at: Some(RawTimestamp::Text("2024-05-01T10:00:00Z".into())),
            updated_at: Some(RawTimestamp::Text("not a date".into())),
            media_url: Some("https://cdn.example/clip.mp4".into()),
            is_video: Some(true),
            ..RawReport::default()
        });
        assert!(report.reported_at.is_some());
        assert!(report.updated_at.is_none());
        let media = report.media.unwrap();
        assert!(media.is_video);
        assert_eq!(media.url, "https://cdn.example/clip.mp4");
    }
}
