use crate::error::InsightsError;
use crate::normalize::normalize_all;
use crate::types::{IncidentReport, RawReport};
use csv::ReaderBuilder;
use log::{info, warn};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded: usize,
    pub parse_errors: usize,
    /// Loaded reports that have no usable `reportedAt`.
    pub missing_timestamps: usize,
}

/// Read a JSON array or CSV export of report documents and normalize it.
///
/// Malformed fields decode as absent and take the normalizer's defaults.
/// Only entries that are not report documents at all (a bare number in the
/// JSON array, say) are counted as parse errors and skipped.
pub fn load_reports(path: &Path) -> Result<(Vec<IncidentReport>, LoadReport), InsightsError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let (raws, total_rows, parse_errors) = match extension.as_str() {
        "json" => read_json(path)?,
        "csv" => read_csv(path)?,
        _ => return Err(InsightsError::UnsupportedFormat { extension }),
    };

    let reports = normalize_all(raws);
    let missing_timestamps = reports.iter().filter(|r| r.reported_at.is_none()).count();
    let report = LoadReport {
        total_rows,
        loaded: reports.len(),
        parse_errors,
        missing_timestamps,
    };
    info!(
        "loaded {} of {} reports from {}",
        report.loaded,
        report.total_rows,
        path.display()
    );
    if missing_timestamps > 0 {
        warn!("{missing_timestamps} reports have no usable reportedAt and are left out of time-based views");
    }
    Ok((reports, report))
}

fn read_json(path: &Path) -> Result<(Vec<RawReport>, usize, usize), InsightsError> {
    let docs: Vec<serde_json::Value> = serde_json::from_reader(BufReader::new(File::open(path)?))?;
    let total_rows = docs.len();
    let mut parse_errors = 0usize;
    let mut raws = Vec::with_capacity(total_rows);
    for (idx, doc) in docs.into_iter().enumerate() {
        match serde_json::from_value::<RawReport>(doc) {
            Ok(raw) => raws.push(raw),
            Err(e) => {
                warn!("skipping document {idx}: {e}");
                parse_errors += 1;
            }
        }
    }
    Ok((raws, total_rows, parse_errors))
}

fn read_csv(path: &Path) -> Result<(Vec<RawReport>, usize, usize), InsightsError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;
    let mut raws = Vec::new();
    for result in rdr.deserialize::<RawReport>() {
        total_rows += 1;
        match result {
            Ok(raw) => raws.push(raw),
            Err(e) => {
                warn!("skipping row {total_rows}: {e}");
                parse_errors += 1;
            }
        }
    }
    Ok((raws, total_rows, parse_errors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, Priority, Status};
    use std::io::Write;

    fn write_temp(suffix: &str, body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_json_with_mixed_timestamp_shapes() {
        let file = write_temp(
            ".json",
            r#"[
                {"id": "a", "title": "Pothole", "priority": "high", "status": "pending",
                 "category": "Infrastructure", "reportedAt": "2024-05-01T10:00:00Z"},
                {"id": "b", "timestamp": 1700000000000, "status": "resolved",
                 "updatedAt": "2023-11-15T01:00:00Z"},
                {"id": "c", "reportedAt": "garbage"},
                {"id": 42},
                {}
            ]"#,
        );
        let (reports, load) = load_reports(file.path()).unwrap();
        assert_eq!(load.total_rows, 5);
        assert_eq!(load.parse_errors, 0);
        assert_eq!(load.loaded, 5);
        assert_eq!(load.missing_timestamps, 3);

        assert_eq!(reports[0].priority, Priority::High);
        assert_eq!(reports[0].category, Category::Infrastructure);
        assert!(reports[1].reported_at.is_some());
        assert_eq!(reports[1].status, Status::Resolved);
        assert!(reports[2].reported_at.is_none());
        assert_eq!(reports[3].id, "42");
        assert_eq!(reports[3].title, "Untitled Report");
    }

    #[test]
    fn wrong_shaped_fields_fall_back_instead_of_dropping_documents() {
        let file = write_temp(
            ".json",
            r#"[
                {"id": "a", "isVideo": "yes", "mediaUrl": "https://cdn.example/a.mp4",
                 "priority": 3, "status": ["resolved"], "title": {"text": "x"}},
                {"id": "b", "reportedAt": {"seconds": 1714557600, "nanoseconds": 0}},
                {"id": "c", "reportedAt": 1714557600000.0},
                {"id": "d", "reportedAt": {"_seconds": 1714557600, "_nanoseconds": 500000000},
                 "updatedAt": true, "isVideo": "maybe"},
                {"id": "e", "reportedAt": "2024-05-01T10:00:00Z"},
                7
            ]"#,
        );
        let (reports, load) = load_reports(file.path()).unwrap();
        assert_eq!(load.total_rows, 6);
        assert_eq!(load.parse_errors, 1);
        assert_eq!(load.loaded, 5);
        assert_eq!(load.missing_timestamps, 1);

        let ids: Vec<&str> = reports.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c", "d", "e"]);

        let a = &reports[0];
        assert!(a.media.as_ref().is_some_and(|m| m.is_video));
        assert_eq!(a.title, "Untitled Report");
        assert_eq!(a.status, Status::Pending);
        assert!(!a.priority_declared);

        let expected = reports[4].reported_at.unwrap();
        assert_eq!(reports[1].reported_at, Some(expected));
        assert_eq!(reports[2].reported_at, Some(expected));
        assert_eq!(
            reports[3].reported_at,
            Some(expected + chrono::Duration::milliseconds(500))
        );
        assert!(reports[3].updated_at.is_none());
    }

    #[test]
    fn loads_csv_with_missing_columns() {
        let file = write_temp(
            ".csv",
            "id,title,status,priority,location,reportedAt,isVideo\n\
             r1,Flooded road,in-progress,critical,Main St,2024-05-02 08:30:00,false\n\
             r2,,,,,,\n\
             r3,311,pending,low,Elm Rd,1714557600000,sometimes\n",
        );
        let (reports, load) = load_reports(file.path()).unwrap();
        assert_eq!(load.loaded, 3);
        assert_eq!(load.parse_errors, 0);
        assert_eq!(reports[0].status, Status::InProgress);
        assert_eq!(reports[0].priority, Priority::Critical);
        assert_eq!(reports[0].location, "Main St");
        assert!(reports[0].reported_at.is_some());
        assert_eq!(reports[1].status, Status::Pending);
        assert!(reports[1].reported_at.is_none());
        assert_eq!(reports[2].title, "311");
        assert!(reports[2].reported_at.is_some());
    }

    #[test]
    fn rejects_unknown_extension() {
        let file = write_temp(".xml", "<reports/>");
        let err = load_reports(file.path()).unwrap_err();
        assert!(matches!(err, InsightsError::UnsupportedFormat { ref extension } if extension == "xml"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let file = write_temp(".json", "{not json");
        assert!(matches!(
            load_reports(file.path()),
            Err(InsightsError::Json(_))
        ));
    }
}
