use chrono::{DateTime, Utc};
use clap::Parser;
use std::path::PathBuf;

use crate::bucketing::Granularity;
use crate::error::InsightsError;
use crate::heatmap::Weighting;
use crate::reports::{ReportFilter, TimeRange};
use crate::types::{Category, Status};
use crate::util::parse_timestamp_safe;

#[derive(Debug, Parser)]
#[command(
    name = "incident_insights",
    about = "Trend, heatmap, triage and sentiment insights over incident report exports"
)]
pub struct Cli {
    /// Report export to read (`.json` array or `.csv`)
    #[arg(long, env = "INCIDENT_INSIGHTS_INPUT", default_value = "reports.json")]
    pub input: PathBuf,

    /// Directory the generated CSV/JSON files are written to
    #[arg(long, env = "INCIDENT_INSIGHTS_OUT_DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Reference time for age-based views (RFC 3339). Defaults to the current time.
    #[arg(long)]
    pub now: Option<String>,

    /// Trend bucket size: day, week or month
    #[arg(long, default_value = "week")]
    pub granularity: Granularity,

    /// Heatmap weighting: count or priority
    #[arg(long, default_value = "priority")]
    pub weighting: Weighting,

    /// Only include reports from the last week, month or quarter
    #[arg(long, default_value = "all")]
    pub range: TimeRange,

    /// Only include reports with this status (e.g. `in-progress`)
    #[arg(long)]
    pub status: Option<Status>,

    /// Only include reports in this category (e.g. `"Public Safety"`)
    #[arg(long)]
    pub category: Option<Category>,

    /// Case-insensitive search over title, description, location and submitter
    #[arg(long)]
    pub search: Option<String>,

    /// Rows shown in each console preview table
    #[arg(long, default_value_t = 5)]
    pub preview_rows: usize,

    /// Load and generate once, then exit, instead of showing the menu
    #[arg(long)]
    pub batch: bool,
}

impl Cli {
    /// The explicit `--now`, or the system clock read once here.
    pub fn reference_time(&self) -> Result<DateTime<Utc>, InsightsError> {
        match self.now.as_deref() {
            None => Ok(Utc::now()),
            Some(value) => parse_timestamp_safe(Some(value)).ok_or_else(|| {
                InsightsError::InvalidReferenceTime {
                    value: value.to_string(),
                }
            }),
        }
    }

    pub fn filter(&self) -> ReportFilter {
        ReportFilter {
            status: self.status,
            category: self.category,
            search: self.search.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_defaults() {
        let cli = Cli::try_parse_from(["incident_insights"]).unwrap();
        assert_eq!(cli.granularity, Granularity::Week);
        assert_eq!(cli.weighting, Weighting::Priority);
        assert_eq!(cli.range, TimeRange::All);
        assert_eq!(cli.preview_rows, 5);
        assert!(!cli.batch);
    }

    #[test]
    fn parses_filters_and_reference_time() {
        let cli = Cli::try_parse_from([
            "incident_insights",
            "--granularity",
            "month",
            "--weighting",
            "count",
            "--status",
            "in-progress",
            "--category",
            "Public Safety",
            "--now",
            "2024-05-15T12:00:00Z",
            "--batch",
        ])
        .unwrap();
        assert_eq!(cli.granularity, Granularity::Month);
        assert_eq!(cli.weighting, Weighting::Count);
        let filter = cli.filter();
        assert_eq!(filter.status, Some(Status::InProgress));
        assert_eq!(filter.category, Some(Category::PublicSafety));
        assert_eq!(
            cli.reference_time().unwrap(),
            Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn rejects_bad_reference_time_and_values() {
        let cli = Cli::try_parse_from(["incident_insights", "--now", "soon"]).unwrap();
        assert!(matches!(
            cli.reference_time(),
            Err(InsightsError::InvalidReferenceTime { .. })
        ));
        assert!(Cli::try_parse_from(["incident_insights", "--granularity", "year"]).is_err());
    }
}
