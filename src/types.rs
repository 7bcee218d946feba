use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use tabled::Tabled;

use crate::latency::ResolutionLatency;

/// A report timestamp as it appears in an export.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    /// Epoch milliseconds.
    Millis(i64),
    /// Epoch milliseconds with a fractional part.
    FractionalMillis(f64),
    /// A serialized store timestamp, `{"seconds", "nanoseconds"}` or the
    /// underscore-prefixed admin SDK form.
    Seconds {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(default, alias = "_nanoseconds")]
        nanoseconds: u32,
    },
    Text(String),
}

/// One report document exactly as exported from the store. Any subset of
/// fields may be present, and a field holding a value of the wrong shape
/// decodes as absent instead of failing the whole document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawReport {
    #[serde(deserialize_with = "lenient_text")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub category: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub priority: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub location: Option<String>,
    #[serde(alias = "timestamp", deserialize_with = "lenient")]
    pub reported_at: Option<RawTimestamp>,
    #[serde(deserialize_with = "lenient")]
    pub updated_at: Option<RawTimestamp>,
    #[serde(deserialize_with = "lenient_text")]
    pub media_url: Option<String>,
    #[serde(deserialize_with = "lenient_flag")]
    pub is_video: Option<bool>,
    #[serde(deserialize_with = "lenient_text")]
    pub user_email: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Valid(T),
    Invalid(IgnoredAny),
}

/// A scalar field value. CSV cells arrive type-inferred, so a numeric
/// title or a `"true"` flag may show up as any of these.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    Other(IgnoredAny),
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<Lenient<T>>::deserialize(deserializer)? {
        Some(Lenient::Valid(value)) => Some(value),
        Some(Lenient::Invalid(IgnoredAny)) | None => None,
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        Some(Scalar::Text(s)) => Some(s),
        Some(Scalar::Int(n)) => Some(n.to_string()),
        Some(Scalar::Float(f)) => Some(f.to_string()),
        Some(Scalar::Bool(b)) => Some(b.to_string()),
        Some(Scalar::Other(IgnoredAny)) | None => None,
    })
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        Some(Scalar::Bool(b)) => Some(b),
        Some(Scalar::Int(n)) => Some(n != 0),
        Some(Scalar::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        Some(Scalar::Float(_) | Scalar::Other(IgnoredAny)) | None => None,
    })
}

/// Lifecycle state of a report.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Status {
    #[default]
    Pending,
    InProgress,
    Resolved,
    Rejected,
    Critical,
}

impl Status {
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Pending,
            Self::InProgress,
            Self::Resolved,
            Self::Rejected,
            Self::Critical,
        ]
    }
}

/// Priority level assigned by the submitter or an administrator.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    /// Heatmap contribution of one report at this priority.
    #[must_use]
    pub const fn weight(self) -> u32 {
        match self {
            Self::Critical => 4,
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }
}

/// Fixed report taxonomy.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Category {
    Infrastructure,
    #[serde(rename = "Public Safety")]
    #[strum(to_string = "Public Safety", serialize = "public-safety")]
    PublicSafety,
    Sanitation,
    Environmental,
    Transportation,
    #[default]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaAttachment {
    pub url: String,
    pub is_video: bool,
}

/// A report after normalization: every optional text/enum field carries a
/// value, timestamps stay optional.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncidentReport {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    /// `false` when the export had no recognisable priority and
    /// `priority` holds the default.
    pub priority_declared: bool,
    pub status: Status,
    pub location: String,
    pub reported_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub media: Option<MediaAttachment>,
    pub user_email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct TrendBucket {
    #[serde(rename = "Period")]
    #[tabled(rename = "Period")]
    pub period: String,
    #[serde(rename = "Total")]
    #[tabled(rename = "Total")]
    pub total: usize,
    #[serde(rename = "Resolved")]
    #[tabled(rename = "Resolved")]
    pub resolved: usize,
    #[serde(rename = "Pending")]
    #[tabled(rename = "Pending")]
    pub pending: usize,
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct HeatmapCellRow {
    #[serde(rename = "Day")]
    #[tabled(rename = "Day")]
    pub day: String,
    #[serde(rename = "Hour")]
    #[tabled(rename = "Hour")]
    pub hour: u32,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: u32,
    #[serde(rename = "Intensity")]
    #[tabled(rename = "Intensity")]
    pub intensity: String,
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct PriorityQueueRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Id")]
    #[tabled(rename = "Id")]
    pub id: String,
    #[serde(rename = "Title")]
    #[tabled(rename = "Title")]
    pub title: String,
    #[serde(rename = "Priority")]
    #[tabled(rename = "Priority")]
    pub priority: String,
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "AgeHours")]
    #[tabled(rename = "AgeHours")]
    pub age_hours: String,
    #[serde(rename = "Score")]
    #[tabled(rename = "Score")]
    pub score: u32,
    #[serde(rename = "Action")]
    #[tabled(rename = "Action")]
    pub action: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum PatternKind {
    #[serde(rename = "Geographic Hotspots")]
    #[strum(to_string = "Geographic Hotspots")]
    GeographicHotspot,
    #[serde(rename = "Peak Reporting Time")]
    #[strum(to_string = "Peak Reporting Time")]
    PeakReportingTime,
    #[serde(rename = "Trending Issue")]
    #[strum(to_string = "Trending Issue")]
    TrendingIssue,
}

/// A frequency-based observation over the report collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct Pattern {
    #[serde(rename = "Pattern")]
    #[tabled(rename = "Pattern")]
    pub kind: PatternKind,
    /// The location, hour or category the pattern is about.
    #[serde(rename = "Subject")]
    #[tabled(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
    #[serde(rename = "Severity")]
    #[tabled(rename = "Severity")]
    pub severity: Severity,
    #[serde(rename = "Description")]
    #[tabled(rename = "Description")]
    pub description: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SentimentSummary {
    pub positive: usize,
    pub negative: usize,
    pub urgent: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct StatusCount {
    #[tabled(rename = "Status")]
    pub status: Status,
    #[tabled(rename = "Count")]
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct LabelCount {
    #[tabled(rename = "Label")]
    pub label: String,
    #[tabled(rename = "Count")]
    pub count: usize,
}

#[derive(Debug, Clone, Tabled)]
pub struct RecentActivityRow {
    #[tabled(rename = "Reported")]
    pub reported: String,
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Status")]
    pub status: Status,
    #[tabled(rename = "Summary")]
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    #[must_use]
    pub const fn from_change(change: i64) -> Self {
        if change >= 0 {
            Self::Up
        } else {
            Self::Down
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodComparison {
    pub current_total: usize,
    pub previous_total: usize,
    pub total_change_pct: i64,
    pub total_trend: Trend,
    pub current_resolved: usize,
    pub previous_resolved: usize,
    pub resolved_change_pct: i64,
    pub resolved_trend: Trend,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub total_reports: usize,
    pub resolved_reports: usize,
    pub active_alerts: usize,
    pub average_response_time: String,
    pub resolution_latency: ResolutionLatency,
    pub comparison: PeriodComparison,
    pub status_breakdown: Vec<StatusCount>,
    pub by_category: Vec<LabelCount>,
    pub by_location: Vec<LabelCount>,
    pub sentiment: SentimentSummary,
}
