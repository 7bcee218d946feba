use log::{debug, trace};
use serde::Serialize;
use std::fmt;

use crate::types::{IncidentReport, Status};
use crate::util::{average, format_hours, hours_between};

/// Mean time from report to resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ResolutionLatency {
    /// No resolved report had a usable pair of timestamps.
    Unavailable,
    Average { hours: f64, samples: usize },
}

impl ResolutionLatency {
    #[must_use]
    pub const fn samples(&self) -> usize {
        match self {
            Self::Unavailable => 0,
            Self::Average { samples, .. } => *samples,
        }
    }
}

impl fmt::Display for ResolutionLatency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "N/A"),
            Self::Average { hours, .. } => write!(f, "{}", format_hours(*hours)),
        }
    }
}

/// Hours from report to last update for a resolved report, when that span
/// is strictly positive.
pub fn resolution_hours(report: &IncidentReport) -> Option<f64> {
    if report.status != Status::Resolved {
        return None;
    }
    let hours = hours_between(report.reported_at?, report.updated_at?);
    if hours > 0.0 {
        Some(hours)
    } else {
        trace!("discarding non-positive resolution span for report '{}'", report.id);
        None
    }
}

pub fn average_resolution_time(records: &[IncidentReport]) -> ResolutionLatency {
    let spans: Vec<f64> = records.iter().filter_map(resolution_hours).collect();
    if spans.is_empty() {
        debug!("no resolved reports with usable timestamps");
        return ResolutionLatency::Unavailable;
    }
    let hours = average(&spans);
    debug!("average resolution {:.2}h over {} reports", hours, spans.len());
    ResolutionLatency::Average {
        hours,
        samples: spans.len(),
    }
}
