//! Heuristic urgency scoring for the pending queue.
//!
//! Scores are additive: critical +50, high +30, older than 24h +20, older
//! than 72h another +30, Public Safety or Infrastructure +25.

use chrono::{DateTime, Duration, Utc};
use log::debug;
use serde::Serialize;
use strum_macros::Display;

use crate::types::{Category, IncidentReport, Priority, PriorityQueueRow, Status};
use crate::util::{format_number, hours_between};

/// Length of the recommended-action queue.
pub const QUEUE_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum RecommendedAction {
    #[strum(to_string = "Immediate Attention")]
    ImmediateAttention,
    #[strum(to_string = "Review Today")]
    ReviewToday,
    Monitor,
}

impl RecommendedAction {
    #[must_use]
    pub const fn from_score(score: u32) -> Self {
        if score > 60 {
            Self::ImmediateAttention
        } else if score > 30 {
            Self::ReviewToday
        } else {
            Self::Monitor
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedReport {
    pub report: IncidentReport,
    pub score: u32,
    pub action: RecommendedAction,
}

impl RankedReport {
    pub fn to_row(&self, rank: usize, now: DateTime<Utc>) -> PriorityQueueRow {
        let age_hours = self
            .report
            .reported_at
            .map_or_else(|| "-".to_string(), |ts| format_number(hours_between(ts, now), 1));
        PriorityQueueRow {
            rank,
            id: self.report.id.clone(),
            title: self.report.title.clone(),
            priority: self.report.priority.to_string(),
            category: self.report.category.to_string(),
            age_hours,
            score: self.score,
            action: self.action.to_string(),
        }
    }
}

/// Urgency score of a single report at reference time `now`. A report
/// without `reported_at` has age zero.
pub fn priority_score(report: &IncidentReport, now: DateTime<Utc>) -> u32 {
    let mut score = match report.priority {
        Priority::Critical => 50,
        Priority::High => 30,
        Priority::Medium | Priority::Low => 0,
    };
    if let Some(ts) = report.reported_at {
        let age = now - ts;
        if age > Duration::hours(24) {
            score += 20;
        }
        if age > Duration::hours(72) {
            score += 30;
        }
    }
    if matches!(report.category, Category::PublicSafety | Category::Infrastructure) {
        score += 25;
    }
    score
}

/// Score every pending report, highest first, and keep the top
/// [`QUEUE_LEN`]. Equal scores keep their input order.
pub fn rank_pending(records: &[IncidentReport], now: DateTime<Utc>) -> Vec<RankedReport> {
    let mut ranked: Vec<RankedReport> = records
        .iter()
        .filter(|r| r.status == Status::Pending)
        .map(|r| {
            let score = priority_score(r, now);
            RankedReport {
                report: r.clone(),
                score,
                action: RecommendedAction::from_score(score),
            }
        })
        .collect();
    debug!("scored {} pending reports", ranked.len());
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked.truncate(QUEUE_LEN);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        blank, hours_ago, reference_now, reported, with_category, with_id, with_priority,
        with_status,
    };

    #[test]
    fn old_critical_infrastructure_report_needs_immediate_attention() {
        let report = with_category(
            with_priority(reported(hours_ago(100)), Priority::Critical),
            Category::Infrastructure,
        );
        let ranked = rank_pending(&[report], reference_now());
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].score, 125);
        assert_eq!(ranked[0].action, RecommendedAction::ImmediateAttention);
    }

    #[test]
    fn age_thresholds_are_strict_and_additive() {
        let now = reference_now();
        assert_eq!(priority_score(&reported(hours_ago(24)), now), 0);
        assert_eq!(priority_score(&reported(hours_ago(25)), now), 20);
        assert_eq!(priority_score(&reported(hours_ago(72)), now), 20);
        assert_eq!(priority_score(&reported(hours_ago(73)), now), 50);
    }

    #[test]
    fn missing_timestamp_still_scores_priority_and_category() {
        let report = with_category(with_priority(blank(), Priority::High), Category::PublicSafety);
        assert_eq!(priority_score(&report, reference_now()), 55);
    }

    #[test]
    fn action_thresholds() {
        assert_eq!(RecommendedAction::from_score(61), RecommendedAction::ImmediateAttention);
        assert_eq!(RecommendedAction::from_score(60), RecommendedAction::ReviewToday);
        assert_eq!(RecommendedAction::from_score(31), RecommendedAction::ReviewToday);
        assert_eq!(RecommendedAction::from_score(30), RecommendedAction::Monitor);
        assert_eq!(RecommendedAction::ImmediateAttention.to_string(), "Immediate Attention");
    }

    #[test]
    fn ranks_pending_only_sorted_and_truncated() {
        let now = reference_now();
        let mut records = vec![
            with_status(with_priority(blank(), Priority::Critical), Status::Resolved),
            with_id(blank(), "tie-a"),
        ];
        for (i, p) in [Priority::High, Priority::Critical, Priority::Low, Priority::High]
            .into_iter()
            .enumerate()
        {
            records.push(with_id(with_priority(blank(), p), &format!("p{i}")));
        }
        records.push(with_id(blank(), "tie-b"));

        let ranked = rank_pending(&records, now);
        let ids: Vec<&str> = ranked.iter().map(|r| r.report.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p0", "p3", "tie-a", "p2"]);
        assert_eq!(ranked[0].score, 50);
    }

    #[test]
    fn renders_queue_rows() {
        let now = reference_now();
        let ranked = rank_pending(&[with_id(reported(hours_ago(30)), "r-1")], now);
        let row = ranked[0].to_row(1, now);
        assert_eq!(row.id, "r-1");
        assert_eq!(row.age_hours, "30.0");
        assert_eq!(row.score, 20);
        assert_eq!(row.action, "Monitor");
    }
}
