//! Day-of-week by hour-of-day occurrence grid.
//!
//! Rows are `Sun..Sat`, columns are hours `0..24`, both derived from
//! `reported_at` in UTC.

use chrono::{Datelike, Timelike};
use log::debug;
use strum_macros::{Display, EnumString};

use crate::types::{HeatmapCellRow, IncidentReport};

pub const DAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
pub const HOURS: usize = 24;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Weighting {
    /// Every report adds 1.
    Count,
    /// Reports add their priority weight (critical 4 .. low 1).
    #[default]
    Priority,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeatmapGrid {
    cells: [[u32; HOURS]; 7],
}

impl HeatmapGrid {
    #[must_use]
    pub const fn value(&self, day: usize, hour: usize) -> u32 {
        self.cells[day][hour]
    }

    #[must_use]
    pub const fn rows(&self) -> &[[u32; HOURS]; 7] {
        &self.cells
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.cells.iter().flatten().sum()
    }

    /// Cell value scaled into `0.0..=1.0` against [`max_cell_value`].
    #[must_use]
    pub fn intensity(&self, day: usize, hour: usize) -> f64 {
        f64::from(self.value(day, hour)) / f64::from(max_cell_value(self))
    }

    /// Non-empty cells, hottest first; ties keep day/hour order.
    #[must_use]
    pub fn hottest_cells(&self) -> Vec<HeatmapCellRow> {
        let mut rows: Vec<HeatmapCellRow> = Vec::new();
        for (day, hours) in self.cells.iter().enumerate() {
            for (hour, &value) in hours.iter().enumerate() {
                if value == 0 {
                    continue;
                }
                rows.push(HeatmapCellRow {
                    day: DAYS[day].to_string(),
                    hour: hour as u32,
                    value,
                    intensity: format!("{:.2}", self.intensity(day, hour)),
                });
            }
        }
        rows.sort_by(|a, b| b.value.cmp(&a.value));
        rows
    }
}

/// Largest cell in the grid, or 1 when every cell is zero so callers can
/// divide by it unconditionally.
#[must_use]
pub fn max_cell_value(grid: &HeatmapGrid) -> u32 {
    grid.cells
        .iter()
        .flatten()
        .copied()
        .max()
        .filter(|&m| m > 0)
        .unwrap_or(1)
}

/// Contribution of one report. Reports whose export carried no usable
/// priority weigh 1, not the weight of the defaulted `medium`.
#[must_use]
pub const fn cell_weight(report: &IncidentReport, weighting: Weighting) -> u32 {
    match weighting {
        Weighting::Count => 1,
        Weighting::Priority if report.priority_declared => report.priority.weight(),
        Weighting::Priority => 1,
    }
}

pub fn heatmap(records: &[IncidentReport], weighting: Weighting) -> HeatmapGrid {
    let mut grid = HeatmapGrid::default();
    for r in records {
        let Some(ts) = r.reported_at else { continue };
        let day = ts.weekday().num_days_from_sunday() as usize;
        let hour = ts.hour() as usize;
        grid.cells[day][hour] += cell_weight(r, weighting);
    }
    debug!(
        "heatmap ({}) total weight {} peak cell {}",
        weighting,
        grid.total(),
        max_cell_value(&grid)
    );
    grid
}
