use crate::error::InsightsError;
use crate::heatmap::{HeatmapGrid, DAYS};
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), InsightsError> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Full 7x24 grid, one row per weekday: `Day,0,1,..,23`.
pub fn write_grid_csv(path: &Path, grid: &HeatmapGrid) -> Result<(), InsightsError> {
    let mut wtr = csv::Writer::from_path(path)?;
    let mut header = vec!["Day".to_string()];
    header.extend((0..24).map(|h| h.to_string()));
    wtr.write_record(&header)?;
    for (day, hours) in DAYS.iter().zip(grid.rows()) {
        let mut record = vec![(*day).to_string()];
        record.extend(hours.iter().map(u32::to_string));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), InsightsError> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn render_table<T>(rows: &[T], max_rows: usize) -> Option<String>
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return None;
    }
    Some(Table::new(slice).with(Style::markdown()).to_string())
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    match render_table(rows, max_rows) {
        Some(table) => println!("{}\n", table),
        None => println!("(no rows)\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heatmap::{heatmap, Weighting};
    use crate::test_support::{at, reported};
    use crate::types::TrendBucket;

    fn bucket(period: &str, total: usize) -> TrendBucket {
        TrendBucket {
            period: period.into(),
            total,
            resolved: 0,
            pending: total,
        }
    }

    #[test]
    fn writes_csv_with_renamed_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trend.csv");
        write_csv(&path, &[bucket("Mon", 2), bucket("Tue", 1)]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Period,Total,Resolved,Pending\nMon,2,0,2\nTue,1,0,1\n");
    }

    #[test]
    fn writes_full_grid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.csv");
        // 2024-05-13 is a Monday.
        let grid = heatmap(&[reported(at(2024, 5, 13, 23))], Weighting::Count);
        write_grid_csv(&path, &grid).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 8);
        assert!(lines[0].starts_with("Day,0,1,"));
        assert!(lines[2].starts_with("Mon,0,"));
        assert!(lines[2].ends_with(",1"));
    }

    #[test]
    fn render_table_limits_rows() {
        let rows = vec![bucket("Mon", 2), bucket("Tue", 1), bucket("Wed", 4)];
        let table = render_table(&rows, 2).unwrap();
        assert!(table.contains("Mon"));
        assert!(table.contains("Tue"));
        assert!(!table.contains("Wed"));
        assert!(render_table::<TrendBucket>(&[], 3).is_none());
    }
}
