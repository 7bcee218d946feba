// Entry point and high-level CLI flow.
//
// - Option [1] loads and normalizes the report export, printing diagnostics.
// - Option [2] generates the trend, heatmap, triage and pattern tables plus
//   a JSON summary for the loaded reports.
// - After generating, the user can go back to the menu or exit.
// `--batch` runs [1] and [2] once without prompting.
mod bucketing;
mod cli;
mod error;
mod heatmap;
mod latency;
mod loader;
mod normalize;
mod output;
mod patterns;
mod ranking;
mod reports;
mod types;
mod util;

#[cfg(test)]
mod test_support;

use clap::Parser;
use cli::Cli;
use error::InsightsError;
use log::{error, info};
use once_cell::sync::Lazy;
use std::io::{self, BufRead, Write};
use std::sync::{Mutex, PoisonError};
use types::IncidentReport;

// Loaded reports stay in memory so insights can be regenerated several
// times in one run without re-reading the export.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<Vec<IncidentReport>>,
}

/// Read one trimmed line from `input`. `None` means the input is closed
/// (or unreadable) and no further answers will come.
fn read_line_from(input: &mut impl BufRead) -> Option<String> {
    let mut buf = String::new();
    match input.read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn read_choice() -> Option<String> {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    read_line_from(&mut io::stdin().lock())
}

/// Keep asking until the answer is `Y` or `N`; end of input counts as `N`.
fn ask_back_to_menu(input: &mut impl BufRead) -> bool {
    loop {
        print!("Back to Insight Selection (Y/N): ");
        let _ = io::stdout().flush();
        let Some(answer) = read_line_from(input) else {
            println!();
            return false;
        };
        match answer.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Returns `true` if the user chose `Y`, `false` if they chose `N` or
/// stdin closed.
fn prompt_back_to_menu() -> bool {
    ask_back_to_menu(&mut io::stdin().lock())
}

fn handle_load(cli: &Cli) -> Result<(), InsightsError> {
    let (data, load_report) = loader::load_reports(&cli.input)?;
    println!(
        "Processing export... ({} documents read, {} reports loaded)",
        util::format_int(load_report.total_rows),
        util::format_int(load_report.loaded)
    );
    if load_report.parse_errors > 0 {
        println!(
            "Note: {} documents skipped due to decode errors.",
            util::format_int(load_report.parse_errors)
        );
    }
    if load_report.missing_timestamps > 0 {
        println!(
            "Info: {} reports have no report time and are left out of time-based views.",
            util::format_int(load_report.missing_timestamps)
        );
    }
    println!();
    let mut state = APP_STATE.lock().unwrap_or_else(PoisonError::into_inner);
    state.data = Some(data);
    Ok(())
}

fn handle_generate(cli: &Cli) -> Result<(), InsightsError> {
    let data = {
        let state = APP_STATE.lock().unwrap_or_else(PoisonError::into_inner);
        state.data.clone()
    };
    let data = data.ok_or(InsightsError::NoData)?;
    let now = cli.reference_time()?;
    let scoped = reports::within_range(&reports::filter_reports(&data, &cli.filter()), cli.range, now);
    info!(
        "generating insights for {} of {} reports (range {}, reference time {})",
        scoped.len(),
        data.len(),
        cli.range,
        now.to_rfc3339()
    );
    std::fs::create_dir_all(&cli.out_dir)?;
    let rows = cli.preview_rows;

    println!("Generating insights...\n");

    let trend = bucketing::bucket(&scoped, cli.granularity);
    let trend_file = cli.out_dir.join("insights_trend.csv");
    output::write_csv(&trend_file, &trend)?;
    output::preview_table(
        "Report Trend",
        Some(format!("grouped by {}, first-seen order", cli.granularity).as_str()),
        &trend,
        rows,
    );
    println!("(Full table exported to {})\n", trend_file.display());

    let grid = heatmap::heatmap(&scoped, cli.weighting);
    let grid_file = cli.out_dir.join("insights_heatmap.csv");
    output::write_grid_csv(&grid_file, &grid)?;
    output::preview_table(
        "Incident Heatmap",
        Some(format!("hottest day/hour cells, {} weighted, UTC", cli.weighting).as_str()),
        &grid.hottest_cells(),
        rows,
    );
    println!("(Full grid exported to {})\n", grid_file.display());

    let queue: Vec<types::PriorityQueueRow> = ranking::rank_pending(&scoped, now)
        .iter()
        .enumerate()
        .map(|(idx, ranked)| ranked.to_row(idx + 1, now))
        .collect();
    let queue_file = cli.out_dir.join("insights_priority_queue.csv");
    output::write_csv(&queue_file, &queue)?;
    output::preview_table(
        "Priority Queue",
        Some("pending reports, top 5 by urgency score"),
        &queue,
        rows,
    );

    let found = patterns::detect_patterns(&scoped);
    let patterns_file = cli.out_dir.join("insights_patterns.csv");
    output::write_csv(&patterns_file, &found)?;
    output::preview_table("Detected Patterns", None, &found, rows);

    output::preview_table(
        "Recent Activity",
        Some("last 7 days, newest first"),
        &reports::recent_activity(&scoped, now, rows),
        rows,
    );

    let summary = reports::generate_summary(&scoped, now);
    let summary_file = cli.out_dir.join("insights_summary.json");
    output::write_json(&summary_file, &summary)?;
    output::preview_table("Status Breakdown", None, &summary.status_breakdown, rows);
    println!("Summary Stats ({}):", summary_file.display());
    println!(
        "{{\"total_reports\": {}, \"resolved\": {}, \"active_alerts\": {}, \"avg_response_time\": \"{}\", \"resolved_sampled\": {}}}",
        util::format_int(summary.total_reports),
        util::format_int(summary.resolved_reports),
        summary.active_alerts,
        summary.average_response_time,
        summary.resolution_latency.samples()
    );
    println!(
        "Last 30 days: {} reports ({} {}%), sentiment: {} urgent / {} negative / {} positive\n",
        summary.comparison.current_total,
        summary.comparison.total_trend,
        summary.comparison.total_change_pct.abs(),
        summary.sentiment.urgent,
        summary.sentiment.negative,
        summary.sentiment.positive
    );
    Ok(())
}

fn run_batch(cli: &Cli) -> Result<(), InsightsError> {
    handle_load(cli)?;
    handle_generate(cli)
}

fn main() {
    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    pretty_env_logger::formatted_builder()
        .parse_filters(&filters)
        .init();
    let cli = Cli::parse();

    if cli.batch {
        if let Err(e) = run_batch(&cli) {
            error!("{e}");
            std::process::exit(1);
        }
        return;
    }

    loop {
        println!("Incident Insights");
        println!("[1] Load reports ({})", cli.input.display());
        println!("[2] Generate insights\n");
        let Some(choice) = read_choice() else {
            println!("\nInput closed. Exiting the program.");
            break;
        };
        match choice.as_str() {
            "1" => {
                if let Err(e) = handle_load(&cli) {
                    eprintln!("Failed to load file: {}\n", e);
                }
            }
            "2" => {
                println!();
                if let Err(e) = handle_generate(&cli) {
                    eprintln!("Error: {}\n", e);
                    continue;
                }
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
}
