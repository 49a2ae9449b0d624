//! Split a raw all-months case-surveillance export into per-month extracts.
//!
//! Rows with a known onset date are excluded; the rest land in the extract
//! for the calendar month of their CDC report date, keeping only the
//! columns the model reads.

use std::collections::BTreeMap;
use std::process::ExitCode;

use chrono::NaiveDate;
use runenv::Environment;
use serde::Deserialize;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const EXTRACT_HEADERS: [&str; 3] = ["current_status", "sex", "age_group"];

/// One row of the raw export. `onset_dt` is empty for the asymptomatic
/// records this pipeline keeps.
#[derive(Debug, Deserialize)]
struct RawRow {
    cdc_report_dt: String,
    #[serde(default)]
    onset_dt: String,
    current_status: String,
    #[serde(default)]
    sex: String,
    #[serde(default)]
    age_group: String,
}

fn month_label(report_date: &str) -> Option<String> {
    let parsed = NaiveDate::parse_from_str(report_date, "%Y/%m/%d")
        .or_else(|_| NaiveDate::parse_from_str(report_date, "%Y-%m-%d"))
        .ok()?;
    Some(parsed.format("%b").to_string())
}

/// Bucket rows by report month, dropping rows with a known onset date or an
/// unparseable report date.
fn partition(rows: impl IntoIterator<Item = RawRow>) -> BTreeMap<String, Vec<Vec<String>>> {
    let mut months: BTreeMap<String, Vec<Vec<String>>> = BTreeMap::new();
    for row in rows {
        if !row.onset_dt.is_empty() {
            continue;
        }
        let Some(label) = month_label(&row.cdc_report_dt) else {
            warn!(report_date = %row.cdc_report_dt, "skipping row with unparseable report date");
            continue;
        };
        months
            .entry(label)
            .or_default()
            .push(vec![row.current_status, row.sex, row.age_group]);
    }
    months
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let env = Environment::from_stdin()?;
    let raw_path = env.require_file("raw")?;

    let mut reader = csv::Reader::from_path(raw_path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize::<RawRow>() {
        rows.push(row?);
    }
    let total = rows.len();

    let months = partition(rows);
    let kept: usize = months.values().map(Vec::len).sum();
    info!(total, kept, "partitioned raw surveillance export");

    for (label, month_rows) in &months {
        env.write_csv(&format!("{label}_cases.csv"), &EXTRACT_HEADERS, month_rows)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "partition failed");
            ExitCode::FAILURE
        }
    }
}
