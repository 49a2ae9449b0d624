//! Data access for monthly case-surveillance extracts. Each month is a CSV
//! file; the model only needs two numbers out of it: how many rows there
//! are, and how many of them are laboratory-confirmed cases.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::SimulationError;

/// Status value marking a row as a positive case, matched exactly.
pub const LAB_CONFIRMED: &str = "Laboratory-confirmed case";

/// The one column of a surveillance row the counts depend on. Other columns
/// in the extract are ignored.
#[derive(Debug, Deserialize)]
struct CaseRow {
    current_status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCounts {
    pub total_test_cases: u64,
    pub positive_cases: u64,
}

/// Read one month's extract into counts. Any read or parse failure is fatal
/// to the run.
pub fn load_month_counts(month: &str, path: &Path) -> Result<MonthCounts, SimulationError> {
    let as_data_err = |source| SimulationError::SurveillanceData {
        month: month.to_string(),
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(as_data_err)?;
    let mut total_test_cases = 0;
    let mut positive_cases = 0;
    for row in reader.deserialize::<CaseRow>() {
        let row = row.map_err(as_data_err)?;
        total_test_cases += 1;
        if row.current_status == LAB_CONFIRMED {
            positive_cases += 1;
        }
    }
    Ok(MonthCounts {
        total_test_cases,
        positive_cases,
    })
}

/// Source of one month of surveillance counts. The orchestrator only sees
/// this seam, so tests can drive it with fixed counts.
pub trait MonthDataSource {
    fn month_counts(&self, month: &str) -> Result<MonthCounts, SimulationError>;
}

/// File-backed source: month label to extract path.
pub struct CsvMonthSource {
    files: HashMap<String, PathBuf>,
}

impl CsvMonthSource {
    pub fn new(files: HashMap<String, PathBuf>) -> Self {
        Self { files }
    }
}

impl MonthDataSource for CsvMonthSource {
    fn month_counts(&self, month: &str) -> Result<MonthCounts, SimulationError> {
        let path = self
            .files
            .get(month)
            .ok_or_else(|| SimulationError::MissingMonth(month.to_string()))?;
        load_month_counts(month, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_extract(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_counts_rows_and_confirmed_cases() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_extract(
            dir.path(),
            "Jan_cases.csv",
            "current_status,sex,age_group\n\
             Laboratory-confirmed case,Female,20 - 29 Years\n\
             Probable Case,Male,30 - 39 Years\n\
             Laboratory-confirmed case,Male,40 - 49 Years\n",
        );
        let counts = load_month_counts("Jan", &path).unwrap();
        assert_eq!(
            counts,
            MonthCounts {
                total_test_cases: 3,
                positive_cases: 2
            }
        );
    }

    #[test]
    fn test_status_match_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_extract(
            dir.path(),
            "Feb_cases.csv",
            "current_status\nlaboratory-confirmed case\nLaboratory-confirmed\n",
        );
        let counts = load_month_counts("Feb", &path).unwrap();
        assert_eq!(counts.total_test_cases, 2);
        assert_eq!(counts.positive_cases, 0);
    }

    #[test]
    fn test_header_only_extract_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_extract(dir.path(), "Mar_cases.csv", "current_status,sex,age_group\n");
        let counts = load_month_counts("Mar", &path).unwrap();
        assert_eq!(
            counts,
            MonthCounts {
                total_test_cases: 0,
                positive_cases: 0
            }
        );
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_month_counts("Apr", &dir.path().join("Apr_cases.csv"));
        assert!(matches!(
            result,
            Err(SimulationError::SurveillanceData { month, .. }) if month == "Apr"
        ));
    }

    #[test]
    fn test_csv_source_reports_unmapped_month() {
        let source = CsvMonthSource::new(HashMap::new());
        assert!(matches!(
            source.month_counts("May"),
            Err(SimulationError::MissingMonth(month)) if month == "May"
        ));
    }
}
