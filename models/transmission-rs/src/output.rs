//! Reporting boundary: aligned per-month series out of the results table,
//! plus the CSV row sets the run environment writes. Growth series are
//! scaled to unit vectors so the expected and actual curves share an axis.

use nalgebra::DVector;

use crate::simulation::SimulationTable;

pub const TABLE_HEADERS: [&str; 7] = [
    "month",
    "total_test_cases",
    "positive_cases",
    "probability_of_testing_positive",
    "simulated_new_positive_cases",
    "expected_rate_of_growth",
    "actual_rate_of_growth",
];

pub const GROWTH_HEADERS: [&str; 3] = ["month", "expected_rate_of_growth", "actual_rate_of_growth"];

pub const NEW_CASES_HEADERS: [&str; 3] = ["month", "simulated_new_cases", "actual_positive_cases"];

/// The four series the reporting collaborator consumes, aligned on the month
/// axis. Absent points stay absent here; how they render is per-output.
pub struct ComparisonSeries {
    pub months: Vec<String>,
    pub expected_growth: Vec<Option<f64>>,
    pub actual_growth: Vec<Option<f64>>,
    pub simulated_new_cases: Vec<Option<u64>>,
    pub actual_positive_cases: Vec<Option<u64>>,
}

impl ComparisonSeries {
    pub fn from_table(table: &SimulationTable) -> Self {
        let records = table.records();
        Self {
            months: records.iter().map(|r| r.label.clone()).collect(),
            expected_growth: records.iter().map(|r| r.expected_rate_of_growth).collect(),
            actual_growth: records.iter().map(|r| r.actual_rate_of_growth).collect(),
            simulated_new_cases: records
                .iter()
                .map(|r| r.simulated_new_positive_cases)
                .collect(),
            actual_positive_cases: records.iter().map(|r| r.positive_cases).collect(),
        }
    }
}

/// L2 unit-vector scaling. Absent points count as zero, matching how the
/// growth curves were plotted against each other originally. An all-zero
/// series stays all-zero.
pub fn normalize(series: &[Option<f64>]) -> Vec<f64> {
    let dense = DVector::from_iterator(series.len(), series.iter().map(|v| v.unwrap_or(0.0)));
    match dense.try_normalize(0.0) {
        Some(unit) => unit.iter().copied().collect(),
        None => vec![0.0; series.len()],
    }
}

pub fn table_rows(table: &SimulationTable) -> Vec<Vec<String>> {
    table
        .records()
        .iter()
        .map(|r| {
            vec![
                r.label.clone(),
                fmt_count(r.total_test_cases),
                fmt_count(r.positive_cases),
                fmt_rate(r.probability_of_testing_positive),
                fmt_count(r.simulated_new_positive_cases),
                fmt_rate(r.expected_rate_of_growth),
                fmt_rate(r.actual_rate_of_growth),
            ]
        })
        .collect()
}

pub fn growth_rows(series: &ComparisonSeries) -> Vec<Vec<String>> {
    let expected = normalize(&series.expected_growth);
    let actual = normalize(&series.actual_growth);
    series
        .months
        .iter()
        .zip(expected.iter().zip(&actual))
        .map(|(month, (e, a))| vec![month.clone(), e.to_string(), a.to_string()])
        .collect()
}

pub fn new_case_rows(series: &ComparisonSeries) -> Vec<Vec<String>> {
    series
        .months
        .iter()
        .zip(
            series
                .simulated_new_cases
                .iter()
                .zip(&series.actual_positive_cases),
        )
        .map(|(month, (simulated, actual))| {
            vec![month.clone(), fmt_count(*simulated), fmt_count(*actual)]
        })
        .collect()
}

fn fmt_count(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn fmt_rate(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-5, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn test_normalize_unit_vector() {
        let series = [Some(1.0), Some(2.0), Some(3.0)];
        assert_close(&normalize(&series), &[0.26726, 0.53452, 0.80178]);
    }

    #[test]
    fn test_normalize_constant_series() {
        let series = [Some(1.0), Some(1.0), Some(1.0)];
        assert_close(&normalize(&series), &[0.57735, 0.57735, 0.57735]);
    }

    #[test]
    fn test_normalize_treats_absent_as_zero() {
        let series = [None, Some(3.0), Some(4.0)];
        assert_close(&normalize(&series), &[0.0, 0.6, 0.8]);
    }

    #[test]
    fn test_normalize_all_zero_series() {
        let series = [None, Some(0.0), None];
        assert_close(&normalize(&series), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_series_align_on_month_axis() {
        use rand::SeedableRng;

        use crate::error::SimulationError;
        use crate::parameters::Parameters;
        use crate::surveillance::{MonthCounts, MonthDataSource};

        struct Doubling;
        impl MonthDataSource for Doubling {
            fn month_counts(&self, month: &str) -> Result<MonthCounts, SimulationError> {
                Ok(MonthCounts {
                    total_test_cases: 100,
                    positive_cases: if month == "Jan" { 10 } else { 20 },
                })
            }
        }

        let parameters = Parameters {
            max_spread_count: 3,
            max_days_as_carrier: 7,
            months: vec!["Jan".to_string(), "Feb".to_string(), "Mar".to_string()],
        };
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let table = crate::simulation::run(&parameters, &Doubling, &mut rng).unwrap();
        let series = ComparisonSeries::from_table(&table);

        assert_eq!(series.months, vec!["Jan", "Feb", "Mar"]);
        assert_eq!(
            series.actual_positive_cases,
            vec![Some(10), Some(20), None]
        );
        assert_eq!(series.simulated_new_cases[0], None);
        assert!(series.simulated_new_cases[1].is_some());
        assert_eq!(series.expected_growth[0], None);
        assert_eq!(series.actual_growth, vec![None, Some(100.0), None]);
    }

    #[test]
    fn test_row_formatting() {
        assert_eq!(fmt_count(Some(12)), "12");
        assert_eq!(fmt_count(None), "");
        assert_eq!(fmt_rate(Some(-97.0)), "-97.00");
        assert_eq!(fmt_rate(Some(16.714)), "16.71");
        assert_eq!(fmt_rate(None), "");
    }
}
