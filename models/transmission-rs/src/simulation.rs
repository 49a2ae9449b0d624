//! The simulation orchestrator: a strictly forward pass chaining each
//! month's observed counts into the next month's simulated state, followed
//! by a second pass deriving the observed growth series.

use rand::Rng;
use tracing::{info, warn};

use crate::error::SimulationError;
use crate::parameters::Parameters;
use crate::rates;
use crate::sampling::{self, TransmissionSamples};
use crate::surveillance::MonthDataSource;

/// Results for one month. Each field is written at most once, by exactly one
/// pass; a `None` after the run means the value was undefined for that month
/// (no predecessor, or a zero denominator upstream).
#[derive(Debug, Clone, Default)]
pub struct MonthRecord {
    pub label: String,
    pub total_test_cases: Option<u64>,
    pub positive_cases: Option<u64>,
    pub probability_of_testing_positive: Option<f64>,
    pub simulated_new_positive_cases: Option<u64>,
    pub expected_rate_of_growth: Option<f64>,
    pub actual_rate_of_growth: Option<f64>,
}

/// Ordered per-month results table. Immutable once `run` returns it.
#[derive(Debug)]
pub struct SimulationTable {
    records: Vec<MonthRecord>,
}

impl SimulationTable {
    fn empty(months: &[String]) -> Self {
        let records = months
            .iter()
            .map(|label| MonthRecord {
                label: label.clone(),
                ..MonthRecord::default()
            })
            .collect();
        Self { records }
    }

    pub fn records(&self) -> &[MonthRecord] {
        &self.records
    }

    pub fn record(&self, label: &str) -> Option<&MonthRecord> {
        self.records.iter().find(|r| r.label == label)
    }
}

/// Run the full simulation over the configured month sequence.
///
/// Forward pass: for each consecutive pair, month i's counts produce a
/// probability, the sampler draws one pair per positive case, and the
/// aggregated result lands in month i+1 as its simulated count and expected
/// growth. An absent probability (zero test denominator) propagates as an
/// absent simulated count, never as zero. Second pass: observed growth for
/// every interior month from consecutive real positive counts.
pub fn run(
    parameters: &Parameters,
    source: &impl MonthDataSource,
    rng: &mut impl Rng,
) -> Result<SimulationTable, SimulationError> {
    let months = &parameters.months;
    let mut table = SimulationTable::empty(months);

    for i in 0..months.len() - 1 {
        let month = &months[i];
        let counts = source.month_counts(month)?;

        let probability = match rates::probability(counts.total_test_cases, counts.positive_cases)
        {
            Ok(p) => {
                info!(%month, probability = p, "probability of testing positive");
                Some(p)
            }
            Err(err) => {
                warn!(%month, error = %err, "leaving probability absent");
                None
            }
        };

        let samples = TransmissionSamples::draw(
            rng,
            parameters.max_spread_count,
            parameters.max_days_as_carrier,
            counts.positive_cases,
        );
        let simulated = probability.map(|p| sampling::simulate_transmitted(&samples, p));
        let expected_growth = simulated.and_then(|new_cases| {
            match rates::growth_rate(counts.positive_cases, new_cases) {
                Ok(growth) => Some(growth),
                Err(err) => {
                    warn!(%month, error = %err, "leaving expected growth absent");
                    None
                }
            }
        });

        let record = &mut table.records[i];
        record.total_test_cases = Some(counts.total_test_cases);
        record.positive_cases = Some(counts.positive_cases);
        record.probability_of_testing_positive = probability;

        let next = &mut table.records[i + 1];
        next.simulated_new_positive_cases = simulated;
        next.expected_rate_of_growth = expected_growth;
        if let Some(growth) = expected_growth {
            info!(month = %months[i + 1], expected_growth = growth, "expected rate of growth");
        }
    }

    for i in 1..months.len() - 1 {
        let (Some(base), Some(new_cases)) = (
            table.records[i - 1].positive_cases,
            table.records[i].positive_cases,
        ) else {
            continue;
        };
        table.records[i].actual_rate_of_growth = match rates::growth_rate(base, new_cases) {
            Ok(growth) => Some(growth),
            Err(err) => {
                warn!(month = %months[i], error = %err, "leaving actual growth absent");
                None
            }
        };
    }

    Ok(table)
}
