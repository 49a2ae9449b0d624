//! Derived rate arithmetic: probability of testing positive and percentage
//! growth between two case counts. Both round to two decimals and surface a
//! zero denominator as `DivisionByZero` for the caller to recover.

use crate::error::SimulationError;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Probability of a test-center visit producing a positive result.
pub fn probability(total_test_cases: u64, positive_cases: u64) -> Result<f64, SimulationError> {
    if total_test_cases == 0 {
        return Err(SimulationError::DivisionByZero {
            context: "probability of testing positive",
        });
    }
    Ok(round2(positive_cases as f64 / total_test_cases as f64))
}

/// Signed percentage growth from `base_count` to `new_count`.
pub fn growth_rate(base_count: u64, new_count: u64) -> Result<f64, SimulationError> {
    if base_count == 0 {
        return Err(SimulationError::DivisionByZero {
            context: "rate of growth",
        });
    }
    let base = base_count as f64;
    Ok(round2((new_count as f64 - base) / base * 100.0))
}
