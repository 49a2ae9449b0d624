use std::collections::HashSet;

use serde::Deserialize;

use crate::error::SimulationError;

pub const DEFAULT_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Simulation inputs, deserialized from the run description's input block or
/// from a TOML config file named in the run file map.
#[derive(Debug, Clone, Deserialize)]
pub struct Parameters {
    /// Most people an undetected case contacts per day.
    pub max_spread_count: u32,
    /// Most days a case stays an active carrier before detection.
    pub max_days_as_carrier: u32,
    /// Ordered month labels driving the pass. The last label only ever
    /// receives simulated output; its own data is never loaded.
    #[serde(default = "default_months")]
    pub months: Vec<String>,
}

fn default_months() -> Vec<String> {
    DEFAULT_MONTHS.iter().map(|m| (*m).to_string()).collect()
}

impl Parameters {
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.max_spread_count == 0 {
            return Err(SimulationError::InvalidParameters(
                "max_spread_count must be a positive integer".to_string(),
            ));
        }
        if self.max_days_as_carrier == 0 {
            return Err(SimulationError::InvalidParameters(
                "max_days_as_carrier must be a positive integer".to_string(),
            ));
        }
        if self.months.len() < 2 {
            return Err(SimulationError::InvalidParameters(
                "at least two months are needed to chain a simulation step".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for month in &self.months {
            if !seen.insert(month.as_str()) {
                return Err(SimulationError::InvalidParameters(format!(
                    "month label {month:?} appears more than once"
                )));
            }
        }
        Ok(())
    }
}
