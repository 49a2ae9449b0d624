use std::path::PathBuf;

/// Errors produced by the transmission model.
///
/// `DivisionByZero` is the only recoverable kind: the orchestrator logs it
/// and leaves the derived field absent. Everything else aborts the run,
/// since each month's output feeds the next month's input.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("division by zero while computing {context}")]
    DivisionByZero { context: &'static str },

    #[error("no surveillance data mapped for month {0:?}")]
    MissingMonth(String),

    #[error("surveillance data for {month} unavailable at {path}: {source}")]
    SurveillanceData {
        month: String,
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}
