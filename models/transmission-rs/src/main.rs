pub mod error;
pub mod output;
pub mod parameters;
pub mod rates;
pub mod sampling;
pub mod simulation;
pub mod surveillance;

use std::collections::HashMap;
use std::process::ExitCode;

use rand::SeedableRng;
use rand::rngs::StdRng;
use runenv::{Environment, RunManifest};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::output::ComparisonSeries;
use crate::parameters::Parameters;
use crate::surveillance::CsvMonthSource;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "run failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let env = Environment::from_stdin()?;

    // Parameters come from a TOML config file when the run maps one,
    // otherwise from the input block itself.
    let parameters: Parameters = match env.file("config") {
        Some(path) => runenv::load_toml_config(path)?,
        None => env.typed_input()?,
    };
    parameters.validate()?;

    // An unpinned run still gets a concrete seed so it can be replayed.
    let seed = env.seed.unwrap_or_else(rand::random);
    info!(seed, replicate = env.replicate, "starting transmission run");
    let mut rng = StdRng::seed_from_u64(seed);

    let mut manifest = RunManifest::new(seed, env.replicate);
    let mut files = HashMap::new();
    for month in &parameters.months[..parameters.months.len() - 1] {
        let path = env.require_file(month)?;
        manifest.record_input(month, path)?;
        files.insert(month.clone(), path.to_path_buf());
    }

    let source = CsvMonthSource::new(files);
    let table = simulation::run(&parameters, &source, &mut rng)?;
    let series = ComparisonSeries::from_table(&table);

    env.write_csv(
        "monthly_simulation.csv",
        &output::TABLE_HEADERS,
        &output::table_rows(&table),
    )?;
    env.write_csv(
        "growth_comparison.csv",
        &output::GROWTH_HEADERS,
        &output::growth_rows(&series),
    )?;
    env.write_csv(
        "new_cases_comparison.csv",
        &output::NEW_CASES_HEADERS,
        &output::new_case_rows(&series),
    )?;
    for name in [
        "monthly_simulation.csv",
        "growth_comparison.csv",
        "new_cases_comparison.csv",
    ] {
        manifest.record_output(name);
    }
    env.write_manifest(&manifest)?;

    Ok(())
}
