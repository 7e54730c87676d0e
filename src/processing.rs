use crate::case::{TimeDirectory, find_rate_file};
use crate::config::{RunConfig, ViscosityCoeffs};
use crate::error::{Result, ViscosityError};
use crate::io::field::{ScalarField, parse_scalar_field, split_header_and_boundary};
use crate::io::foam_writer::{write_atomically, write_field};
use crate::io::results::StepSummary;
use crate::viscosity::{self, RateGuard};
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::fs;
use std::sync::Arc;
use tracing::{error, info, warn};

// Output of the core for one rate field
#[derive(Debug, Clone)]
pub struct FieldComputation {
    pub text: String,
    pub rates: ScalarField,
    pub nu: Vec<f64>,
}

/// Evaluate the viscosity law over the rate field in `rate_text` at time `t`
/// and render the result as a new field file named `object_name`. Nothing is
/// written to disk.
pub fn compute_field(
    coeffs: &ViscosityCoeffs,
    rate_text: &str,
    t: f64,
    object_name: &str,
    guard: RateGuard,
) -> Result<FieldComputation> {
    let rates = parse_scalar_field(rate_text)?;
    let skeleton = split_header_and_boundary(rate_text)?;
    let nu = viscosity::evaluate(coeffs, &rates.values, t, guard)?;
    let text = write_field(&skeleton, &nu, object_name)?;

    Ok(FieldComputation { text, rates, nu })
}

// Process a single time directory; Ok(None) when it holds no rate field
pub fn process_timestep(
    coeffs: &ViscosityCoeffs,
    time_dir: &TimeDirectory,
    config: &RunConfig,
) -> Result<Option<StepSummary>> {
    let Some(rate_file) = find_rate_file(&time_dir.path, &config.input_prefix)? else {
        info!(
            "t={}: no {}* file, skipping",
            time_dir.time, config.input_prefix
        );
        return Ok(None);
    };

    let rate_text =
        fs::read_to_string(&rate_file).map_err(|e| ViscosityError::io(&rate_file, e))?;
    let computation = compute_field(
        coeffs,
        &rate_text,
        time_dir.time,
        &config.output_name,
        config.rate_guard,
    )?;

    let output_file = time_dir.path.join(&config.output_name);
    write_atomically(&output_file, &computation.text)?;

    let summary = StepSummary::new(
        time_dir.time,
        &computation.rates.values,
        &computation.nu,
        output_file,
    );
    log_summary(&summary);

    Ok(Some(summary))
}

fn log_summary(summary: &StepSummary) {
    match (summary.rate_min, summary.rate_max, summary.nu_min, summary.nu_max) {
        (Some(rate_min), Some(rate_max), Some(nu_min), Some(nu_max)) => info!(
            "t={}: {} cells ({} active), rate {:.6e} - {:.6e}, nu {:.6e} - {:.6e} -> {:?}",
            summary.time,
            summary.cells,
            summary.active_cells,
            rate_min,
            rate_max,
            nu_min,
            nu_max,
            summary.output_file
        ),
        _ => info!(
            "t={}: {} cells (none active) -> {:?}",
            summary.time, summary.cells, summary.output_file
        ),
    }
}

// Result of one time directory; failures never abort the batch
#[derive(Debug)]
pub struct StepOutcome {
    pub time: f64,
    pub result: Result<Option<StepSummary>>,
}

/// Process every time directory on a pool of `config.jobs` threads. Outcomes
/// are returned in the order of `time_dirs`.
pub fn process_timesteps_parallel(
    coeffs: &ViscosityCoeffs,
    time_dirs: &[TimeDirectory],
    config: &RunConfig,
    pb: Arc<ProgressBar>,
) -> anyhow::Result<Vec<StepOutcome>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.jobs.max(1))
        .build()?;

    let outcomes = pool.install(|| {
        time_dirs
            .par_iter()
            .map(|time_dir| {
                let result = process_timestep(coeffs, time_dir, config);
                if let Err(e) = &result {
                    pb.suspend(|| error!("t={}: processing failed: {}", time_dir.time, e));
                }
                pb.inc(1);
                StepOutcome {
                    time: time_dir.time,
                    result,
                }
            })
            .collect::<Vec<_>>()
    });

    pb.finish_and_clear();

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    if failed > 0 {
        warn!("{} of {} time steps failed", failed, outcomes.len());
    }

    Ok(outcomes)
}
