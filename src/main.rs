use anyhow::{Context, Result};
use grout_nu::case::discover_time_dirs;
use grout_nu::config::{
    RunConfig, ViscosityCoeffs, coeffs_block_name, parse_coefficients, transport_properties_path,
};
use grout_nu::io;
use grout_nu::processing::process_timesteps_parallel;
use grout_nu::viscosity;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

mod cli;

use cli::{Command, get_args};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "grout_nu=info".into()),
        )
        .init();

    let args = get_args();

    match args.command {
        Command::Calc {
            input_prefix,
            output_name,
            jobs,
            trust_rate,
            summary,
        } => {
            let config = cli::run_config(
                args.case,
                args.model,
                input_prefix,
                output_name,
                jobs,
                trust_rate,
                summary,
            );
            run_calc(&config)
        }
        Command::KEffective { max_time, output } => {
            run_k_effective(&args.case, &args.model, max_time, &output)
        }
        Command::Sweep {
            gamma_dot,
            t_start,
            t_end,
            dt,
            output,
        } => run_sweep(&args.case, &args.model, gamma_dot, t_start, t_end, dt, &output),
    }
}

fn load_coeffs(case_dir: &Path, model: &str) -> Result<ViscosityCoeffs> {
    let path = transport_properties_path(case_dir);
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read file: {:?}", path))?;

    let block = coeffs_block_name(model);
    let coeffs = parse_coefficients(&text, &block)
        .and_then(|set| set.require_viscosity_coeffs())
        .with_context(|| format!("Invalid coefficients in {:?}", path))?;

    info!("Coefficients from {}:", block);
    for (name, value) in coeffs.as_pairs() {
        info!("  {} = {}", name, value);
    }

    Ok(coeffs)
}

fn run_calc(config: &RunConfig) -> Result<()> {
    let coeffs = load_coeffs(&config.case_dir, &config.model)?;

    let time_dirs = discover_time_dirs(&config.case_dir)
        .with_context(|| format!("Failed to scan case directory {:?}", config.case_dir))?;
    info!(
        "Found {} time directories, processing on {} threads",
        time_dirs.len(),
        config.jobs
    );

    let pb = ProgressBar::new(time_dirs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} time steps ({eta})")?
            .progress_chars("#>-"),
    );

    let outcomes = process_timesteps_parallel(&coeffs, &time_dirs, config, Arc::new(pb))?;

    let summaries: Vec<_> = outcomes
        .into_iter()
        .filter_map(|outcome| outcome.result.ok().flatten())
        .collect();

    if let Some(path) = &config.summary_path {
        io::csv::write_step_summaries(path, &summaries)?;
        info!("Summary saved to {:?}", path);
    }

    info!(
        "Processing complete: {} of {} time steps written",
        summaries.len(),
        time_dirs.len()
    );
    Ok(())
}

fn run_k_effective(case_dir: &Path, model: &str, max_time: u32, output: &Path) -> Result<()> {
    let coeffs = load_coeffs(case_dir, model)?;
    let evolution = viscosity::k_effective_evolution(&coeffs, max_time);

    info!("Threshold times:");
    for (label, t) in [
        ("50% nuMax", evolution.t_50),
        ("90% nuMax", evolution.t_90),
        ("99% nuMax", evolution.t_99),
    ] {
        if t.is_finite() && t >= 0.0 {
            info!("  {}: {:.1} s", label, t);
        } else {
            warn!("  {}: not reached ({})", label, t);
        }
    }

    io::csv::write_k_effective(output, &evolution, coeffs.nu_max)?;
    info!("kEffective data saved to {:?}", output);
    Ok(())
}

fn run_sweep(
    case_dir: &Path,
    model: &str,
    gamma_dot: f64,
    t_start: f64,
    t_end: f64,
    dt: f64,
    output: &Path,
) -> Result<()> {
    let coeffs = load_coeffs(case_dir, model)?;
    let times = viscosity::time_samples(t_start, t_end, dt)?;
    let nu = viscosity::power_law_time_sweep(&coeffs, gamma_dot, &times);

    if let (Some(&t), Some(&last)) = (times.last(), nu.last()) {
        info!("At t={}s, nu={:.2e} m2/s (gamma_dot={})", t, last, gamma_dot);
    }

    io::csv::write_sweep(output, &times, &nu)?;
    info!("Sweep saved to {:?}", output);
    Ok(())
}
