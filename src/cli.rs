use clap::{Parser, Subcommand};
use grout_nu::config::RunConfig;
use grout_nu::viscosity::RateGuard;
use std::path::PathBuf;

/// Time-dependent grout viscosity fields for two-phase slurry cases
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Case directory holding constant/transportProperties and the time directories
    #[arg(short, long, default_value = ".", global = true)]
    pub case: PathBuf,

    /// Viscosity model; coefficients are read from the `<model>Coeffs` block
    #[arg(short, long, default_value = "timeVaryingGrout", global = true)]
    pub model: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute the viscosity field for every time directory
    Calc {
        /// Name prefix of the strain-rate field file in each time directory
        #[arg(long, default_value = "timeVaryingGrout_Debug1")]
        input_prefix: String,

        /// Object and file name of the written viscosity field
        #[arg(long, default_value = "timeVaryingGrout_nuCalc")]
        output_name: String,

        /// Worker threads (defaults to the number of CPUs)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Accept zero or negative strain rates instead of failing the time step
        #[arg(long)]
        trust_rate: bool,

        /// Write per-timestep statistics to this CSV file
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// Tabulate min(nuMax, k*exp(timeCoeff*t)) over whole seconds
    KEffective {
        /// Last time sampled (s)
        #[arg(long, default_value_t = 1000)]
        max_time: u32,

        #[arg(short, long, default_value = "kEffective_data.csv")]
        output: PathBuf,
    },

    /// Sweep the power-law-time law at a fixed shear rate
    Sweep {
        /// Shear rate (1/s); values at or below 1e-6 are floored
        #[arg(long, default_value_t = 1.0)]
        gamma_dot: f64,

        #[arg(long, default_value_t = 0.0)]
        t_start: f64,

        #[arg(long, default_value_t = 20.0)]
        t_end: f64,

        #[arg(long, default_value_t = 0.1)]
        dt: f64,

        #[arg(short, long, default_value = "viscosity_evolution.csv")]
        output: PathBuf,
    },
}

pub fn get_args() -> Args {
    Args::parse()
}

// Settings for the `calc` command
pub fn run_config(
    case: PathBuf,
    model: String,
    input_prefix: String,
    output_name: String,
    jobs: Option<usize>,
    trust_rate: bool,
    summary: Option<PathBuf>,
) -> RunConfig {
    let mut config = RunConfig::new(case);
    config.model = model;
    config.input_prefix = input_prefix;
    config.output_name = output_name;
    if let Some(jobs) = jobs {
        config.jobs = jobs;
    }
    if trust_rate {
        config.rate_guard = RateGuard::Trusted;
    }
    config.summary_path = summary;
    config
}
