use serde::Serialize;
use std::path::PathBuf;

// Cells at or below this rate are outside the grout phase
pub const ACTIVE_RATE_THRESHOLD: f64 = 1e-10;

// Per-timestep statistics over active cells, one CSV row each
#[derive(Debug, Clone, Serialize)]
pub struct StepSummary {
    pub time: f64,
    pub cells: usize,
    pub active_cells: usize,
    pub rate_min: Option<f64>,
    pub rate_max: Option<f64>,
    pub rate_mean: Option<f64>,
    pub nu_min: Option<f64>,
    pub nu_max: Option<f64>,
    pub nu_mean: Option<f64>,
    #[serde(skip)]
    pub output_file: PathBuf,
}

impl StepSummary {
    pub fn new(time: f64, rates: &[f64], nu: &[f64], output_file: PathBuf) -> Self {
        let active: Vec<(f64, f64)> = rates
            .iter()
            .zip(nu)
            .filter(|(rate, _)| **rate > ACTIVE_RATE_THRESHOLD)
            .map(|(&rate, &nu)| (rate, nu))
            .collect();

        let rate_stats = Stats::of(active.iter().map(|(rate, _)| *rate));
        let nu_stats = Stats::of(active.iter().map(|(_, nu)| *nu));

        StepSummary {
            time,
            cells: rates.len(),
            active_cells: active.len(),
            rate_min: rate_stats.map(|s| s.min),
            rate_max: rate_stats.map(|s| s.max),
            rate_mean: rate_stats.map(|s| s.mean),
            nu_min: nu_stats.map(|s| s.min),
            nu_max: nu_stats.map(|s| s.max),
            nu_mean: nu_stats.map(|s| s.mean),
            output_file,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Stats {
    min: f64,
    max: f64,
    mean: f64,
}

impl Stats {
    fn of(values: impl Iterator<Item = f64>) -> Option<Self> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for value in values {
            count += 1;
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }

        (count > 0).then(|| Stats {
            min,
            max,
            mean: sum / count as f64,
        })
    }
}
