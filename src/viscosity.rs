use crate::config::ViscosityCoeffs;
use crate::error::{Result, ViscosityError};

/// Lower bound applied to the shear rate by the power-law-time law only.
pub const SHEAR_RATE_FLOOR: f64 = 1e-6;

/// What the caller guarantees about the per-cell rate field.
///
/// The exponential-time law divides by the rate without flooring it. With
/// `Reject` every rate must be a finite positive number or evaluation fails.
/// `Trusted` passes values straight through; a zero rate then divides to
/// +inf and is clamped to `nuMax`, which is what the solver writes for cells
/// masked out of the grout phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateGuard {
    #[default]
    Reject,
    Trusted,
}

/// Unclamped exponential-time law: `(tau0 + k * exp(timeCoeff * t) * r^n) / r`.
#[inline]
pub fn pre_clamp(coeffs: &ViscosityCoeffs, rate: f64, t: f64) -> f64 {
    let numerator = coeffs.tau0 + coeffs.k * (coeffs.time_coeff * t).exp() * rate.powf(coeffs.n);
    numerator / rate
}

/// Per-cell viscosity for a strain-rate field at elapsed time `t` (seconds).
///
/// The clamp to `nuMax` is applied after the division. The result has the
/// same length and ordering as `rates`.
pub fn evaluate(
    coeffs: &ViscosityCoeffs,
    rates: &[f64],
    t: f64,
    guard: RateGuard,
) -> Result<Vec<f64>> {
    if guard == RateGuard::Reject {
        if let Some((cell, rate)) = rates
            .iter()
            .enumerate()
            .find(|(_, r)| !(r.is_finite() && **r > 0.0))
        {
            return Err(ViscosityError::InvalidInput(format!(
                "strain rate in cell {} must be positive, got {}",
                cell, rate
            )));
        }
    }

    Ok(rates
        .iter()
        .map(|&rate| clamp_to_max(pre_clamp(coeffs, rate, t), coeffs.nu_max))
        .collect())
}

// NaN propagates instead of being swallowed by f64::min
#[inline]
fn clamp_to_max(nu: f64, nu_max: f64) -> f64 {
    if nu.is_nan() { nu } else { nu.min(nu_max) }
}

/// Power-law-time law at a fixed shear rate:
/// `min(nuMax, (tau0 + k * t^timeCoeff * g^n) / g)` with `g` floored to
/// [`SHEAR_RATE_FLOOR`].
pub fn power_law_viscosity(coeffs: &ViscosityCoeffs, gamma_dot: f64, t: f64) -> f64 {
    let gamma = if gamma_dot > SHEAR_RATE_FLOOR {
        gamma_dot
    } else {
        SHEAR_RATE_FLOOR
    };

    let time_term = coeffs.k * t.powf(coeffs.time_coeff);
    let nu = (coeffs.tau0 + time_term * gamma.powf(coeffs.n)) / gamma;
    clamp_to_max(nu, coeffs.nu_max)
}

// Power-law-time law over a set of times
pub fn power_law_time_sweep(coeffs: &ViscosityCoeffs, gamma_dot: f64, times: &[f64]) -> Vec<f64> {
    times
        .iter()
        .map(|&t| power_law_viscosity(coeffs, gamma_dot, t))
        .collect()
}

// Power-law-time law over a set of shear rates
pub fn power_law_shear_sweep(coeffs: &ViscosityCoeffs, gamma_dots: &[f64], t: f64) -> Vec<f64> {
    gamma_dots
        .iter()
        .map(|&gamma_dot| power_law_viscosity(coeffs, gamma_dot, t))
        .collect()
}

/// Upper bound on the number of points [`time_samples`] produces.
pub const MAX_TIME_SAMPLES: usize = 10_000_000;

/// Sample times `start, start + dt, ...` up to and including `end`.
pub fn time_samples(start: f64, end: f64, dt: f64) -> Result<Vec<f64>> {
    if !(dt > 0.0) || !start.is_finite() || !end.is_finite() || end < start {
        return Err(ViscosityError::InvalidInput(format!(
            "cannot sample {}..={} with step {}",
            start, end, dt
        )));
    }

    // Tolerance keeps `end` when (end - start) / dt lands just below an integer
    let steps = ((end - start) / dt + 1e-9).floor();
    if steps >= MAX_TIME_SAMPLES as f64 {
        return Err(ViscosityError::InvalidInput(format!(
            "{}..={} with step {} needs more than {} samples",
            start, end, dt, MAX_TIME_SAMPLES
        )));
    }

    let steps = steps as usize;
    Ok((0..=steps).map(|i| start + i as f64 * dt).collect())
}

/// Consistency growth `min(nuMax, k * exp(timeCoeff * t))`.
pub fn k_effective(coeffs: &ViscosityCoeffs, t: f64) -> f64 {
    clamp_to_max(coeffs.k * (coeffs.time_coeff * t).exp(), coeffs.nu_max)
}

/// Time at which `k * exp(timeCoeff * t)` reaches `fraction * nuMax`.
pub fn k_effective_threshold_time(coeffs: &ViscosityCoeffs, fraction: f64) -> f64 {
    (fraction * coeffs.nu_max / coeffs.k).ln() / coeffs.time_coeff
}

#[derive(Debug, Clone)]
pub struct KEffectiveEvolution {
    pub time: Vec<f64>,
    pub k_effective: Vec<f64>,
    pub rate: Vec<f64>,
    pub t_50: f64,
    pub t_90: f64,
    pub t_99: f64,
}

// Sampled on whole seconds from 0 to max_time inclusive
pub fn k_effective_evolution(coeffs: &ViscosityCoeffs, max_time: u32) -> KEffectiveEvolution {
    let time: Vec<f64> = (0..=max_time).map(f64::from).collect();
    let k_eff: Vec<f64> = time.iter().map(|&t| k_effective(coeffs, t)).collect();
    let rate = gradient(&k_eff, &time);

    KEffectiveEvolution {
        t_50: k_effective_threshold_time(coeffs, 0.5),
        t_90: k_effective_threshold_time(coeffs, 0.9),
        t_99: k_effective_threshold_time(coeffs, 0.99),
        time,
        k_effective: k_eff,
        rate,
    }
}

/// Numerical derivative of `values` over the sample points `x`: one-sided
/// differences at the ends, second-order central differences inside.
pub fn gradient(values: &[f64], x: &[f64]) -> Vec<f64> {
    let len = values.len().min(x.len());
    if len < 2 {
        return vec![0.0; len];
    }

    let mut grad = Vec::with_capacity(len);
    grad.push((values[1] - values[0]) / (x[1] - x[0]));

    for i in 1..len - 1 {
        let hd = x[i] - x[i - 1];
        let hs = x[i + 1] - x[i];
        let a = -hs / (hd * (hd + hs));
        let b = (hs - hd) / (hd * hs);
        let c = hd / (hs * (hd + hs));
        grad.push(a * values[i - 1] + b * values[i] + c * values[i + 1]);
    }

    grad.push((values[len - 1] - values[len - 2]) / (x[len - 1] - x[len - 2]));
    grad
}
