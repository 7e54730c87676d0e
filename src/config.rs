use crate::dictionary;
use crate::error::{Result, ViscosityError};
use crate::viscosity::RateGuard;
use std::collections::HashMap;
use std::path::PathBuf;

// Coefficients read from a named dictionary block
#[derive(Debug, Clone, Default)]
pub struct CoefficientSet {
    values: HashMap<String, f64>,
}

impl CoefficientSet {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Typed view over the five coefficients the viscosity laws need.
    pub fn require_viscosity_coeffs(&self) -> Result<ViscosityCoeffs> {
        ViscosityCoeffs::from_set(self)
    }
}

// Coefficients of the time-dependent grout laws
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViscosityCoeffs {
    pub k: f64,
    pub n: f64,
    pub tau0: f64,
    pub nu_max: f64,
    pub time_coeff: f64,
}

impl ViscosityCoeffs {
    pub const REQUIRED: [&'static str; 5] = ["k", "n", "tau0", "nuMax", "timeCoeff"];

    pub fn from_set(set: &CoefficientSet) -> Result<Self> {
        let mut found = [0.0; 5];
        for (slot, name) in found.iter_mut().zip(Self::REQUIRED) {
            let value = set
                .get(name)
                .ok_or_else(|| ViscosityError::MissingCoefficient(name.to_string()))?;
            if !value.is_finite() {
                return Err(ViscosityError::InvalidInput(format!(
                    "coefficient {} is not finite: {}",
                    name, value
                )));
            }
            *slot = value;
        }

        let [k, n, tau0, nu_max, time_coeff] = found;
        Ok(ViscosityCoeffs {
            k,
            n,
            tau0,
            nu_max,
            time_coeff,
        })
    }

    // Stable order handed to exporters
    pub fn as_pairs(&self) -> [(&'static str, f64); 5] {
        [
            ("k", self.k),
            ("n", self.n),
            ("tau0", self.tau0),
            ("nuMax", self.nu_max),
            ("timeCoeff", self.time_coeff),
        ]
    }
}

/// Parse the `key value;` entries of the first `block_name { ... }` block in
/// `text`. Nested sub-dictionaries and entries whose value is not a plain
/// numeric literal are skipped.
pub fn parse_coefficients(text: &str, block_name: &str) -> Result<CoefficientSet> {
    let tokens = dictionary::tokenize(text)?;
    let body = dictionary::find_block(&tokens, block_name)
        .ok_or_else(|| ViscosityError::ConfigBlockNotFound(block_name.to_string()))?;

    let mut values = HashMap::new();
    for (key, value) in dictionary::scalar_entries(body) {
        if let Ok(parsed) = value.parse::<f64>() {
            values.insert(key.to_string(), parsed);
        }
    }

    Ok(CoefficientSet { values })
}

// Settings resolved from the command line for a batch run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub case_dir: PathBuf,
    pub model: String,
    pub input_prefix: String,
    pub output_name: String,
    pub jobs: usize,
    pub rate_guard: RateGuard,
    pub summary_path: Option<PathBuf>,
}

impl RunConfig {
    pub fn new(case_dir: PathBuf) -> Self {
        RunConfig {
            case_dir,
            model: "timeVaryingGrout".to_string(),
            input_prefix: "timeVaryingGrout_Debug1".to_string(),
            output_name: "timeVaryingGrout_nuCalc".to_string(),
            jobs: num_cpus::get(),
            rate_guard: RateGuard::Reject,
            summary_path: None,
        }
    }

    pub fn block_name(&self) -> String {
        coeffs_block_name(&self.model)
    }

    pub fn transport_properties(&self) -> PathBuf {
        transport_properties_path(&self.case_dir)
    }
}

pub fn coeffs_block_name(model: &str) -> String {
    format!("{}Coeffs", model)
}

pub fn transport_properties_path(case_dir: &std::path::Path) -> PathBuf {
    case_dir.join("constant").join("transportProperties")
}
