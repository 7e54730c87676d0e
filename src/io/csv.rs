use crate::io::results::StepSummary;
use crate::viscosity::KEffectiveEvolution;
use anyhow::{Context, Result};
use csv::{Writer, WriterBuilder};
use serde::Serialize;
use std::fs::File;
use std::path::Path;

#[derive(Debug, Serialize)]
struct KEffectiveRow {
    time_s: f64,
    #[serde(rename = "kEffective_m2s")]
    k_effective: f64,
    #[serde(rename = "dkEff_dt_m2s2")]
    dk_eff_dt: f64,
    #[serde(rename = "normalized_kEff")]
    normalized_k_eff: f64,
}

#[derive(Debug, Serialize)]
struct SweepRow {
    time_s: f64,
    nu: f64,
}

// Create CSV writer, headers come from the serialized row type
pub fn create_csv_writer(path: &Path) -> Result<Writer<File>> {
    WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to create CSV file: {:?}", path))
}

// One row per processed timestep, in the order given
pub fn write_step_summaries(path: &Path, summaries: &[StepSummary]) -> Result<()> {
    let mut wtr = create_csv_writer(path)?;
    for summary in summaries {
        wtr.serialize(summary)?;
    }
    wtr.flush().context("Failed to flush summary CSV")?;
    Ok(())
}

pub fn write_k_effective(path: &Path, evolution: &KEffectiveEvolution, nu_max: f64) -> Result<()> {
    let mut wtr = create_csv_writer(path)?;
    for ((&time_s, &k_effective), &dk_eff_dt) in evolution
        .time
        .iter()
        .zip(&evolution.k_effective)
        .zip(&evolution.rate)
    {
        wtr.serialize(KEffectiveRow {
            time_s,
            k_effective,
            dk_eff_dt,
            normalized_k_eff: k_effective / nu_max,
        })?;
    }
    wtr.flush().context("Failed to flush kEffective CSV")?;
    Ok(())
}

pub fn write_sweep(path: &Path, times: &[f64], nu: &[f64]) -> Result<()> {
    let mut wtr = create_csv_writer(path)?;
    for (&time_s, &nu) in times.iter().zip(nu) {
        wtr.serialize(SweepRow { time_s, nu })?;
    }
    wtr.flush().context("Failed to flush sweep CSV")?;
    Ok(())
}
