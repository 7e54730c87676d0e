use approx::assert_relative_eq;
use grout_nu::case::discover_time_dirs;
use grout_nu::config::{RunConfig, parse_coefficients, transport_properties_path};
use grout_nu::io::field::{parse_scalar_field, split_header_and_boundary};
use grout_nu::processing::process_timesteps_parallel;
use grout_nu::viscosity::{self, RateGuard};
use grout_nu::ViscosityError;
use indicatif::ProgressBar;
use std::fs;
use std::path::Path;
use std::sync::Arc;

const TRANSPORT_PROPERTIES: &str = "FoamFile
{
    version     2.0;
    format      ascii;
    class       dictionary;
    object      transportProperties;
}

phases (grout air);

grout
{
    transportModel  timeVaryingGrout;
    timeVaryingGroutCoeffs
    {
        k               0.01136;
        n               0.8751;
        tau0            1.78571e-06;
        nuMax           0.1;
        timeCoeff       1.23;
    }
    rho             1800;
}
";

fn rate_field(values: &[&str]) -> String {
    let mut text = String::from(
        "FoamFile
{
    version     2.0;
    format      ascii;
    class       volScalarField;
    location    \"0\";
    object      timeVaryingGrout_Debug1;
}

dimensions      [0 0 -1 0 0 0 0];

internalField   nonuniform List<scalar>
",
    );
    text.push_str(&format!("{}\n(\n", values.len()));
    for value in values {
        text.push_str(value);
        text.push('\n');
    }
    text.push_str(
        ")
;

boundaryField
{
    walls
    {
        type            calculated;
        value           uniform 0;
    }
}
",
    );
    text
}

fn build_case(root: &Path) {
    fs::create_dir_all(root.join("constant")).unwrap();
    fs::create_dir_all(root.join("system")).unwrap();
    fs::write(transport_properties_path(root), TRANSPORT_PROPERTIES).unwrap();

    for (time, values) in [("0", vec!["1", "0.5"]), ("0.5", vec!["2", "1e-3", "4"])] {
        let dir = root.join(time);
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("timeVaryingGrout_Debug1"), rate_field(&values)).unwrap();
    }

    // Masked cell with zero rate
    let dir = root.join("1");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("timeVaryingGrout_Debug1"), rate_field(&["0", "1"])).unwrap();

    // Broken field file
    let dir = root.join("2");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("timeVaryingGrout_Debug1"), "FoamFile\n{\n}\n").unwrap();
}

#[test]
fn whole_case_is_processed_step_by_step() {
    let case = tempfile::tempdir().unwrap();
    build_case(case.path());

    let text = fs::read_to_string(transport_properties_path(case.path())).unwrap();
    let coeffs = parse_coefficients(&text, "timeVaryingGroutCoeffs")
        .unwrap()
        .require_viscosity_coeffs()
        .unwrap();

    let time_dirs = discover_time_dirs(case.path()).unwrap();
    let times: Vec<f64> = time_dirs.iter().map(|d| d.time).collect();
    assert_eq!(times, vec![0.0, 0.5, 1.0, 2.0]);

    let config = RunConfig::new(case.path().to_path_buf());
    let outcomes = process_timesteps_parallel(
        &coeffs,
        &time_dirs,
        &config,
        Arc::new(ProgressBar::hidden()),
    )
    .unwrap();

    assert!(matches!(outcomes[0].result, Ok(Some(_))));
    assert!(matches!(outcomes[1].result, Ok(Some(_))));
    assert!(matches!(outcomes[2].result, Err(ViscosityError::InvalidInput(_))));
    assert!(matches!(outcomes[3].result, Err(ViscosityError::FieldSectionNotFound)));

    for failed in ["1", "2"] {
        assert!(!case.path().join(failed).join("timeVaryingGrout_nuCalc").exists());
    }

    let written = fs::read_to_string(case.path().join("0.5").join("timeVaryingGrout_nuCalc")).unwrap();
    let field = parse_scalar_field(&written).unwrap();
    assert_eq!(field.len(), 3);
    assert!(field.values.iter().all(|&nu| nu <= 0.1));

    let expected = viscosity::pre_clamp(&coeffs, 2.0, 0.5).min(0.1);
    assert_relative_eq!(field.values[0], expected, max_relative = 1e-6);

    let source = fs::read_to_string(case.path().join("0.5").join("timeVaryingGrout_Debug1")).unwrap();
    assert_eq!(
        split_header_and_boundary(&written).unwrap().boundary_text(),
        split_header_and_boundary(&source).unwrap().boundary_text()
    );
}

#[test]
fn trusted_rates_clamp_masked_cells() {
    let case = tempfile::tempdir().unwrap();
    build_case(case.path());

    let text = fs::read_to_string(transport_properties_path(case.path())).unwrap();
    let coeffs = parse_coefficients(&text, "timeVaryingGroutCoeffs")
        .unwrap()
        .require_viscosity_coeffs()
        .unwrap();

    let mut config = RunConfig::new(case.path().to_path_buf());
    config.rate_guard = RateGuard::Trusted;
    config.jobs = 1;

    let time_dirs = discover_time_dirs(case.path()).unwrap();
    let outcomes = process_timesteps_parallel(
        &coeffs,
        &time_dirs,
        &config,
        Arc::new(ProgressBar::hidden()),
    )
    .unwrap();

    let summary = match &outcomes[2].result {
        Ok(Some(summary)) => summary,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert_eq!(summary.cells, 2);
    assert_eq!(summary.active_cells, 1);

    let written = fs::read_to_string(&summary.output_file).unwrap();
    assert_eq!(parse_scalar_field(&written).unwrap().values[0], 0.1);
}
