use crate::error::{Result, ViscosityError};
use crate::io::field::FieldFileSkeleton;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

// Viscosity dimensions in [kg m s K mol A cd] order
pub const VISCOSITY_DIMENSIONS: &str = "[0 2 -1 0 0 0 0]";

/// Render a field file from `skeleton` holding `values` as a non-uniform
/// scalar list declared under `object_name`.
pub fn write_field(
    skeleton: &FieldFileSkeleton,
    values: &[f64],
    object_name: &str,
) -> Result<String> {
    match skeleton.boundary.first() {
        Some(line) if line.contains("boundaryField") => {}
        _ => {
            return Err(ViscosityError::SkeletonMalformed(
                "skeleton has no boundaryField section".to_string(),
            ));
        }
    }

    let mut out = String::new();

    for line in &skeleton.header {
        match rename_object(line, object_name) {
            Some(renamed) => out.push_str(&renamed),
            None => out.push_str(line),
        }
    }

    // Writing to a String cannot fail
    let _ = writeln!(out, "dimensions      {};", VISCOSITY_DIMENSIONS);
    out.push('\n');
    out.push_str("internalField   nonuniform List<scalar>\n");
    let _ = writeln!(out, "{}", values.len());
    out.push_str("(\n");
    for &value in values {
        out.push_str(&format_scientific(value));
        out.push('\n');
    }
    out.push_str(");\n");
    out.push('\n');

    for line in &skeleton.boundary {
        out.push_str(line);
    }

    Ok(out)
}

// `object <name>;` with the original indentation and line ending
fn rename_object(line: &str, object_name: &str) -> Option<String> {
    let content = line.trim_start();
    let rest = content.strip_prefix("object")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let indent = &line[..line.len() - content.len()];
    let eol = if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    };

    Some(format!("{}object      {};{}", indent, object_name, eol))
}

/// `%.6e` formatting: six decimals and a signed exponent of at least two
/// digits, e.g. `1.234560e-05`.
pub fn format_scientific(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let formatted = format!("{:.6e}", value);
    let Some((mantissa, exponent)) = formatted.split_once('e') else {
        return formatted;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };

    format!("{}e{}{:02}", mantissa, sign, exponent.abs())
}

/// Write `contents` to `path` through a sibling temporary file so a failed
/// write never leaves a partial file at `path`.
pub fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let tmp_path = temporary_sibling(path);

    if let Err(e) = fs::write(&tmp_path, contents) {
        let _ = fs::remove_file(&tmp_path);
        return Err(ViscosityError::io(&tmp_path, e));
    }

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(ViscosityError::io(path, e));
    }

    Ok(())
}

fn temporary_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}
