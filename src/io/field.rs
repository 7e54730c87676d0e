use crate::error::{Result, ViscosityError};
use tracing::warn;

// One scalar per mesh cell, in file order
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    pub declared_count: usize,
    pub values: Vec<f64>,
}

impl ScalarField {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn count_mismatch(&self) -> bool {
        self.declared_count != self.values.len()
    }
}

// Header and boundary lines of a field file, line terminators included
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFileSkeleton {
    pub header: Vec<String>,
    pub boundary: Vec<String>,
}

impl FieldFileSkeleton {
    pub fn boundary_text(&self) -> String {
        self.boundary.concat()
    }
}

/// Read the `internalField nonuniform List<scalar>` values of a field file.
///
/// The count and the opening parenthesis each start a new line.
///
/// Lines in the value block that do not parse as numbers are dropped. A
/// difference between the declared count and the parsed values is logged and
/// the parsed values are kept.
pub fn parse_scalar_field(text: &str) -> Result<ScalarField> {
    let (declared_count, block) =
        locate_value_block(text).ok_or(ViscosityError::FieldSectionNotFound)?;

    let values: Vec<f64> = block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| line.parse::<f64>().ok())
        .collect();

    if values.len() != declared_count {
        warn!(
            "Field declares {} values but {} were read",
            declared_count,
            values.len()
        );
    }

    Ok(ScalarField {
        declared_count,
        values,
    })
}

// (declared count, text between the parentheses)
fn locate_value_block(text: &str) -> Option<(usize, &str)> {
    for (start, keyword) in text.match_indices("internalField") {
        let rest = &text[start + keyword.len()..];
        let Some(rest) = expect_token(rest, "nonuniform") else {
            continue;
        };
        let Some(rest) = expect_token(rest, "List<scalar>") else {
            continue;
        };

        let Some(rest) = skip_line_break(rest) else {
            continue;
        };
        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        if digits == 0 {
            continue;
        }
        let Ok(count) = rest[..digits].parse::<usize>() else {
            continue;
        };

        let Some(body) = skip_line_break(&rest[digits..]).and_then(|r| r.strip_prefix('(')) else {
            continue;
        };

        // First `)` followed by `;`
        for (close, _) in body.match_indices(')') {
            if body[close + 1..].trim_start().starts_with(';') {
                return Some((count, &body[..close]));
            }
        }
    }

    None
}

// Leading whitespace, which must span a line break; the inline `3(1 2 3)`
// short-list form is not a per-cell value block
fn skip_line_break(text: &str) -> Option<&str> {
    let rest = text.trim_start();
    text[..text.len() - rest.len()].contains('\n').then_some(rest)
}

// Skip whitespace then `token`, which must be followed by whitespace
fn expect_token<'a>(text: &'a str, token: &str) -> Option<&'a str> {
    let trimmed = text.trim_start();
    if trimmed.len() == text.len() {
        return None;
    }
    let rest = trimmed.strip_prefix(token)?;
    rest.starts_with(char::is_whitespace).then_some(rest)
}

/// Index of the first line whose content starts with `dimensions`.
pub fn locate_dimensions_line_index(text: &str) -> Option<usize> {
    text.lines()
        .position(|line| line.trim().starts_with("dimensions"))
}

/// Split a field file into the lines before `dimensions` and the lines from
/// `boundaryField` to the end of the file.
pub fn split_header_and_boundary(text: &str) -> Result<FieldFileSkeleton> {
    let dim_idx = locate_dimensions_line_index(text).ok_or_else(|| {
        ViscosityError::SkeletonMalformed("no `dimensions` declaration".to_string())
    })?;

    let lines: Vec<&str> = text.split_inclusive('\n').collect();

    let boundary_idx = lines
        .iter()
        .enumerate()
        .skip(dim_idx + 1)
        .find(|(_, line)| line.contains("boundaryField"))
        .map(|(i, _)| i)
        .ok_or_else(|| {
            ViscosityError::SkeletonMalformed("no `boundaryField` section".to_string())
        })?;

    Ok(FieldFileSkeleton {
        header: lines[..dim_idx].iter().map(|l| l.to_string()).collect(),
        boundary: lines[boundary_idx..].iter().map(|l| l.to_string()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEBUG_FIELD: &str = "/*--------------------------------*- C++ -*----------------------------------*\\
  =========                 |
  \\\\      /  F ield         | OpenFOAM: The Open Source CFD Toolbox
\\*---------------------------------------------------------------------------*/
FoamFile
{
    version     2.0;
    format      ascii;
    class       volScalarField;
    location    \"2\";
    object      timeVaryingGrout_Debug1;
}
// * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * //

dimensions      [0 0 -1 0 0 0 0];

internalField   nonuniform List<scalar>
4
(
0.5
1.25e-3

2
0
)
;

boundaryField
{
    walls
    {
        type            calculated;
        value           uniform 0;
    }
    outlet
    {
        type            calculated;
        value           nonuniform List<scalar> 2(0.1 0.2);
    }
}


// ************************************************************************* //
";

    #[test]
    fn reads_values_in_order() {
        let field = parse_scalar_field(DEBUG_FIELD).unwrap();
        assert_eq!(field.declared_count, 4);
        assert_eq!(field.values, vec![0.5, 1.25e-3, 2.0, 0.0]);
        assert!(!field.count_mismatch());
    }

    #[test]
    fn stray_tokens_are_dropped_and_mismatch_is_kept() {
        let text = "internalField   nonuniform List<scalar>\n3\n(\n1\nbogus\n2\n)\n;\n";
        let field = parse_scalar_field(text).unwrap();

        assert_eq!(field.values, vec![1.0, 2.0]);
        assert_eq!(field.declared_count, 3);
        assert!(field.count_mismatch());
    }

    #[test]
    fn uniform_field_is_not_a_scalar_list() {
        let text = "dimensions [0 0 -1 0 0 0 0];\ninternalField   uniform 0;\nboundaryField\n{\n}\n";
        let err = parse_scalar_field(text).unwrap_err();
        assert!(matches!(err, ViscosityError::FieldSectionNotFound));
    }

    #[test]
    fn missing_internal_field_is_reported() {
        let err = parse_scalar_field("FoamFile\n{\n}\n").unwrap_err();
        assert!(matches!(err, ViscosityError::FieldSectionNotFound));
    }

    #[test]
    fn unterminated_value_block_is_reported() {
        let text = "internalField nonuniform List<scalar>\n2\n(\n1\n2\n";
        assert!(matches!(
            parse_scalar_field(text),
            Err(ViscosityError::FieldSectionNotFound)
        ));
    }

    #[test]
    fn inline_short_list_is_rejected() {
        let text = "internalField nonuniform List<scalar> 3(1 2 3);\nboundaryField\n{\n}\n";
        assert!(matches!(
            parse_scalar_field(text),
            Err(ViscosityError::FieldSectionNotFound)
        ));

        let split = "internalField nonuniform List<scalar>\n3(\n1\n2\n3\n)\n;\n";
        assert!(matches!(
            parse_scalar_field(split),
            Err(ViscosityError::FieldSectionNotFound)
        ));
    }

    #[test]
    fn empty_value_block() {
        let field = parse_scalar_field("internalField nonuniform List<scalar>\n0\n(\n)\n;\n").unwrap();
        assert!(field.is_empty());
        assert!(!field.count_mismatch());
    }

    #[test]
    fn dimensions_line_index() {
        assert_eq!(locate_dimensions_line_index(DEBUG_FIELD), Some(14));
        assert_eq!(locate_dimensions_line_index("a\nb\n"), None);
    }

    #[test]
    fn skeleton_keeps_header_and_boundary_verbatim() {
        let skeleton = split_header_and_boundary(DEBUG_FIELD).unwrap();

        assert_eq!(skeleton.header.len(), 14);
        assert!(skeleton.header[10].contains("timeVaryingGrout_Debug1"));

        let boundary_start = DEBUG_FIELD.find("boundaryField").unwrap();
        assert_eq!(skeleton.boundary_text(), &DEBUG_FIELD[boundary_start..]);
    }

    #[test]
    fn skeleton_requires_both_anchors() {
        let no_dims = "FoamFile\n{\n}\nboundaryField\n{\n}\n";
        assert!(matches!(
            split_header_and_boundary(no_dims),
            Err(ViscosityError::SkeletonMalformed(_))
        ));

        let no_boundary = "FoamFile\n{\n}\ndimensions [0 0 0 0 0 0 0];\n";
        assert!(matches!(
            split_header_and_boundary(no_boundary),
            Err(ViscosityError::SkeletonMalformed(_))
        ));
    }
}
