use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ViscosityError>;

// Failures are terminal for the time step being processed, never for the batch
#[derive(Debug, Error)]
pub enum ViscosityError {
    #[error("coefficient block `{0}` not found")]
    ConfigBlockNotFound(String),

    #[error("missing coefficient: {0}")]
    MissingCoefficient(String),

    #[error("no `internalField nonuniform List<scalar>` section found")]
    FieldSectionNotFound,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("malformed field file skeleton: {0}")]
    SkeletonMalformed(String),

    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ViscosityError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ViscosityError::Io {
            path: path.into(),
            source,
        }
    }
}
