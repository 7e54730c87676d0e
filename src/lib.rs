pub mod case;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod io;
pub mod processing;
pub mod viscosity;

pub use error::{Result, ViscosityError};
