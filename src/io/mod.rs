pub mod csv;
pub mod field;
pub mod foam_writer;
pub mod results;
