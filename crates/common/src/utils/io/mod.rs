/// File reading and writing utilities.
pub mod file;
