/// Control-flow exploration of contract frames
pub mod exec;
