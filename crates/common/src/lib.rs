//! Common utilities, types, and collaborator interfaces used across the tandem codebase.
//!
//! This crate provides the chain data model consumed by the analysis engine (blocks,
//! transactions, and the committed-state accessor), along with general utility functions.

/// Error types for the common module
pub mod error;

/// Chain data types, collaborator traits, and an in-memory chain snapshot.
pub mod ether;

/// General utility functions and types for common tasks.
pub mod utils;

pub use error::Error;
