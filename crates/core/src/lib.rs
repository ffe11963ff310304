//! The Core module serves as the central integration point for all of tandem's functionality,
//! providing access to the block analysis and control-flow graph tools.
//!
//! This module re-exports the public interfaces of the tool-specific crates, making it easier to
//! use tandem's capabilities in other projects.

/// Error types for the core module
pub mod error;

// Re-export all tool-specific modules
pub use tandem_analyze;
pub use tandem_cfg;
pub use tandem_common;
pub use tandem_config;
pub use tandem_vm;
