//! The analyze module decides, block by block, whether the transactions of a block could have
//! executed concurrently without changing the outcome of sequential execution.
//!
//! Every transaction is explored speculatively over all of its control-flow paths, collecting a
//! conservative footprint of the addresses it reads and writes. The footprints are then checked
//! pairwise for read-after-write conflicts.

mod error;

mod core;
mod interfaces;

// re-export the public interface
pub use core::{
    access::{AccessKind, AccessPoint, AccessSet},
    analyze, analyze_each, analyze_with,
    block::{find_conflicts, AnalyzeResult, Analyzer, BlockResult},
    host::{FrameRecord, TransactionHost},
    registry::{CreateRegistry, RegistryError, ReturnRegistry},
    state::ShadowState,
    transaction::TransactionResult,
};
pub use error::Error;
pub use interfaces::{AnalyzeArgs, AnalyzeArgsBuilder};
