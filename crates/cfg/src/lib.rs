//! The CFG module renders the basic blocks found by the exploration engine as a control-flow
//! graph, in DOT format.

mod error;

mod core;
mod interfaces;

// re-export the public interface
pub use core::{cfg, graph::build_cfg, CfgResult};
pub use error::Error;
pub use interfaces::{CfgArgs, CfgArgsBuilder};
