//! Tandem EVM interpreter
//!
//! This crate provides a speculative Ethereum Virtual Machine for the tandem analyzer: an
//! interpreter that executes one basic block at a time against a pluggable [`core::vm::Host`],
//! and an exploration engine that walks every reachable basic block of a contract frame.

/// Core VM implementation, including memory, stack, opcodes, and the interpreter
pub mod core;

/// Extensions to the core VM: control-flow exploration over whole contract frames
pub mod ext;
