/// Bytecode analysis: jump destination bitmaps and instruction scans
pub mod bytecode;

/// Constants used throughout the VM implementation
pub mod constants;

/// Memory implementation for VM memory management
pub mod memory;

/// Opcode definitions, descriptors, and memory growth functions
pub mod opcodes;

/// Stack implementation for the VM
pub mod stack;

/// Core virtual machine implementation
pub mod vm;
