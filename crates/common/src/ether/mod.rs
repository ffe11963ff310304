/// Reading bytecode from hex strings and files.
pub mod bytecode;

/// Collaborator interfaces for chain data and committed state.
pub mod provider;

/// An in-memory chain snapshot implementing the collaborator interfaces.
pub mod snapshot;

/// Block and transaction types.
pub mod types;
