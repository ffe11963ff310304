use std::{collections::BTreeSet, fmt};

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

/// Whether an access reads or writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessKind {
    /// Storage, balance or code is read.
    Read,
    /// Storage is written.
    Write,
}

/// The addresses a transaction reads and writes, and the transactions it conflicts with.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessSet {
    /// Addresses whose state is read.
    pub reads: BTreeSet<Address>,

    /// Addresses whose state is written.
    pub writes: BTreeSet<Address>,

    /// Indices of other transactions in the block that write an address this one reads.
    /// Ascending, without duplicates.
    pub conflicts: Vec<usize>,
}

impl AccessSet {
    /// Creates an empty access set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an access to `address`.
    pub fn add(&mut self, address: Address, kind: AccessKind) {
        match kind {
            AccessKind::Read => self.reads.insert(address),
            AccessKind::Write => self.writes.insert(address),
        };
    }

    /// Whether `address` was accessed as `kind`.
    pub fn has(&self, address: &Address, kind: AccessKind) -> bool {
        match kind {
            AccessKind::Read => self.reads.contains(address),
            AccessKind::Write => self.writes.contains(address),
        }
    }

    /// Records `index` as a conflict if this set reads anything in `writes`.
    ///
    /// ```
    /// use alloy::primitives::Address;
    /// use tandem_analyze::{AccessKind, AccessSet};
    ///
    /// let mut reader = AccessSet::new();
    /// reader.add(Address::repeat_byte(1), AccessKind::Read);
    ///
    /// let mut writer = AccessSet::new();
    /// writer.add(Address::repeat_byte(1), AccessKind::Write);
    ///
    /// reader.add_conflicts(3, &writer.writes);
    /// assert_eq!(reader.conflicts, vec![3]);
    /// ```
    pub fn add_conflicts(&mut self, index: usize, writes: &BTreeSet<Address>) {
        if self.reads.intersection(writes).next().is_none() {
            return;
        }
        if let Err(position) = self.conflicts.binary_search(&index) {
            self.conflicts.insert(position, index);
        }
    }
}

impl fmt::Display for AccessSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "read set:")?;
        if self.reads.is_empty() {
            writeln!(f, "-- empty --")?;
        }
        for address in &self.reads {
            writeln!(f, "{address}")?;
        }

        writeln!(f)?;
        writeln!(f, "write set:")?;
        if self.writes.is_empty() {
            writeln!(f, "-- empty --")?;
        }
        for address in &self.writes {
            writeln!(f, "{address}")?;
        }
        Ok(())
    }
}

/// A state access made by a frame, for reporting.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessPoint {
    /// The frame level the access was made at.
    pub depth: usize,

    /// The accessing opcode.
    pub opcode: String,

    /// The address of the frame making the access.
    pub initiator: Address,

    /// The accessed address.
    pub address: Address,
}

impl fmt::Display for AccessPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indent = "\t".repeat(self.depth);
        writeln!(f, "{indent}depth-{}. opcode: {}", self.depth, self.opcode)?;
        writeln!(f, "{indent}initiator: {}", self.initiator)?;
        write!(f, "{indent}access point: {}", self.address)
    }
}
