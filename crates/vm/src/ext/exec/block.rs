use serde::{Deserialize, Serialize};

/// How the explorer reached a basic block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// The frame's entry point.
    Entry,
    /// The false branch of a JUMPI.
    Fallthrough,
    /// A JUMP or the true branch of a JUMPI.
    Jump,
    /// The exit of a resolved loop.
    LoopExit,
}

impl Direction {
    /// A short label, used as the edge label of rendered graphs.
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Entry => "entry",
            Direction::Fallthrough => "false",
            Direction::Jump => "true",
            Direction::LoopExit => "loop exit",
        }
    }
}

/// A basic block processed by the explorer.
///
/// A block entered a second time produces a second record with the same `start`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecord {
    /// The explorer node that produced this record. Unique within a frame.
    pub id: usize,

    /// The pc the block starts at.
    pub start: usize,

    /// The pc of the opcode that ended the block.
    pub stop: usize,

    /// The block's jump destination, when it ends in a jump to a valid destination.
    pub jump_dest: Option<usize>,

    /// The node this block was queued from.
    pub parent: Option<usize>,

    /// How the block was reached.
    pub direction: Direction,
}
