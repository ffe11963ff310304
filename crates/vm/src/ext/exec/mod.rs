//! Speculative control-flow exploration of a single call frame.
//!
//! Branch conditions are never resolved against real state, so every JUMPI queues both of its
//! successors. Each basic-block entry point is executed at most once per frame, except when a
//! later visit could still touch state or reach new code.

mod block;
mod config;
mod graph;
mod loops;

use std::sync::Arc;

use alloy::primitives::U256;
use hashbrown::HashSet;
use tracing::{debug, trace};

use crate::core::{
    bytecode::{frame_before_jump, scan_revisit, JumpDestinations, Revisit},
    opcodes,
    vm::{AbortReason, BranchPolicy, CallContext, Contract, Exit, Failure, Host, Interpreter},
};

use loops::resolve_loop;

pub use block::{BlockRecord, Direction};
pub use config::ExplorationConfig;
pub use graph::{build_graph, GraphHost};

/// Index of a [`Node`] in the explorer's arena.
type NodeId = usize;

/// A basic-block entry point waiting to be explored, with the context it is entered with.
#[derive(Debug)]
struct Node {
    start: usize,
    ctx: Option<CallContext>,
    parent: Option<NodeId>,
    direction: Direction,

    /// Queued from a revisit; dropped if its entry point was explored in the meantime.
    only_if_unseen: bool,

    /// The JUMPI this node was jumped to from, when its condition was zero.
    untaken_at: Option<usize>,
}

/// What a block run means for the rest of the exploration.
enum Outcome {
    /// The branch ends here.
    Done,
    /// The block ended in JUMP or JUMPI at `pc`.
    Jumped { pc: usize, destination: U256, condition: Option<U256> },
}

/// The [`Explorer`] walks every reachable basic block of a contract frame, driving an
/// [`Interpreter`] against a [`Host`].
///
/// ```
/// use alloy::primitives::Bytes;
/// use tandem_vm::ext::exec::{build_graph, ExplorationConfig};
///
/// // PUSH1 0x01, PUSH1 0x06, JUMPI, STOP, JUMPDEST, STOP
/// let code = Bytes::from_static(&[0x60, 0x01, 0x60, 0x06, 0x57, 0x00, 0x5b, 0x00]);
/// let records = build_graph(&code, &ExplorationConfig::default()).unwrap();
/// assert_eq!(records.len(), 3);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Explorer {
    /// Limits and switches.
    pub config: ExplorationConfig,
}

impl Explorer {
    /// Creates an explorer with the given configuration.
    pub fn new(config: ExplorationConfig) -> Self {
        Self { config }
    }

    fn interpreter(&self, policy: BranchPolicy) -> Interpreter {
        Interpreter::new(policy).with_max_memory_size(self.config.max_memory_size)
    }

    /// Explores the frame running `contract` at call depth `level` (0 for the top-level frame).
    ///
    /// Returns the processed blocks when [`ExplorationConfig::record_blocks`] is set, and an
    /// empty list otherwise.
    pub fn explore<H: Host>(
        &self,
        host: &mut H,
        contract: Arc<Contract>,
        level: usize,
    ) -> Result<Vec<BlockRecord>, AbortReason> {
        let code = contract.code.clone();
        if code.is_empty() {
            return Ok(Vec::new());
        }
        if level > self.config.max_call_depth {
            return Err(AbortReason::DepthExceeded { level });
        }

        debug!(level, address = %contract.address, size = code.len(), "exploring frame");

        let destinations = JumpDestinations::analyze(&code);
        let plain = self.interpreter(BranchPolicy::Speculative);
        let resolving = self.interpreter(BranchPolicy::Resolve);

        let mut nodes = vec![Node {
            start: 0,
            ctx: Some(CallContext::new(contract)),
            parent: None,
            direction: Direction::Entry,
            only_if_unseen: false,
            untaken_at: None,
        }];
        let mut worklist: Vec<NodeId> = vec![0];
        let mut visited: HashSet<usize> = HashSet::new();
        let mut records = Vec::new();

        while let Some(id) = worklist.pop() {
            let start = nodes[id].start;
            let seen = visited.contains(&start);
            if seen && nodes[id].only_if_unseen {
                continue;
            }
            let Some(mut ctx) = nodes[id].ctx.take() else {
                continue;
            };

            if seen {
                trace!(level, start, "revisiting block");
                match scan_revisit(&code, start) {
                    Revisit::Skip { selfdestruct } => {
                        if selfdestruct {
                            host.selfdestruct_reachable();
                        }
                        self.record(&mut records, &nodes, id, start, None);
                        continue;
                    }
                    Revisit::Rerun => {}
                }
            } else {
                trace!(level, start, "exploring block");
                visited.insert(start);
            }

            let mut pc = start;
            let exit = plain
                .run(&mut ctx, &mut pc, host)
                .map_err(|e| AbortReason::Interpreter(e.to_string()))?;
            let (pc, destination, condition) = match self.outcome(exit, pc)? {
                Outcome::Done => {
                    self.record(&mut records, &nodes, id, pc, None);
                    continue;
                }
                Outcome::Jumped { pc, destination, condition } => (pc, destination, condition),
            };

            let jump_dest = destinations.is_valid_word(destination).then(|| destination.to::<usize>());
            self.record(&mut records, &nodes, id, pc, jump_dest);

            let is_jumpi = code[pc] == opcodes::JUMPI;
            let zero_condition = condition.is_some_and(|c| c.is_zero());

            // back-edge onto the block's own entry
            if !seen && jump_dest == Some(start) {
                if frame_before_jump(&code, start) {
                    return Err(AbortReason::LoopContainsCall { start });
                }
                if nodes[id].untaken_at == Some(pc) {
                    // the same JUMPI already left the loop through its fallthrough
                    trace!(level, start, pc, "loop already exited");
                } else if is_jumpi && pc.saturating_sub(4) > start {
                    // the first pass already ran one iteration; a zero condition leaves the loop
                    let exit = if zero_condition {
                        pc + 1
                    } else {
                        debug!(level, start, pc, "resolving loop");
                        resolve_loop(
                            &resolving,
                            &mut ctx,
                            start,
                            self.config.loop_iteration_cap,
                            host,
                        )?
                    };
                    worklist.push(nodes.len());
                    nodes.push(Node {
                        start: exit,
                        ctx: Some(ctx),
                        parent: Some(id),
                        direction: Direction::LoopExit,
                        only_if_unseen: false,
                        untaken_at: None,
                    });
                }
                continue;
            }

            let fallthrough = (is_jumpi && pc + 1 < code.len()).then(|| ctx.clone());

            if let Some(target) = jump_dest {
                if !(seen && visited.contains(&target)) {
                    worklist.push(nodes.len());
                    nodes.push(Node {
                        start: target,
                        ctx: Some(ctx),
                        parent: Some(id),
                        direction: Direction::Jump,
                        only_if_unseen: seen,
                        untaken_at: zero_condition.then_some(pc),
                    });
                }
            }
            if let Some(fork) = fallthrough {
                if !(seen && visited.contains(&(pc + 1))) {
                    worklist.push(nodes.len());
                    nodes.push(Node {
                        start: pc + 1,
                        ctx: Some(fork),
                        parent: Some(id),
                        direction: Direction::Fallthrough,
                        only_if_unseen: seen,
                        untaken_at: None,
                    });
                }
            }
        }

        debug!(level, blocks = visited.len(), "frame explored");
        Ok(records)
    }

    /// Classifies how a block run ended.
    fn outcome(&self, exit: Exit, pc: usize) -> Result<Outcome, AbortReason> {
        match exit {
            Exit::Halt | Exit::Revert | Exit::EndOfCode => Ok(Outcome::Done),
            Exit::Jump { destination, condition } => {
                Ok(Outcome::Jumped { pc, destination, condition })
            }
            Exit::Failure(Failure::InvalidOpcode) if !self.config.strict_invalid => {
                trace!(pc, "invalid opcode ends branch");
                Ok(Outcome::Done)
            }
            Exit::Failure(failure) => Err(AbortReason::Failure { failure, pc }),
            Exit::Abort(reason) => Err(reason),
        }
    }

    fn record(
        &self,
        records: &mut Vec<BlockRecord>,
        nodes: &[Node],
        id: NodeId,
        stop: usize,
        jump_dest: Option<usize>,
    ) {
        if !self.config.record_blocks {
            return;
        }
        let node = &nodes[id];
        records.push(BlockRecord {
            id,
            start: node.start,
            stop,
            jump_dest,
            parent: node.parent,
            direction: node.direction,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vm::test_utils::TestHost;
    use alloy::primitives::{Address, Bytes};

    fn contract(code: &[u8]) -> Arc<Contract> {
        Arc::new(Contract::new(
            Address::ZERO,
            Address::repeat_byte(0x01),
            Bytes::copy_from_slice(code),
            Bytes::new(),
            U256::ZERO,
        ))
    }

    fn explore(code: &[u8], config: ExplorationConfig) -> Result<Vec<BlockRecord>, AbortReason> {
        Explorer::new(config.recording()).explore(&mut TestHost::default(), contract(code), 0)
    }

    fn starts(records: &[BlockRecord]) -> Vec<usize> {
        let mut starts = records.iter().map(|record| record.start).collect::<Vec<_>>();
        starts.sort_unstable();
        starts
    }

    #[test]
    fn test_empty_code_is_trivial() {
        let records = Explorer::default()
            .explore(&mut TestHost::default(), contract(&[]), 100)
            .expect("empty code explores");
        assert!(records.is_empty());
    }

    #[test]
    fn test_depth_is_capped() {
        let result = Explorer::default().explore(&mut TestHost::default(), contract(&[0x00]), 5);
        assert_eq!(result, Err(AbortReason::DepthExceeded { level: 5 }));

        let result = Explorer::default().explore(&mut TestHost::default(), contract(&[0x00]), 4);
        assert!(result.is_ok());
    }

    #[test]
    fn test_both_branches_are_explored() {
        // PUSH0, PUSH1 0x06, JUMPI, STOP, STOP, JUMPDEST, STOP
        let code = [0x5f, 0x60, 0x06, 0x57, 0x00, 0x00, 0x5b, 0x00];
        let records = explore(&code, ExplorationConfig::default()).expect("explores");
        assert_eq!(starts(&records), vec![0, 4, 6]);

        let entry = records.iter().find(|record| record.start == 0).expect("entry");
        assert_eq!(entry.stop, 3);
        assert_eq!(entry.jump_dest, Some(6));
        assert_eq!(entry.direction, Direction::Entry);

        let taken = records.iter().find(|record| record.start == 6).expect("jump");
        assert_eq!(taken.direction, Direction::Jump);
        assert_eq!(taken.parent, Some(entry.id));
    }

    #[test]
    fn test_invalid_destination_is_not_followed() {
        // PUSH1 0x01, PUSH1 0x05, JUMPI, STOP, STOP
        let code = [0x60, 0x01, 0x60, 0x05, 0x57, 0x00, 0x00];
        let records = explore(&code, ExplorationConfig::default()).expect("explores");
        assert_eq!(starts(&records), vec![0, 5]);
        assert_eq!(records[0].jump_dest, None);
    }

    #[test]
    fn test_invalid_opcode_ends_branch_unless_strict() {
        // PUSH1 0x01, PUSH1 0x06, JUMPI, INVALID, JUMPDEST, STOP
        let code = [0x60, 0x01, 0x60, 0x06, 0x57, 0xfe, 0x5b, 0x00];
        assert!(explore(&code, ExplorationConfig::default()).is_ok());

        let strict = ExplorationConfig { strict_invalid: true, ..Default::default() };
        assert_eq!(
            explore(&code, strict),
            Err(AbortReason::Failure { failure: Failure::InvalidOpcode, pc: 5 })
        );
    }

    #[test]
    fn test_stack_failure_aborts() {
        assert_eq!(
            explore(&[0x01], ExplorationConfig::default()),
            Err(AbortReason::Failure { failure: Failure::StackUnderflow, pc: 0 })
        );
    }

    #[test]
    fn test_counter_loop_reaches_exit() {
        // PUSH1 3, JUMPDEST, PUSH1 1, SWAP1, SUB, DUP1, PUSH1 2, JUMPI, STOP
        let code = [0x60, 0x03, 0x5b, 0x60, 0x01, 0x90, 0x03, 0x80, 0x60, 0x02, 0x57, 0x00];
        let records = explore(&code, ExplorationConfig::default()).expect("loop converges");

        let exit = records
            .iter()
            .find(|record| record.direction == Direction::LoopExit)
            .expect("loop exit recorded");
        assert_eq!(exit.start, 11);

        // the post-loop pc does not depend on the run
        let again = explore(&code, ExplorationConfig::default()).expect("loop converges");
        assert_eq!(records, again);
    }

    #[test]
    fn test_counter_loop_from_one_reaches_exit() {
        // PUSH1 1, JUMPDEST, PUSH1 1, SWAP1, SUB, DUP1, PUSH1 2, JUMPI, STOP
        let code = [0x60, 0x01, 0x5b, 0x60, 0x01, 0x90, 0x03, 0x80, 0x60, 0x02, 0x57, 0x00];
        let records = explore(&code, ExplorationConfig::default()).expect("loop converges");

        // the entry block's JUMPI leaves the loop, so the head is not resolved again
        assert_eq!(starts(&records), vec![0, 2, 11]);
        assert!(records.iter().all(|record| record.direction != Direction::LoopExit));
    }

    /// PUSH1 `n`, PUSH1 5, JUMP, JUMPDEST, PUSH1 1, SWAP1, SUB, DUP1, PUSH1 5, JUMPI, POP, STOP
    fn jump_into_loop(n: u8) -> [u8; 16] {
        [0x60, n, 0x60, 0x05, 0x56, 0x5b, 0x60, 0x01, 0x90, 0x03, 0x80, 0x60, 0x05, 0x57, 0x50, 0x00]
    }

    #[test]
    fn test_jump_into_loop_reaches_exit() {
        for n in [1, 2, 3] {
            let records = explore(&jump_into_loop(n), ExplorationConfig::default())
                .unwrap_or_else(|e| panic!("loop from {n} did not converge: {e}"));

            let exit = records
                .iter()
                .find(|record| record.direction == Direction::LoopExit)
                .expect("loop exit recorded");
            assert_eq!(exit.start, 14, "loop from {n}");
        }
    }

    #[test]
    fn test_endless_loop_aborts() {
        // JUMPDEST, PUSH1 1, PUSH1 1, ADD, PUSH0, JUMPI
        let code = [0x5b, 0x60, 0x01, 0x60, 0x01, 0x01, 0x5f, 0x57];
        let config = ExplorationConfig { loop_iteration_cap: 10, ..Default::default() };
        assert_eq!(
            explore(&code, config),
            Err(AbortReason::LoopIterationLimit { start: 0, cap: 10 })
        );
    }

    #[test]
    fn test_loop_with_call_aborts() {
        // JUMPDEST, PUSH0 x6, STATICCALL, PUSH0, JUMPI
        let code = [0x5b, 0x5f, 0x5f, 0x5f, 0x5f, 0x5f, 0x5f, 0xfa, 0x5f, 0x57];
        assert_eq!(
            explore(&code, ExplorationConfig::default()),
            Err(AbortReason::LoopContainsCall { start: 0 })
        );
    }

    #[test]
    fn test_trivial_self_jump_ends_branch() {
        // JUMPDEST, PUSH0, JUMP
        let records = explore(&[0x5b, 0x5f, 0x56], ExplorationConfig::default()).expect("explores");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].jump_dest, Some(0));
    }

    #[test]
    fn test_revisited_selfdestruct_is_reported() {
        // PUSH0, PUSH1 7, JUMPI, PUSH1 7, JUMP, JUMPDEST, PUSH0, SELFDESTRUCT
        let code = [0x5f, 0x60, 0x07, 0x57, 0x60, 0x07, 0x56, 0x5b, 0x5f, 0xff];
        let mut host = TestHost::default();
        let records = Explorer::new(ExplorationConfig::default().recording())
            .explore(&mut host, contract(&code), 0)
            .expect("explores");

        assert_eq!(host.selfdestructs, 1);
        assert_eq!(host.reachable_selfdestructs, 1);
        assert_eq!(starts(&records), vec![0, 4, 7, 7]);
    }

    #[test]
    fn test_revisit_reaching_jump_reruns() {
        // PUSH0, PUSH1 7, JUMPI, PUSH1 7, JUMP, JUMPDEST, PUSH0, SLOAD, PUSH1 0x0d, JUMP, JUMPDEST, STOP
        let code =
            [0x5f, 0x60, 0x07, 0x57, 0x60, 0x07, 0x56, 0x5b, 0x5f, 0x54, 0x60, 0x0d, 0x56, 0x5b, 0x00];
        let records = explore(&code, ExplorationConfig::default()).expect("explores");

        // block 7 runs twice, block 13 once
        assert_eq!(starts(&records), vec![0, 4, 7, 7, 13]);
    }
}
