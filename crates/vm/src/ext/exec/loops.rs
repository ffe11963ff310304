use alloy::primitives::U256;
use tracing::debug;

use crate::core::vm::{AbortReason, CallContext, Exit, Host, Interpreter};

/// Re-executes the back-edge loop starting at `start` with JUMPI resolved, until an iteration
/// leaves through its own false branch.
///
/// `ctx` is the state after an iteration that jumped back to `start`. Returns the pc the loop
/// exits to, and leaves `ctx` in the state the loop exits with.
pub(super) fn resolve_loop<H: Host>(
    interpreter: &Interpreter,
    ctx: &mut CallContext,
    start: usize,
    cap: usize,
    host: &mut H,
) -> Result<usize, AbortReason> {
    for iteration in 0..cap {
        let mut pc = start;
        let exit = interpreter
            .run(ctx, &mut pc, host)
            .map_err(|e| AbortReason::Interpreter(e.to_string()))?;

        match exit {
            Exit::Jump { destination, .. } if destination == U256::from(pc + 1) => {
                debug!(start, exit = pc + 1, iterations = iteration + 1, "loop converged");
                return Ok(pc + 1);
            }
            Exit::Jump { .. } => {}
            Exit::Abort(reason) => return Err(reason),
            Exit::Halt | Exit::Revert | Exit::EndOfCode | Exit::Failure(_) => {
                return Err(AbortReason::LoopDidNotConverge { start })
            }
        }
    }

    Err(AbortReason::LoopIterationLimit { start, cap })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::vm::{test_utils::TestHost, BranchPolicy, Contract};
    use alloy::primitives::{Address, Bytes};

    fn context(code: &[u8]) -> CallContext {
        CallContext::new(Arc::new(Contract::new(
            Address::ZERO,
            Address::ZERO,
            Bytes::copy_from_slice(code),
            Bytes::new(),
            U256::ZERO,
        )))
    }

    #[test]
    fn test_counter_loop_converges() {
        // JUMPDEST, PUSH1 1, SWAP1, SUB, DUP1, PUSH0, JUMPI, STOP
        let code = [0x5b, 0x60, 0x01, 0x90, 0x03, 0x80, 0x5f, 0x57, 0x00];
        let mut ctx = context(&code);
        ctx.stack.push(U256::from(5));

        let interpreter = Interpreter::new(BranchPolicy::Resolve);
        let exit = resolve_loop(&interpreter, &mut ctx, 0, 1000, &mut TestHost::default());
        assert_eq!(exit, Ok(8));
        assert_eq!(ctx.stack.peek(0), U256::ZERO);
    }

    #[test]
    fn test_endless_loop_hits_cap() {
        // JUMPDEST, PUSH1 1, PUSH0, JUMPI
        let code = [0x5b, 0x60, 0x01, 0x5f, 0x57];
        let mut ctx = context(&code);

        let interpreter = Interpreter::new(BranchPolicy::Resolve);
        let exit = resolve_loop(&interpreter, &mut ctx, 0, 10, &mut TestHost::default());
        assert_eq!(exit, Err(AbortReason::LoopIterationLimit { start: 0, cap: 10 }));
    }

    #[test]
    fn test_failing_iteration_does_not_converge() {
        // JUMPDEST, POP, PUSH1 1, PUSH0, JUMPI
        let code = [0x5b, 0x50, 0x60, 0x01, 0x5f, 0x57];
        let mut ctx = context(&code);
        ctx.stack.push(U256::from(1));

        let interpreter = Interpreter::new(BranchPolicy::Resolve);
        let exit = resolve_loop(&interpreter, &mut ctx, 0, 10, &mut TestHost::default());
        assert_eq!(exit, Err(AbortReason::LoopDidNotConverge { start: 0 }));
    }
}
