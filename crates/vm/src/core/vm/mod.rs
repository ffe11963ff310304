//! The block interpreter.
//!
//! One opcode dispatch serves every execution mode: a [`Host`] decides what state access and
//! nested frames mean, and a [`BranchPolicy`] decides how JUMPI treats its condition.

mod context;
mod core;
mod exit;
mod host;

/// Opcode handlers organized by category.
pub mod handlers;

pub use self::core::{BranchPolicy, Interpreter, Machine};
pub use context::{CallContext, Contract, Environment};
pub use exit::{AbortReason, Exit, Failure};
pub use host::{CallInputs, CallScheme, CreateInputs, CreateScheme, Host};


#[cfg(test)]
mod tests {
    use super::{test_utils::*, *};
    use alloy::primitives::U256;

    #[test]
    fn test_stop_halts() {
        let (exit, pc, _) = run_with_policy(&[0x00], BranchPolicy::Speculative, &mut TestHost::default());
        assert_eq!(exit, Exit::Halt);
        assert_eq!(pc, 0);
    }

    #[test]
    fn test_end_of_code() {
        let (exit, pc, _) =
            run_with_policy(&[0x60, 0x01], BranchPolicy::Speculative, &mut TestHost::default());
        assert_eq!(exit, Exit::EndOfCode);
        assert_eq!(pc, 2);
    }

    #[test]
    fn test_invalid_and_undefined_opcodes() {
        let (exit, _) = execute(&[0xfe]);
        assert_eq!(exit, Exit::Failure(Failure::InvalidOpcode));

        let (exit, _) = execute(&[0x0c]);
        assert_eq!(exit, Exit::Failure(Failure::InvalidOpcode));
    }

    #[test]
    fn test_underflow_does_not_execute() {
        // PUSH1 1, ADD
        let (exit, pc, ctx) =
            run_with_policy(&[0x60, 0x01, 0x01], BranchPolicy::Speculative, &mut TestHost::default());
        assert_eq!(exit, Exit::Failure(Failure::StackUnderflow));
        assert_eq!(pc, 2);
        assert_eq!(ctx.stack.peek(0), U256::from(1));
    }

    #[test]
    fn test_overflow_is_detected() {
        // 1025 x PUSH0
        let code = vec![0x5f; 1025];
        let (exit, pc, ctx) =
            run_with_policy(&code, BranchPolicy::Speculative, &mut TestHost::default());
        assert_eq!(exit, Exit::Failure(Failure::StackOverflow));
        assert_eq!(pc, 1024);
        assert_eq!(ctx.stack.size(), 1024);
    }

    #[test]
    fn test_memory_limit_is_configurable() {
        // PUSH1 0x2a, PUSH2 0x1000, MSTORE
        let code = [0x60, 0x2a, 0x61, 0x10, 0x00, 0x52];
        let (exit, _) = execute(&code);
        assert!(!matches!(exit, Exit::Failure(_)));

        let mut ctx = CallContext::new(std::sync::Arc::new(Contract::new(
            Default::default(),
            Default::default(),
            code.to_vec().into(),
            Default::default(),
            U256::ZERO,
        )));
        let mut pc = 0;
        let exit = Interpreter::default()
            .with_max_memory_size(1024)
            .run(&mut ctx, &mut pc, &mut TestHost::default())
            .expect("run failed");
        assert_eq!(exit, Exit::Failure(Failure::MemoryLimitExceeded));
        assert_eq!(ctx.memory.size(), 0);
    }
}
