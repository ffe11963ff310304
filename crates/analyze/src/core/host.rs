use std::sync::Arc;

use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use tandem_common::ether::{
    provider::{ChainDataSource, StateReader},
    types::Transaction,
};
use tandem_vm::{
    core::{
        constants::BLOCKHASH_WINDOW,
        vm::{AbortReason, CallInputs, Contract, CreateInputs, CreateScheme, Environment, Host},
    },
    ext::exec::{BlockRecord, Explorer},
};
use tracing::{debug, trace};

use super::{
    access::{AccessKind, AccessPoint, AccessSet},
    registry::{CreateRegistry, ReturnRegistry},
    state::ShadowState,
};

/// The basic blocks of one explored frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// The frame's call level. The top-level frame is level 0.
    pub level: usize,

    /// The address the frame executed as.
    pub address: Address,

    /// The code the frame ran.
    pub code: Bytes,

    /// The explored blocks.
    pub records: Vec<BlockRecord>,
}

/// The [`Host`] a transaction is analyzed against.
///
/// Reads consult the transaction's [`ShadowState`] first and fall back to `committed`, the state
/// of the block being analyzed. BLOCKHASH is served by `chain`. Every state access is recorded in the transaction's [`AccessSet`]. Nested frames are
/// explored recursively with the same [`Explorer`], and their outputs are resolved through the
/// per-level registries.
pub struct TransactionHost<'a, C, R> {
    chain: &'a C,
    committed: &'a R,
    explorer: &'a Explorer,
    env: Environment,

    /// Speculative writes of this transaction.
    pub state: ShadowState,

    /// Addresses read and written.
    pub access: AccessSet,

    /// De-duplicated accesses, in the order they were first made.
    pub points: Vec<AccessPoint>,

    /// RETURN and REVERT payloads per level.
    pub returns: ReturnRegistry,

    /// Created addresses per level.
    pub creates: CreateRegistry,

    /// Whether a SELFDESTRUCT is reachable.
    pub suicide: bool,

    /// Explored frames, when block recording is on.
    pub frames: Vec<FrameRecord>,

    level: usize,
}

impl<'a, C: ChainDataSource, R: StateReader> TransactionHost<'a, C, R> {
    /// Creates a host with fresh shadow state and registries.
    pub fn new(chain: &'a C, committed: &'a R, explorer: &'a Explorer, env: Environment) -> Self {
        Self {
            chain,
            committed,
            explorer,
            env,
            state: ShadowState::new(),
            access: AccessSet::new(),
            points: Vec::new(),
            returns: ReturnRegistry::new(),
            creates: CreateRegistry::new(),
            suicide: false,
            frames: Vec::new(),
            level: 0,
        }
    }

    /// The level of the frame currently executing.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Explores `tx` as the top-level frame.
    pub fn execute(&mut self, tx: &Transaction) -> Result<(), AbortReason> {
        self.level = 0;
        self.returns.renew(0);

        let contract = match tx.to {
            Some(to) => Contract::new(tx.from, to, self.committed.code(to), tx.input.clone(), tx.value),
            None => {
                let address = tx.from.create(self.committed.nonce(tx.from));
                self.creates.renew(0);
                self.creates.register(0, address)?;
                Contract::new(tx.from, address, tx.input.clone(), Bytes::new(), tx.value)
            }
        };

        self.explore(contract)
    }

    fn explore(&mut self, contract: Contract) -> Result<(), AbortReason> {
        let (address, code, level) = (contract.address, contract.code.clone(), self.level);
        let explorer = self.explorer;
        let records = explorer.explore(self, Arc::new(contract), level)?;
        if explorer.config.record_blocks {
            self.frames.push(FrameRecord { level, address, code, records });
        }
        Ok(())
    }

    /// Explores `contract` one level below the current frame.
    fn explore_nested(&mut self, contract: Contract) -> Result<(), AbortReason> {
        self.level += 1;
        let result = self.explore(contract);
        self.level -= 1;
        result
    }

    fn record(&mut self, contract: &Contract, opcode: &str, address: Address, kind: AccessKind) {
        self.access.add(address, kind);

        let point = AccessPoint {
            depth: self.level,
            opcode: opcode.to_string(),
            initiator: contract.address,
            address,
        };
        if !self.points.contains(&point) {
            trace!(level = self.level, opcode, %address, "recording access");
            self.points.push(point);
        }
    }

    fn committed_balance(&self, address: Address) -> U256 {
        self.state.balance(&address).unwrap_or_else(|| self.committed.balance(address))
    }
}

impl<C: ChainDataSource, R: StateReader> Host for TransactionHost<'_, C, R> {
    fn env(&self) -> &Environment {
        &self.env
    }

    fn balance(&mut self, contract: &Contract, address: Address) -> U256 {
        self.record(contract, "BALANCE", address, AccessKind::Read);
        self.committed_balance(address)
    }

    fn self_balance(&mut self, contract: &Contract) -> U256 {
        self.record(contract, "SELFBALANCE", contract.address, AccessKind::Read);
        self.committed_balance(contract.address)
    }

    fn code(&mut self, contract: &Contract, address: Address) -> Bytes {
        self.record(contract, "EXTCODECOPY", address, AccessKind::Read);
        self.committed.code(address)
    }

    fn code_size(&mut self, contract: &Contract, address: Address) -> U256 {
        self.record(contract, "EXTCODESIZE", address, AccessKind::Read);
        U256::from(self.committed.code_size(address))
    }

    fn code_hash(&mut self, contract: &Contract, address: Address) -> B256 {
        self.record(contract, "EXTCODEHASH", address, AccessKind::Read);
        if self.committed.is_empty(address) {
            return B256::ZERO;
        }
        self.committed.code_hash(address)
    }

    fn block_hash(&mut self, number: U256) -> B256 {
        let upper = self.env.number;
        let Ok(number) = u64::try_from(number) else {
            return B256::ZERO;
        };
        if number >= upper || number < upper.saturating_sub(BLOCKHASH_WINDOW) {
            return B256::ZERO;
        }
        self.chain.get_block(number).map(|block| block.hash).unwrap_or_default()
    }

    fn sload(&mut self, contract: &Contract, key: U256) -> U256 {
        self.record(contract, "SLOAD", contract.address, AccessKind::Read);
        self.state
            .read(&contract.address, &key)
            .unwrap_or_else(|| self.committed.storage(contract.address, key))
    }

    fn sstore(&mut self, contract: &Contract, key: U256, value: U256) {
        self.record(contract, "SSTORE", contract.address, AccessKind::Write);
        self.state.write(contract.address, key, value);
    }

    fn tload(&mut self, contract: &Contract, key: U256) -> U256 {
        self.state.tload(&contract.address, &key)
    }

    fn tstore(&mut self, contract: &Contract, key: U256, value: U256) {
        self.state.tstore(contract.address, key, value);
    }

    fn call(&mut self, inputs: CallInputs) -> Result<Bytes, AbortReason> {
        let callee = self.level + 1;
        debug!(
            level = callee,
            scheme = inputs.scheme.name(),
            address = %inputs.address,
            code_address = %inputs.code_address,
            "entering call frame"
        );

        let code = self.committed.code(inputs.code_address);
        let contract = Contract::new(inputs.caller, inputs.address, code, inputs.input, inputs.value);

        self.returns.renew(callee);
        self.explore_nested(contract)?;

        let mut payloads = self.returns.payloads(callee);
        match payloads.len() {
            0 => Err(AbortReason::MissingReturnData { level: callee }),
            1 => Ok(payloads.remove(0)),
            count => Err(AbortReason::AmbiguousReturnData { level: callee, count }),
        }
    }

    fn create(&mut self, inputs: CreateInputs) -> Result<Address, AbortReason> {
        let callee = self.level + 1;
        let address = match inputs.scheme {
            CreateScheme::Create => inputs.caller.create(self.committed.nonce(inputs.caller)),
            CreateScheme::Create2 { salt } => {
                inputs.caller.create2(salt.to_be_bytes::<32>(), keccak256(&inputs.init_code).0)
            }
        };
        debug!(level = callee, %address, size = inputs.init_code.len(), "entering create frame");

        self.creates.renew(callee);
        self.creates.register(callee, address)?;
        self.returns.renew(callee);

        let contract =
            Contract::new(inputs.caller, address, inputs.init_code, Bytes::new(), inputs.value);
        self.explore_nested(contract)?;

        self.creates.get(callee).ok_or_else(|| {
            AbortReason::Interpreter(format!("no address registered at level {callee}"))
        })
    }

    fn record_return(&mut self, payload: &[u8]) {
        self.returns.record(self.level, payload);
    }

    fn selfdestruct(&mut self, contract: &Contract, beneficiary: Address) {
        let balance = self.committed_balance(contract.address);
        self.state.credit(beneficiary, balance);
        self.suicide = true;
    }

    fn selfdestruct_reachable(&mut self) {
        self.suicide = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_common::ether::{
        snapshot::{AccountState, ChainSnapshot},
        types::Block,
    };
    use tandem_vm::ext::exec::ExplorationConfig;

    const CONTRACT: Address = Address::repeat_byte(0xc0);
    const CALLEE: Address = Address::repeat_byte(0xca);
    const SENDER: Address = Address::repeat_byte(0x5e);

    fn snapshot(code: &[u8]) -> ChainSnapshot {
        ChainSnapshot::new().with_account(
            CONTRACT,
            AccountState {
                code: Bytes::copy_from_slice(code),
                balance: U256::from(50),
                ..Default::default()
            },
        )
    }

    fn call_tx() -> Transaction {
        Transaction { from: SENDER, to: Some(CONTRACT), ..Default::default() }
    }

    #[test]
    fn test_storage_reads_see_shadow_writes() {
        // PUSH1 0x2a, PUSH0, SSTORE, PUSH0, SLOAD, PUSH0, MSTORE, PUSH1 0x20, PUSH0, RETURN
        let source = snapshot(&[0x60, 0x2a, 0x5f, 0x55, 0x5f, 0x54, 0x5f, 0x52, 0x60, 0x20, 0x5f, 0xf3]);
        let explorer = Explorer::default();
        let mut host = TransactionHost::new(&source, &source, &explorer, Environment::default());

        host.execute(&call_tx()).expect("execution aborted");

        assert!(host.access.has(&CONTRACT, AccessKind::Read));
        assert!(host.access.has(&CONTRACT, AccessKind::Write));
        assert_eq!(host.state.read(&CONTRACT, &U256::ZERO), Some(U256::from(0x2a)));
        assert_eq!(
            host.returns.payloads(0),
            vec![Bytes::copy_from_slice(&U256::from(0x2a).to_be_bytes::<32>())]
        );
        assert_eq!(host.points.len(), 2);
        assert_eq!(host.points[0].opcode, "SSTORE");
        assert_eq!(host.points[1].opcode, "SLOAD");
    }

    #[test]
    fn test_balance_queries_record_reads() {
        // PUSH20 CALLEE, BALANCE, SELFBALANCE, STOP
        let mut code = vec![0x73];
        code.extend_from_slice(CALLEE.as_slice());
        code.extend([0x31, 0x47, 0x00]);
        let source = snapshot(&code);
        let explorer = Explorer::default();
        let mut host = TransactionHost::new(&source, &source, &explorer, Environment::default());

        host.execute(&call_tx()).expect("execution aborted");

        assert_eq!(host.access.reads.len(), 2);
        assert!(host.access.has(&CALLEE, AccessKind::Read));
        assert!(host.access.has(&CONTRACT, AccessKind::Read));
        assert!(host.access.writes.is_empty());
    }

    #[test]
    fn test_selfdestruct_credits_beneficiary() {
        // PUSH20 CALLEE, SELFDESTRUCT
        let mut code = vec![0x73];
        code.extend_from_slice(CALLEE.as_slice());
        code.push(0xff);
        let source = snapshot(&code);
        let explorer = Explorer::default();
        let mut host = TransactionHost::new(&source, &source, &explorer, Environment::default());

        host.execute(&call_tx()).expect("execution aborted");

        assert!(host.suicide);
        assert_eq!(host.state.balance(&CALLEE), Some(U256::from(50)));
    }

    #[test]
    fn test_call_into_returning_callee() {
        // callee: PUSH1 0x07, PUSH0, MSTORE8, PUSH1 0x01, PUSH0, RETURN
        let callee = [0x60, 0x07, 0x5f, 0x53, 0x60, 0x01, 0x5f, 0xf3];

        // PUSH1 0x20, PUSH0, PUSH0, PUSH0, PUSH0, PUSH20 CALLEE, PUSH0, CALL,
        // RETURNDATASIZE, PUSH0, SSTORE, STOP
        let mut code = vec![0x60, 0x20, 0x5f, 0x5f, 0x5f, 0x5f, 0x73];
        code.extend_from_slice(CALLEE.as_slice());
        code.extend([0x5f, 0xf1, 0x3d, 0x5f, 0x55, 0x00]);

        let source = snapshot(&code).with_account(
            CALLEE,
            AccountState { code: Bytes::copy_from_slice(&callee), ..Default::default() },
        );
        let explorer = Explorer::new(ExplorationConfig::default().recording());
        let mut host = TransactionHost::new(&source, &source, &explorer, Environment::default());

        host.execute(&call_tx()).expect("execution aborted");

        assert_eq!(host.returns.payloads(1), vec![Bytes::from_static(&[0x07])]);
        assert_eq!(host.state.read(&CONTRACT, &U256::ZERO), Some(U256::from(1)));
        assert_eq!(host.level(), 0);

        // the callee frame finishes first
        assert_eq!(host.frames.len(), 2);
        assert_eq!(host.frames[0].level, 1);
        assert_eq!(host.frames[0].address, CALLEE);
        assert_eq!(host.frames[1].level, 0);
    }

    #[test]
    fn test_call_into_account_without_code() {
        // PUSH0, PUSH0, PUSH0, PUSH0, PUSH0, PUSH20 CALLEE, PUSH0, CALL, STOP
        let mut code = vec![0x5f, 0x5f, 0x5f, 0x5f, 0x5f, 0x73];
        code.extend_from_slice(CALLEE.as_slice());
        code.extend([0x5f, 0xf1, 0x00]);
        let source = snapshot(&code);
        let explorer = Explorer::default();
        let mut host = TransactionHost::new(&source, &source, &explorer, Environment::default());

        assert_eq!(host.execute(&call_tx()), Err(AbortReason::MissingReturnData { level: 1 }));
    }

    #[test]
    fn test_recursive_call_hits_depth_cap() {
        // PUSH0, PUSH0, PUSH0, PUSH0, PUSH0, ADDRESS, GAS, CALL, STOP
        let source = snapshot(&[0x5f, 0x5f, 0x5f, 0x5f, 0x5f, 0x30, 0x5a, 0xf1, 0x00]);
        let explorer = Explorer::default();
        let mut host = TransactionHost::new(&source, &source, &explorer, Environment::default());

        assert_eq!(host.execute(&call_tx()), Err(AbortReason::DepthExceeded { level: 5 }));
        assert_eq!(host.level(), 0);
    }

    #[test]
    fn test_create_pushes_nonce_address() {
        // PUSH0, PUSH0, PUSH0, CREATE, PUSH0, SSTORE, STOP
        let source = snapshot(&[0x5f, 0x5f, 0x5f, 0xf0, 0x5f, 0x55, 0x00]).with_account(
            CONTRACT,
            AccountState {
                code: Bytes::from_static(&[0x5f, 0x5f, 0x5f, 0xf0, 0x5f, 0x55, 0x00]),
                nonce: 3,
                ..Default::default()
            },
        );
        let explorer = Explorer::default();
        let mut host = TransactionHost::new(&source, &source, &explorer, Environment::default());

        host.execute(&call_tx()).expect("execution aborted");

        let created = CONTRACT.create(3);
        assert_eq!(host.creates.get(1), Some(created));
        assert_eq!(
            host.state.read(&CONTRACT, &U256::ZERO),
            Some(U256::from_be_slice(created.as_slice()))
        );
    }

    #[test]
    fn test_create_transaction_runs_init_code() {
        let source = ChainSnapshot::new()
            .with_account(SENDER, AccountState { nonce: 1, ..Default::default() });
        let explorer = Explorer::default();
        let mut host = TransactionHost::new(&source, &source, &explorer, Environment::default());

        // PUSH1 0x01, PUSH0, SSTORE, STOP
        let tx = Transaction {
            from: SENDER,
            input: Bytes::from_static(&[0x60, 0x01, 0x5f, 0x55, 0x00]),
            ..Default::default()
        };
        host.execute(&tx).expect("execution aborted");

        let created = SENDER.create(1);
        assert_eq!(host.creates.get(0), Some(created));
        assert!(host.access.has(&created, AccessKind::Write));
    }

    #[test]
    fn test_block_hash_window() {
        let parent = B256::repeat_byte(0x11);
        let source = ChainSnapshot::new()
            .with_block(Block { number: 9, hash: parent, ..Default::default() })
            .with_block(Block { number: 10, hash: B256::repeat_byte(0x22), ..Default::default() });
        let explorer = Explorer::default();
        let env = Environment { number: 10, ..Default::default() };
        let mut host = TransactionHost::new(&source, &source, &explorer, env);

        assert_eq!(host.block_hash(U256::from(9)), parent);
        assert_eq!(host.block_hash(U256::from(10)), B256::ZERO);
        assert_eq!(host.block_hash(U256::from(3)), B256::ZERO);
        assert_eq!(host.block_hash(U256::MAX), B256::ZERO);
    }
}
