//! Integration tests for block independence analysis.

#[cfg(test)]
mod integration_tests {
    use alloy::primitives::{Address, Bytes, U256};
    use tandem_analyze::{
        analyze_each, analyze_with, AnalyzeArgsBuilder, AnalyzeResult, Analyzer, BlockResult,
    };
    use tandem_common::{
        ether::{
            snapshot::{AccountState, ChainSnapshot},
            types::{Block, Transaction},
        },
        utils::io::file::{delete_path, write_file},
    };
    use tandem_config::Configuration;
    use tandem_vm::{
        core::{opcodes::*, vm::AbortReason},
        ext::exec::{build_graph, Direction, ExplorationConfig},
    };
    use tandem_tracing::init_test_tracing;

    /// A tiny assembler for hand-written test contracts.
    #[derive(Default)]
    struct Assembler {
        code: Vec<u8>,
        labels: Vec<(&'static str, usize)>,
        fixups: Vec<(&'static str, usize)>,
    }

    impl Assembler {
        fn op(mut self, opcode: u8) -> Self {
            self.code.push(opcode);
            self
        }

        fn push(mut self, value: u64) -> Self {
            if value == 0 {
                self.code.push(PUSH0);
                return self;
            }
            let bytes = value.to_be_bytes();
            let skip = bytes.iter().take_while(|byte| **byte == 0).count();
            self.code.push(PUSH1 + (7 - skip) as u8);
            self.code.extend_from_slice(&bytes[skip..]);
            self
        }

        fn push_addr(mut self, address: Address) -> Self {
            self.code.push(PUSH20);
            self.code.extend_from_slice(address.as_slice());
            self
        }

        fn push_label(mut self, label: &'static str) -> Self {
            self.code.push(PUSH2);
            self.fixups.push((label, self.code.len()));
            self.code.extend_from_slice(&[0, 0]);
            self
        }

        fn label(mut self, label: &'static str) -> Self {
            self.labels.push((label, self.code.len()));
            self.code.push(JUMPDEST);
            self
        }

        /// Pushes the seven CALL operands, with empty argument and return buffers.
        fn call(self, to: Address) -> Self {
            self.push(0).push(0).push(0).push(0).push(0).push_addr(to).op(GAS).op(CALL)
        }

        fn build(mut self) -> Bytes {
            for (label, at) in &self.fixups {
                let target = self
                    .labels
                    .iter()
                    .find(|(name, _)| name == label)
                    .map(|(_, offset)| *offset as u16)
                    .expect("undefined label");
                self.code[*at..*at + 2].copy_from_slice(&target.to_be_bytes());
            }
            Bytes::from(self.code)
        }
    }

    fn asm() -> Assembler {
        Assembler::default()
    }

    const SENDER: Address = Address::repeat_byte(0xee);

    fn contract(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    fn account(code: Bytes) -> AccountState {
        AccountState { code, ..Default::default() }
    }

    fn call(to: Address) -> Transaction {
        Transaction { from: SENDER, to: Some(to), ..Default::default() }
    }

    fn analyze(snapshot: ChainSnapshot, number: u64) -> BlockResult {
        Analyzer::new(snapshot, ExplorationConfig::default())
            .analyze_block(number)
            .expect("failed to analyze block")
    }

    /// SLOAD of slot 7 of the executing contract.
    fn reader() -> Bytes {
        asm().push(7).op(SLOAD).op(POP).op(STOP).build()
    }

    /// SSTORE of 1 into slot 7 of the executing contract.
    fn writer() -> Bytes {
        asm().push(1).push(7).op(SSTORE).op(STOP).build()
    }

    #[test]
    fn test_reads_at_different_contracts_are_independent() {
        let snapshot = ChainSnapshot::new()
            .with_account(contract(0xa1), account(reader()))
            .with_account(contract(0xa2), account(reader()))
            .with_block(Block {
                number: 10,
                transactions: vec![call(contract(0xa1)), call(contract(0xa2))],
                ..Default::default()
            });

        let result = analyze(snapshot, 10);

        assert!(result.independent);
        assert!(result.transactions.iter().all(|tx| tx.completed));
        assert!(result.transactions[0].access.reads.contains(&contract(0xa1)));
        assert!(result.transactions[1].access.reads.contains(&contract(0xa2)));
        assert!(result.transactions.iter().all(|tx| tx.access.writes.is_empty()));
    }

    #[test]
    fn test_conflicts_are_directional() {
        // inspects the writer's code size
        let inspector = asm().push_addr(contract(0xc0)).op(EXTCODESIZE).op(POP).op(STOP).build();
        let snapshot = ChainSnapshot::new()
            .with_account(contract(0xb0), account(reader()))
            .with_account(contract(0xc0), account(writer()))
            .with_account(contract(0xc1), account(inspector))
            .with_block(Block {
                number: 11,
                transactions: vec![
                    call(contract(0xb0)),
                    call(contract(0xc0)),
                    call(contract(0xc1)),
                ],
                ..Default::default()
            });

        let result = analyze(snapshot, 11);

        assert!(!result.independent);
        assert!(result.transactions[1].access.writes.contains(&contract(0xc0)));
        assert!(result.transactions[2].access.reads.contains(&contract(0xc0)));
        assert_eq!(result.transactions[2].access.conflicts, vec![1]);

        // the writer does not conflict with its reader
        assert!(result.transactions[1].access.conflicts.is_empty());
        assert!(result.transactions[0].access.conflicts.is_empty());
    }

    #[test]
    fn test_storage_read_after_write_is_dependent() {
        // writes slot 7 when called with a non-zero word, reads it otherwise
        let vault = asm()
            .push(0)
            .op(CALLDATALOAD)
            .push_label("write")
            .op(JUMPI)
            .push(7)
            .op(SLOAD)
            .op(POP)
            .op(STOP)
            .label("write")
            .push(1)
            .push(7)
            .op(SSTORE)
            .op(STOP)
            .build();

        let snapshot = ChainSnapshot::new()
            .with_account(contract(0xb0), account(reader()))
            .with_account(contract(0xc0), account(vault))
            .with_block(Block {
                number: 18,
                transactions: vec![
                    call(contract(0xb0)),
                    Transaction { input: Bytes::from(vec![1u8; 32]), ..call(contract(0xc0)) },
                    call(contract(0xc0)),
                ],
                ..Default::default()
            });

        let result = analyze(snapshot, 18);

        assert!(!result.independent);
        assert!(result.transactions[1].access.writes.contains(&contract(0xc0)));
        assert!(result.transactions[2].access.reads.contains(&contract(0xc0)));
        assert!(result.transactions[2].access.conflicts.contains(&1));
        assert!(result.transactions[0].access.conflicts.is_empty());
    }

    #[test]
    fn test_ambiguous_return_data_is_dependent() {
        init_test_tracing();

        // two branches revert with different payloads
        let callee = asm()
            .push(0)
            .op(CALLDATALOAD)
            .push_label("other")
            .op(JUMPI)
            .push(0xaa)
            .push(0)
            .op(MSTORE8)
            .push(1)
            .push(0)
            .op(REVERT)
            .label("other")
            .push(0xbb)
            .push(0)
            .op(MSTORE8)
            .push(1)
            .push(0)
            .op(REVERT)
            .build();

        let snapshot = ChainSnapshot::new()
            .with_account(contract(0xd1), account(callee))
            .with_account(contract(0xd0), account(asm().call(contract(0xd1)).op(STOP).build()))
            .with_account(contract(0xd2), account(reader()))
            .with_block(Block {
                number: 12,
                transactions: vec![call(contract(0xd0)), call(contract(0xd2))],
                ..Default::default()
            });

        let result = analyze(snapshot, 12);

        assert!(!result.independent);
        assert!(!result.transactions[0].completed);
        assert_eq!(
            result.transactions[0].abort,
            Some(AbortReason::AmbiguousReturnData { level: 1, count: 2 })
        );
        assert!(result.transactions[1].completed);
    }

    #[test]
    fn test_identical_return_data_completes() {
        // both branches return the same payload, so the call resolves
        let callee = asm()
            .push(0)
            .op(CALLDATALOAD)
            .push_label("other")
            .op(JUMPI)
            .push(0x01)
            .push(0)
            .op(MSTORE8)
            .push(1)
            .push(0)
            .op(RETURN)
            .label("other")
            .push(0x01)
            .push(0)
            .op(MSTORE8)
            .push(1)
            .push(0)
            .op(RETURN)
            .build();

        let snapshot = ChainSnapshot::new()
            .with_account(contract(0xe1), account(callee))
            .with_account(contract(0xe0), account(asm().call(contract(0xe1)).op(STOP).build()))
            .with_block(Block {
                number: 13,
                transactions: vec![call(contract(0xe0))],
                ..Default::default()
            });

        let result = analyze(snapshot, 13);
        let tx = &result.transactions[0];

        assert!(tx.completed);
        assert!(result.independent);
        assert_eq!(tx.returns, vec![(1, vec![Bytes::from_static(&[0x01])])]);
    }

    #[test]
    fn test_single_transaction_block_is_independent() {
        // reads and writes its own storage
        let code = asm().push(7).op(SLOAD).push(7).op(SSTORE).op(STOP).build();
        let snapshot = ChainSnapshot::new()
            .with_account(contract(0xf0), account(code))
            .with_block(Block {
                number: 14,
                transactions: vec![call(contract(0xf0))],
                ..Default::default()
            });

        let result = analyze(snapshot, 14);
        let tx = &result.transactions[0];

        assert!(result.independent);
        assert!(tx.access.reads.contains(&contract(0xf0)));
        assert!(tx.access.writes.contains(&contract(0xf0)));
        assert!(tx.access.conflicts.is_empty());
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let snapshot = ChainSnapshot::new()
            .with_account(contract(0xc0), account(writer()))
            .with_account(
                contract(0xc1),
                account(asm().push_addr(contract(0xc0)).op(BALANCE).op(POP).op(STOP).build()),
            )
            .with_block(Block {
                number: 15,
                transactions: vec![call(contract(0xc0)), call(contract(0xc1))],
                ..Default::default()
            });

        let analyzer = Analyzer::new(snapshot, ExplorationConfig::default());
        let first = analyzer.analyze_block(15).expect("failed to analyze block");
        let second = analyzer.analyze_block(15).expect("failed to analyze block");

        assert_eq!(first, second);
        assert!(!first.independent);
        assert_eq!(first.transactions[1].access.conflicts, vec![0]);
    }

    /// Counts down from `start` in a loop, then writes storage.
    fn counter_loop(start: u64) -> Bytes {
        asm()
            .push(start)
            .push_label("loop")
            .op(JUMP)
            .label("loop")
            .push(1)
            .op(SWAP1)
            .op(SUB)
            .op(DUP1)
            .push_label("loop")
            .op(JUMPI)
            .push(7)
            .op(SSTORE)
            .op(STOP)
            .build()
    }

    #[test]
    fn test_counter_loop_converges() {
        let config = ExplorationConfig { record_blocks: true, ..Default::default() };

        for start in [1, 2, 5] {
            let code = counter_loop(start);
            let records = build_graph(&code, &config).expect("loop converges");
            let exits = records
                .iter()
                .filter(|record| record.direction == Direction::LoopExit)
                .map(|record| record.start)
                .collect::<Vec<_>>();
            assert_eq!(exits.len(), 1, "counter from {start}");

            // the post-loop pc does not depend on the run
            let again = build_graph(&code, &config).expect("loop converges");
            assert_eq!(records, again);

            // the write after the loop is part of the footprint
            let snapshot = ChainSnapshot::new()
                .with_account(contract(0x10), account(code))
                .with_block(Block {
                    number: 16,
                    transactions: vec![call(contract(0x10))],
                    ..Default::default()
                });
            let result = analyze(snapshot, 16);
            assert!(result.transactions[0].completed, "counter from {start}");
            assert!(result.transactions[0].access.writes.contains(&contract(0x10)));
        }
    }

    #[test]
    fn test_loop_iteration_cap_abandons_transaction() {
        let snapshot = ChainSnapshot::new()
            .with_account(contract(0x11), account(counter_loop(50)))
            .with_block(Block {
                number: 17,
                transactions: vec![call(contract(0x11))],
                ..Default::default()
            });

        let config = ExplorationConfig { loop_iteration_cap: 10, ..Default::default() };
        let result = Analyzer::new(snapshot, config)
            .analyze_block(17)
            .expect("failed to analyze block");

        assert!(!result.independent);
        assert!(matches!(
            result.transactions[0].abort,
            Some(AbortReason::LoopIterationLimit { cap: 10, .. })
        ));
    }

    #[test]
    fn test_analyze_range_over_snapshot() {
        let mut snapshot = ChainSnapshot::new().with_account(contract(0xa1), account(reader()));
        for number in 20..23 {
            snapshot = snapshot.with_block(Block {
                number,
                transactions: vec![call(contract(0xa1)), call(contract(0xa1))],
                ..Default::default()
            });
        }

        let analyzer = Analyzer::new(snapshot, ExplorationConfig::default());
        let result = AnalyzeResult {
            blocks: analyzer
                .analyze_range(20)
                .collect::<Result<Vec<_>, _>>()
                .expect("failed to analyze range"),
        };

        assert_eq!(result.blocks.len(), 3);
        assert_eq!(result.blocks.iter().map(|block| block.number).collect::<Vec<_>>(), vec![
            20, 21, 22
        ]);
        assert!(result.independent());
    }

    #[test]
    fn test_analyze_each_delivers_blocks_in_order() {
        let mut snapshot = ChainSnapshot::new().with_account(contract(0xa1), account(reader()));
        for number in 40..43 {
            snapshot = snapshot.with_block(Block {
                number,
                transactions: vec![call(contract(0xa1))],
                ..Default::default()
            });
        }

        let path = std::env::temp_dir()
            .join(format!("tandem-snapshot-{}.json", std::process::id()))
            .to_string_lossy()
            .to_string();
        let contents = serde_json::to_string(&snapshot).expect("failed to serialize snapshot");
        write_file(&path, &contents).expect("failed to write snapshot");

        let args = AnalyzeArgsBuilder::new()
            .snapshot(path.clone())
            .block(40)
            .range(true)
            .build()
            .expect("failed to build AnalyzeArgs");

        let mut delivered = Vec::new();
        let count = analyze_each(args.clone(), &Configuration::default(), |block| {
            delivered.push(block.number);
            Ok(())
        })
        .expect("failed to analyze range");
        let collected =
            analyze_with(args, &Configuration::default()).expect("failed to analyze range");
        delete_path(&path);

        assert_eq!(count, 3);
        assert_eq!(delivered, vec![40, 41, 42]);
        assert_eq!(collected.blocks.len(), 3);
        assert!(collected.independent());
    }

    #[test]
    fn test_create_transaction_writes_new_address() {
        // init code stores into its own storage
        let snapshot = ChainSnapshot::new()
            .with_account(SENDER, AccountState { nonce: 3, ..Default::default() })
            .with_block(Block {
                number: 30,
                transactions: vec![Transaction {
                    from: SENDER,
                    to: None,
                    input: writer(),
                    value: U256::ZERO,
                    ..Default::default()
                }],
                ..Default::default()
            });

        let result = analyze(snapshot, 30);
        let tx = &result.transactions[0];
        let deployed = SENDER.create(3);

        assert!(tx.completed);
        assert!(tx.access.writes.contains(&deployed));
        assert_eq!(tx.created, vec![(0, deployed)]);
    }
}
