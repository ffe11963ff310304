//! Integration tests for CFG (Control Flow Graph) functionality.

#[cfg(test)]
mod integration_tests {
    use alloy::primitives::Bytes;
    use petgraph::{dot::Dot, Graph};
    use serial_test::serial;
    use tandem_cfg::{build_cfg, cfg, CfgArgsBuilder};
    use tandem_vm::ext::exec::{build_graph, ExplorationConfig};

    // PUSH1 0, CALLDATALOAD, PUSH1 0x09, JUMPI, PUSH0, PUSH0, REVERT, JUMPDEST, STOP
    const BRANCHING: &str = "0x6000356009575f5ffd5b00";

    #[test]
    #[serial]
    fn test_cfg_simple() {
        let args = CfgArgsBuilder::new()
            .target(BRANCHING.to_string())
            .build()
            .expect("failed to build CfgArgs");
        let result = cfg(args).expect("failed to generate cfg");

        assert_eq!(result.graph.node_count(), 3);
        assert_eq!(result.graph.edge_count(), 2);

        let output = format!("{}", Dot::with_config(&result.graph, &[]));
        for line in &[
            "0 [ label = \"0 PUSH1 0\\l0x2 CALLDATALOAD \\l0x3 PUSH1 0x9\\l0x5 JUMPI \\l\" ]",
            "[ label = \"false\" ]",
            "[ label = \"true\" ]",
            "0x9 JUMPDEST \\l0xa STOP \\l",
        ] {
            assert!(output.contains(line), "missing `{line}` in\n{output}");
        }
    }

    #[test]
    #[serial]
    fn test_cfg_colored_output() {
        let args = CfgArgsBuilder::new()
            .target(BRANCHING.to_string())
            .color_edges(true)
            .build()
            .expect("failed to build CfgArgs");
        let result = cfg(args).expect("failed to generate cfg");

        let output = result.as_dot(true);
        assert!(output.starts_with("digraph G {"));
        assert!(output.contains("[ color = \"green\" ]"));
        assert!(output.contains("[ color = \"red\" ]"));
    }

    #[test]
    #[serial]
    fn test_cfg_rejects_empty_target() {
        let args = CfgArgsBuilder::new()
            .target("0x".to_string())
            .build()
            .expect("failed to build CfgArgs");
        assert!(cfg(args).is_err());
    }

    #[test]
    fn test_loop_exit_edge() {
        // PUSH1 3, PUSH2 0x0006, JUMP, JUMPDEST, PUSH1 1, SWAP1, SUB, DUP1, PUSH2 0x0006, JUMPI,
        // STOP
        let code = Bytes::from_static(&[
            0x60, 0x03, 0x61, 0x00, 0x06, 0x56, 0x5b, 0x60, 0x01, 0x90, 0x03, 0x80, 0x61, 0x00,
            0x06, 0x57, 0x00,
        ]);
        let records = build_graph(&code, &ExplorationConfig::default()).expect("loop converges");

        let mut graph = Graph::new();
        build_cfg(&code, &records, &mut graph).expect("failed to build cfg");

        // entry, loop body, post-loop block
        assert_eq!(graph.node_count(), 3);
        let output = format!("{}", Dot::with_config(&graph, &[]));
        assert!(output.contains("[ label = \"loop exit\" ]"));
        assert!(output.contains("0x10 STOP"));
    }
}
