pub(crate) mod graph;

use alloy::primitives::Bytes;
use eyre::eyre;
use petgraph::{dot::Dot, Graph};
use std::time::Instant;
use tandem_config::Configuration;
use tandem_vm::ext::exec::build_graph;
use tracing::{debug, info};

use crate::{error::Error, interfaces::CfgArgs};

use self::graph::build_cfg;

/// The control-flow graph of a bytecode.
#[derive(Debug, Clone)]
pub struct CfgResult {
    /// One node per basic block, with edges labeled by branch direction.
    pub graph: Graph<String, String>,
}

impl CfgResult {
    /// Renders the graph in the `dot` graphviz format.
    ///
    /// With `color_edges`, true branches are drawn green and false branches red. Otherwise the
    /// branch labels are dropped.
    pub fn as_dot(&self, color_edges: bool) -> String {
        render_dot(&self.graph, color_edges)
    }
}

/// Renders `contract_cfg` in the `dot` graphviz format.
pub(crate) fn render_dot(contract_cfg: &Graph<String, String>, color_edges: bool) -> String {
    let output = format!("{}", Dot::with_config(contract_cfg, &[]));

    let mut output = output.replace(
        "digraph {",
        "digraph G {\n    node [shape=box, style=\"rounded\", fontname=\"Helvetica\"];\n    edge [fontname=\"Helvetica\"];"
    );

    if color_edges {
        // replace edge labels with colors
        output = output.replace("[ label = \"true\" ]", "[ color = \"green\" ]");
        output = output.replace("[ label = \"false\" ]", "[ color = \"red\" ]");
    } else {
        // remove edge labels
        output = output.replace("[ label = \"true\" ]", "[]");
        output = output.replace("[ label = \"false\" ]", "[]");
    }

    output.replace("[ label = \"\" ]", "[]")
}

/// Explores the target bytecode and builds its control-flow graph.
pub fn cfg(args: CfgArgs) -> Result<CfgResult, Error> {
    let start_time = Instant::now();

    let config = Configuration::load()?;
    let contract_bytecode =
        args.get_bytecode().map_err(|e| Error::TargetError(format!("{e}")))?;
    if contract_bytecode.is_empty() {
        return Err(Error::Eyre(eyre!("target has no bytecode")));
    }
    debug!("fetching target bytecode took {:?}", start_time.elapsed());

    let code = Bytes::from(contract_bytecode);
    let records = build_graph(&code, &config.exploration_config())?;
    debug!("exploring {} bytes took {:?}", code.len(), start_time.elapsed());

    let mut contract_cfg = Graph::new();
    build_cfg(&code, &records, &mut contract_cfg)?;

    info!(
        "built cfg with {} nodes and {} edges in {:?}",
        contract_cfg.node_count(),
        contract_cfg.edge_count(),
        start_time.elapsed()
    );
    Ok(CfgResult { graph: contract_cfg })
}
