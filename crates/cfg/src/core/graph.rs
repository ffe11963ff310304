use alloy::primitives::U256;
use eyre::{OptionExt, Result};
use hashbrown::{HashMap, HashSet};
use petgraph::{graph::NodeIndex, Graph};
use tandem_common::utils::strings::encode_hex_reduced;
use tandem_vm::{
    core::{
        bytecode::{push_immediate, Instructions},
        opcodes::{opcode_name, push_size},
    },
    ext::exec::BlockRecord,
};

/// Disassembles the instructions of `code` from `start` through `stop`, one per line.
fn disassemble(code: &[u8], start: usize, stop: usize) -> String {
    let mut node = String::new();
    for (pc, opcode) in Instructions::new(code, start).take_while(|(pc, _)| *pc <= stop) {
        let immediate = if push_size(opcode) > 0 {
            encode_hex_reduced(push_immediate(code, pc))
        } else {
            String::new()
        };
        node.push_str(&format!(
            "{} {} {}\n",
            encode_hex_reduced(U256::from(pc)),
            opcode_name(opcode),
            immediate
        ));
    }
    node
}

/// Adds the basic blocks of one explored frame to `contract_cfg`.
///
/// Blocks entered more than once become a single node. Every record is connected to the block
/// it was queued from, labeled with the direction it was reached by. Repeated edges are added
/// once.
pub fn build_cfg(
    code: &[u8],
    records: &[BlockRecord],
    contract_cfg: &mut Graph<String, String>,
) -> Result<()> {
    let mut nodes: HashMap<usize, NodeIndex<u32>> = HashMap::new();
    let mut starts: HashMap<usize, usize> = HashMap::new();
    let mut edges: HashSet<(NodeIndex<u32>, NodeIndex<u32>)> = HashSet::new();

    for record in records {
        starts.insert(record.id, record.start);
        nodes
            .entry(record.start)
            .or_insert_with(|| contract_cfg.add_node(disassemble(code, record.start, record.stop)));
    }

    for record in records {
        let Some(parent) = record.parent else {
            continue;
        };

        let parent_start = starts.get(&parent).ok_or_eyre("record refers to an unknown parent")?;
        let from = *nodes.get(parent_start).ok_or_eyre("failed to get parent node")?;
        let to = *nodes.get(&record.start).ok_or_eyre("failed to get node")?;

        // check if the edge already exists
        if edges.insert((from, to)) {
            contract_cfg.add_edge(from, to, record.direction.label().to_string());
        }
    }

    Ok(())
}
