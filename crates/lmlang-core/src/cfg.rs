//! Basic-block / CFG view derived from the computational graph.
//!
//! [`ProgramGraph`] stores a flat, readiness-counter-driven node graph, not a
//! literal basic-block CFG. The abstract interpreter still needs to reason
//! about functions in terms of basic blocks, predecessors, and successors
//! (the same shape the original `canal` analyzer walks via LLVM's own
//! `BasicBlock`/`TerminatorInst` API). This module derives that view on
//! demand by partitioning a function's nodes at `Branch`/`Jump`/`Return`
//! terminators and reading successor labels off `FlowEdge::Control` edges.
//! It is purely additive: `ProgramGraph`'s own storage is untouched.

use std::collections::{HashMap, VecDeque};

use petgraph::graph::NodeIndex;
use petgraph::Direction;

use crate::edge::FlowEdge;
use crate::graph::ProgramGraph;
use crate::id::{FunctionId, NodeId};

/// A basic block is identified by the [`NodeId`] of its first instruction,
/// the same convention LLVM uses when labeling blocks by their leader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub NodeId);

#[derive(Debug, Clone)]
pub struct BasicBlock {
    pub id: BlockId,
    /// Instructions in program order, terminator last.
    pub instructions: Vec<NodeId>,
    pub predecessors: Vec<BlockId>,
    pub successors: Vec<BlockId>,
}

/// Derived control-flow view of one function.
#[derive(Debug, Clone)]
pub struct FunctionCfg {
    pub entry: BlockId,
    pub blocks: HashMap<BlockId, BasicBlock>,
    /// Which block owns a given instruction, for O(1) lookup during
    /// interpretation.
    node_block: HashMap<NodeId, BlockId>,
}

impl FunctionCfg {
    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(&id)
    }

    pub fn block_of(&self, node: NodeId) -> Option<BlockId> {
        self.node_block.get(&node).copied()
    }

    /// Blocks in an order where every block appears after all of its
    /// predecessors have been discovered at least once (a reverse
    /// post-order over the successor relation, starting at `entry`).
    /// Loop headers are revisited by the interpreter's own worklist, not
    /// by this ordering.
    pub fn reverse_post_order(&self) -> Vec<BlockId> {
        let mut order = Vec::new();
        let mut visited = std::collections::HashSet::new();
        let mut stack = vec![self.entry];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            order.push(id);
            if let Some(block) = self.blocks.get(&id) {
                for &succ in block.successors.iter().rev() {
                    if !visited.contains(&succ) {
                        stack.push(succ);
                    }
                }
            }
        }
        order
    }
}

/// Builds the CFG view for `function` by walking control-flow edges from
/// its entry node. Blocks are cut at terminators (`is_terminator()`:
/// `Return`, `Branch`, `Jump`); the walk follows `FlowEdge::Control` edges,
/// which this graph already threads through every instruction in program
/// order (`branch_index: None` for plain sequencing, `Some(n)` selecting a
/// `Branch` arm).
pub fn build(graph: &ProgramGraph, function: FunctionId) -> Option<FunctionCfg> {
    let def = graph.get_function(function)?;
    let entry_node = def.entry_node?;
    let entry_id = BlockId(entry_node);

    let mut blocks: HashMap<BlockId, BasicBlock> = HashMap::new();
    let mut node_block: HashMap<NodeId, BlockId> = HashMap::new();
    let mut pending: VecDeque<NodeId> = VecDeque::new();
    let mut queued: std::collections::HashSet<NodeId> = std::collections::HashSet::new();
    pending.push_back(entry_node);
    queued.insert(entry_node);

    while let Some(leader) = pending.pop_front() {
        let block_id = BlockId(leader);
        if blocks.contains_key(&block_id) {
            continue;
        }

        let mut instructions = Vec::new();
        let mut cursor = leader;
        let mut successor_ids = Vec::new();
        loop {
            instructions.push(cursor);
            node_block.insert(cursor, block_id);
            let node = graph.get_compute_node(cursor);
            let is_terminator = node.map(|n| n.is_terminator()).unwrap_or(true);
            if is_terminator {
                successor_ids = control_successors(graph, cursor);
                break;
            }
            match next_in_sequence(graph, cursor) {
                Some(next) => cursor = next,
                None => break,
            }
        }

        for &succ in &successor_ids {
            if queued.insert(succ) {
                pending.push_back(succ);
            }
        }

        blocks.insert(
            block_id,
            BasicBlock {
                id: block_id,
                instructions,
                predecessors: Vec::new(),
                successors: successor_ids.into_iter().map(BlockId).collect(),
            },
        );
    }

    // Back-fill predecessors now that every block's successors are known.
    let edges: Vec<(BlockId, BlockId)> = blocks
        .values()
        .flat_map(|b| b.successors.iter().map(move |&s| (b.id, s)))
        .collect();
    for (from, to) in edges {
        if let Some(block) = blocks.get_mut(&to) {
            block.predecessors.push(from);
        }
    }

    Some(FunctionCfg { entry: entry_id, blocks, node_block })
}

/// The single non-branching control successor of a node, i.e. the target
/// of its `branch_index: None` control edge. Used to walk within a block.
fn next_in_sequence(graph: &ProgramGraph, node: NodeId) -> Option<NodeId> {
    let idx: NodeIndex<u32> = node.into();
    graph
        .compute()
        .edges_directed(idx, Direction::Outgoing)
        .find(|e| matches!(e.weight(), FlowEdge::Control { branch_index: None }))
        .map(|e| NodeId::from(e.target()))
}

/// All control-flow successors of a terminator, in `branch_index` order
/// for `Branch` (then-arm first), or the sole unconditional target for
/// `Jump`. `Return` has none.
fn control_successors(graph: &ProgramGraph, node: NodeId) -> Vec<NodeId> {
    let idx: NodeIndex<u32> = node.into();
    let mut targets: Vec<(Option<u16>, NodeId)> = graph
        .compute()
        .edges_directed(idx, Direction::Outgoing)
        .filter_map(|e| match e.weight() {
            FlowEdge::Control { branch_index } => Some((*branch_index, NodeId::from(e.target()))),
            FlowEdge::Data { .. } => None,
        })
        .collect();
    targets.sort_by_key(|(idx, _)| idx.unwrap_or(0));
    targets.into_iter().map(|(_, n)| n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{ArithOp, ComputeOp};
    use crate::type_id::TypeId;
    use crate::types::{ConstValue, Visibility};

    #[test]
    fn single_block_function_has_no_successors() {
        let mut g = ProgramGraph::new("root");
        let module = g.modules.root_id();
        let f = g
            .add_function("f".into(), module, vec![], TypeId::I32, Visibility::Public)
            .unwrap();
        let c1 = g
            .add_core_op(ComputeOp::Const { value: ConstValue::I32(1) }, f)
            .unwrap();
        let ret = g.add_core_op(ComputeOp::Return, f).unwrap();
        g.add_control_edge(c1, ret, None).unwrap();
        g.add_data_edge(c1, ret, 0, 0, TypeId::I32).unwrap();
        g.get_function_mut(f).unwrap().entry_node = Some(c1);

        let cfg = build(&g, f).unwrap();
        assert_eq!(cfg.blocks.len(), 1);
        let entry = cfg.block(cfg.entry).unwrap();
        assert_eq!(entry.instructions, vec![c1, ret]);
        assert!(entry.successors.is_empty());
    }

    #[test]
    fn branch_produces_two_successor_blocks() {
        let mut g = ProgramGraph::new("root");
        let module = g.modules.root_id();
        let f = g
            .add_function("f".into(), module, vec![], TypeId::I32, Visibility::Public)
            .unwrap();
        let cond = g
            .add_core_op(ComputeOp::Const { value: ConstValue::Bool(true) }, f)
            .unwrap();
        let branch = g.add_core_op(ComputeOp::Branch, f).unwrap();
        g.add_control_edge(cond, branch, None).unwrap();

        let then_const = g
            .add_core_op(ComputeOp::Const { value: ConstValue::I32(1) }, f)
            .unwrap();
        let then_ret = g.add_core_op(ComputeOp::Return, f).unwrap();
        g.add_control_edge(branch, then_const, Some(0)).unwrap();
        g.add_control_edge(then_const, then_ret, None).unwrap();

        let else_const = g
            .add_core_op(ComputeOp::BinaryArith { op: ArithOp::Add }, f)
            .unwrap();
        let else_ret = g.add_core_op(ComputeOp::Return, f).unwrap();
        g.add_control_edge(branch, else_const, Some(1)).unwrap();
        g.add_control_edge(else_const, else_ret, None).unwrap();

        g.get_function_mut(f).unwrap().entry_node = Some(cond);

        let cfg = build(&g, f).unwrap();
        assert_eq!(cfg.blocks.len(), 3);
        let entry = cfg.block(cfg.entry).unwrap();
        assert_eq!(entry.successors.len(), 2);
        assert_eq!(entry.successors[0], BlockId(then_const));
        assert_eq!(entry.successors[1], BlockId(else_const));
    }
}
