//! Abstract machine state threaded through the per-function interpreter
//! (spec §4.10) and the inter-function driver (§4.11).
//!
//! Ground: the original's `State` class keeps exactly this split — SSA
//! locals, function-local memory blocks, and global memory blocks — so that
//! a `Call`'s `Return` can tell which blocks are caller-visible (globals and
//! blocks not owned by the callee) without walking the whole heap.

use std::collections::HashMap;

use lmlang_core::id::NodeId;

use crate::error::AnalysisError;
use crate::memory::MemoryBlock;
use crate::value::AbstractValue;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct State {
    pub locals: HashMap<NodeId, AbstractValue>,
    pub function_blocks: HashMap<NodeId, MemoryBlock>,
    pub global_blocks: HashMap<NodeId, MemoryBlock>,
    pub returned_value: Option<AbstractValue>,
}

impl State {
    pub fn new() -> State {
        State::default()
    }

    pub fn get_local(&self, node: NodeId) -> Option<&AbstractValue> {
        self.locals.get(&node)
    }

    pub fn set_local(&mut self, node: NodeId, value: AbstractValue) {
        self.locals.insert(node, value);
    }

    pub fn has_global_block(&self, place: NodeId) -> bool {
        self.global_blocks.contains_key(&place)
    }

    pub fn add_global_block(&mut self, place: NodeId, block: MemoryBlock) {
        self.global_blocks.insert(place, block);
    }

    pub fn add_function_block(&mut self, place: NodeId, block: MemoryBlock) {
        self.function_blocks.insert(place, block);
    }

    pub fn find_block(&self, place: NodeId) -> Option<&MemoryBlock> {
        self.global_blocks.get(&place).or_else(|| self.function_blocks.get(&place))
    }

    pub fn find_block_mut(&mut self, place: NodeId) -> Option<&mut MemoryBlock> {
        if self.global_blocks.contains_key(&place) {
            self.global_blocks.get_mut(&place)
        } else {
            self.function_blocks.get_mut(&place)
        }
    }

    /// Pointwise join of every component: locals by key union, blocks by
    /// key union with per-block `MemoryBlock::join`, returned value joined
    /// if both sides have one (a function that only returns on some paths
    /// keeps the other side's value, matching a conditional `Return`).
    pub fn join(&mut self, other: &State, node: NodeId) -> Result<(), AnalysisError> {
        for (id, value) in &other.locals {
            match self.locals.get_mut(id) {
                Some(existing) => existing.join(value, node)?,
                None => {
                    self.locals.insert(*id, value.clone());
                }
            }
        }
        join_blocks(&mut self.function_blocks, &other.function_blocks, node)?;
        join_blocks(&mut self.global_blocks, &other.global_blocks, node)?;
        self.returned_value = match (self.returned_value.take(), &other.returned_value) {
            (Some(mut a), Some(b)) => {
                a.join(b, node)?;
                Some(a)
            }
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b.clone()),
            (None, None) => None,
        };
        Ok(())
    }

    /// Same shape as `join`, used once a block has been revisited past the
    /// widening threshold so the fixed-point loop terminates on ascending
    /// chains (unbounded integer sets, growing memory cells).
    pub fn widen(&mut self, other: &State, node: NodeId) -> Result<(), AnalysisError> {
        for (id, value) in &other.locals {
            match self.locals.get_mut(id) {
                Some(existing) => existing.widen(value, node)?,
                None => {
                    self.locals.insert(*id, value.clone());
                }
            }
        }
        widen_blocks(&mut self.function_blocks, &other.function_blocks, node)?;
        widen_blocks(&mut self.global_blocks, &other.global_blocks, node)?;
        self.returned_value = match (self.returned_value.take(), &other.returned_value) {
            (Some(mut a), Some(b)) => {
                a.widen(b, node)?;
                Some(a)
            }
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b.clone()),
            (None, None) => None,
        };
        Ok(())
    }
}

fn join_blocks(
    into: &mut HashMap<NodeId, MemoryBlock>,
    from: &HashMap<NodeId, MemoryBlock>,
    node: NodeId,
) -> Result<(), AnalysisError> {
    for (place, block) in from {
        match into.get_mut(place) {
            Some(existing) => existing.join(block, node)?,
            None => {
                into.insert(*place, block.clone());
            }
        }
    }
    Ok(())
}

fn widen_blocks(
    into: &mut HashMap<NodeId, MemoryBlock>,
    from: &HashMap<NodeId, MemoryBlock>,
    node: NodeId,
) -> Result<(), AnalysisError> {
    for (place, block) in from {
        match into.get_mut(place) {
            Some(existing) => existing.widen(block, node)?,
            None => {
                into.insert(*place, block.clone());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integer::{Container, DomainMask};
    use lmlang_core::type_id::TypeId;

    fn scalar(v: u64) -> AbstractValue {
        AbstractValue::Integer(Container::singleton(32, v, DomainMask::default(), 40))
    }

    #[test]
    fn join_unions_locals() {
        let mut a = State::new();
        a.set_local(NodeId(1), scalar(1));
        let mut b = State::new();
        b.set_local(NodeId(2), scalar(2));
        a.join(&b, NodeId(0)).unwrap();
        assert_eq!(a.locals.len(), 2);
    }

    #[test]
    fn join_merges_shared_local() {
        let mut a = State::new();
        a.set_local(NodeId(1), scalar(1));
        let mut b = State::new();
        b.set_local(NodeId(1), scalar(2));
        a.join(&b, NodeId(0)).unwrap();
        assert!(!a.locals[&NodeId(1)].is_constant());
    }

    #[test]
    fn find_block_prefers_global_over_function() {
        let mut s = State::new();
        s.add_function_block(NodeId(1), MemoryBlock::new(TypeId::I32, scalar(1)));
        s.add_global_block(NodeId(1), MemoryBlock::new(TypeId::I32, scalar(2)));
        assert_eq!(s.find_block(NodeId(1)).unwrap().cells[&0], scalar(2));
    }
}
