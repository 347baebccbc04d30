//! Memory block domain (spec §4.9): a byte-addressed map of abstract values
//! standing in for one allocation (a stack slot, a global, a heap block).
//!
//! The original analyzer keeps no byte-addressed block at all — `Memory`
//! wraps a single `Domain::Value` per allocation and dispatches `store`/
//! `load` straight to the pointee's own structural domain (`Structure`,
//! `Array`). This crate's IR exposes `GetElementPtr` offsets as a sequence
//! of symbolic element indices rather than raw byte counts, so `cells` is
//! keyed by the flattened element offset the pointer domain already
//! computes, not a literal byte address.

use std::collections::BTreeMap;

use lmlang_core::id::NodeId;
use lmlang_core::type_id::TypeId;

use crate::error::AnalysisError;
use crate::value::AbstractValue;

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryBlock {
    pub cells: BTreeMap<u64, AbstractValue>,
    pub element_type: TypeId,
}

impl MemoryBlock {
    pub fn new(element_type: TypeId, initial: AbstractValue) -> MemoryBlock {
        let mut cells = BTreeMap::new();
        cells.insert(0, initial);
        MemoryBlock { cells, element_type }
    }

    /// `strong`: overwrite the addressed cell outright (the pointer domain
    /// has proven exactly one live target). Otherwise join into it, leaving
    /// every other cell untouched either way.
    pub fn store(
        &mut self,
        offset: u64,
        value: &AbstractValue,
        strong: bool,
        node: NodeId,
    ) -> Result<(), AnalysisError> {
        match self.cells.get_mut(&offset) {
            Some(cell) => {
                if strong {
                    *cell = value.clone();
                    Ok(())
                } else {
                    cell.join(value, node)
                }
            }
            None => {
                self.cells.insert(offset, value.clone());
                Ok(())
            }
        }
    }

    /// Reads the cell at `offset`. `width` selects how many consecutive
    /// element slots the read spans; spanning cells are joined together,
    /// mirroring the summarizing behavior a byte-precise read would need
    /// once multiple elements alias the same block.
    pub fn load(&self, offset: u64, width: u64, node: NodeId) -> Result<AbstractValue, AnalysisError> {
        let mut result: Option<AbstractValue> = None;
        for i in offset..offset.saturating_add(width.max(1)) {
            if let Some(cell) = self.cells.get(&i) {
                match &mut result {
                    Some(acc) => acc.join(cell, node)?,
                    None => result = Some(cell.clone()),
                }
            }
        }
        result.ok_or(AnalysisError::AssertionFailed {
            node,
            reason: "memory load found no initialized cell in range".into(),
        })
    }

    pub fn join(&mut self, other: &MemoryBlock, node: NodeId) -> Result<(), AnalysisError> {
        for (offset, value) in &other.cells {
            match self.cells.get_mut(offset) {
                Some(cell) => cell.join(value, node)?,
                None => {
                    self.cells.insert(*offset, value.clone());
                }
            }
        }
        Ok(())
    }

    /// Same shape as `join` but widens each shared cell, used once a block
    /// has been revisited past the widening threshold.
    pub fn widen(&mut self, other: &MemoryBlock, node: NodeId) -> Result<(), AnalysisError> {
        for (offset, value) in &other.cells {
            match self.cells.get_mut(offset) {
                Some(cell) => cell.widen(value, node)?,
                None => {
                    self.cells.insert(*offset, value.clone());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integer::{Container, DomainMask};

    fn scalar(v: u64) -> AbstractValue {
        AbstractValue::Integer(Container::singleton(32, v, DomainMask::default(), 40))
    }

    #[test]
    fn strong_store_overwrites_cell() {
        let mut block = MemoryBlock::new(TypeId::I32, scalar(1));
        block.store(0, &scalar(9), true, NodeId(0)).unwrap();
        assert_eq!(block.cells[&0], scalar(9));
    }

    #[test]
    fn weak_store_joins_cell() {
        let mut block = MemoryBlock::new(TypeId::I32, scalar(1));
        block.store(0, &scalar(9), false, NodeId(0)).unwrap();
        assert!(!block.cells[&0].is_constant());
    }

    #[test]
    fn load_joins_spanning_cells() {
        let mut block = MemoryBlock::new(TypeId::I32, scalar(1));
        block.store(1, &scalar(2), true, NodeId(0)).unwrap();
        let loaded = block.load(0, 2, NodeId(0)).unwrap();
        assert!(!loaded.is_constant());
    }
}
