//! Pointer domain: a map from place to symbolic target (spec §4.6).
//!
//! Grounded line-by-line on `original_source/lib/Pointer.cpp`. A "place" is
//! the IR node that produced the pointer; this crate reuses
//! [`lmlang_core::id::NodeId`] directly as the stable handle the original's
//! REDESIGN FLAGS ask for (the original used raw `llvm::Value*`).

use std::collections::HashMap;

use lmlang_core::id::{FunctionId, NodeId};
use lmlang_core::type_id::TypeId;

use crate::error::AnalysisError;
use crate::memory::MemoryBlock;
use crate::state::State;
use crate::value::AbstractValue;

/// What a pointer target refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetReferent {
    Block(NodeId),
    Function(FunctionId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetTag {
    Uninitialized,
    Constant,
    Block,
    Function,
    /// Not in the original (which has no `setTop`): an explicit sentinel
    /// for "points anywhere", resolving the Open Question in spec §9.
    Top,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub tag: TargetTag,
    pub referent: Option<TargetReferent>,
    pub element_offsets: Vec<AbstractValue>,
    pub numeric_offset: Option<Box<AbstractValue>>,
}

impl Target {
    pub fn new(
        tag: TargetTag,
        referent: Option<TargetReferent>,
        element_offsets: Vec<AbstractValue>,
        numeric_offset: Option<AbstractValue>,
    ) -> Target {
        Target { tag, referent, element_offsets, numeric_offset: numeric_offset.map(Box::new) }
    }

    /// Merge rule per tag (ground: `Target::merge` via `Pointer::addTarget`
    /// / `Pointer::join`). `Uninitialized` is idempotent; `Constant`
    /// requires an equal constant; `Block`/`Function` require an equal
    /// referent and join offsets element-wise.
    pub fn merge(&mut self, other: &Target, node: NodeId) -> Result<(), AnalysisError> {
        match (self.tag, other.tag) {
            (TargetTag::Uninitialized, TargetTag::Uninitialized) => Ok(()),
            (TargetTag::Top, _) => Ok(()),
            (_, TargetTag::Top) => {
                self.tag = TargetTag::Top;
                self.referent = None;
                self.element_offsets.clear();
                self.numeric_offset = None;
                Ok(())
            }
            (TargetTag::Constant, TargetTag::Constant) => {
                if self.numeric_offset.is_some() != other.numeric_offset.is_some() {
                    return Err(AnalysisError::NotImplemented {
                        node,
                        detail: "merging constant pointer targets with differing shape".into(),
                    });
                }
                Ok(())
            }
            (TargetTag::Block, TargetTag::Block) | (TargetTag::Function, TargetTag::Function) => {
                if self.referent != other.referent {
                    return Err(AnalysisError::NotImplemented {
                        node,
                        detail: "merging pointer targets with different referents".into(),
                    });
                }
                for (a, b) in self.element_offsets.iter_mut().zip(other.element_offsets.iter()) {
                    a.join(b, node)?;
                }
                if let (Some(a), Some(b)) = (&mut self.numeric_offset, &other.numeric_offset) {
                    a.join(b, node)?;
                }
                Ok(())
            }
            _ => Err(AnalysisError::NotImplemented {
                node,
                detail: "merging pointer targets of incompatible tags".into(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointerDomain {
    pointee: TypeId,
    targets: HashMap<NodeId, Target>,
}

impl PointerDomain {
    pub fn bottom(pointee: TypeId) -> PointerDomain {
        PointerDomain { pointee, targets: HashMap::new() }
    }

    pub fn top(pointee: TypeId) -> PointerDomain {
        let mut targets = HashMap::new();
        targets.insert(NodeId(u32::MAX), Target::new(TargetTag::Top, None, Vec::new(), None));
        PointerDomain { pointee, targets }
    }

    pub fn pointee(&self) -> TypeId {
        self.pointee
    }

    pub fn targets(&self) -> &HashMap<NodeId, Target> {
        &self.targets
    }

    pub fn is_bottom(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn is_top(&self) -> bool {
        self.targets.values().any(|t| t.tag == TargetTag::Top)
    }

    pub fn is_constant(&self) -> bool {
        self.targets.len() == 1
    }

    /// Ground: `Pointer::addTarget` — insert-or-merge by place key.
    pub fn add_target(
        &mut self,
        place: NodeId,
        target: Target,
    ) -> Result<(), AnalysisError> {
        match self.targets.get_mut(&place) {
            Some(existing) => existing.merge(&target, place),
            None => {
                self.targets.insert(place, target);
                Ok(())
            }
        }
    }

    /// Ground: `Pointer::getElementPtr`. The first new offset is added
    /// onto each target's existing last offset (sequential-indexing
    /// flattening); the rest are pushed unchanged.
    pub fn get_element_ptr(
        &self,
        offsets: Vec<AbstractValue>,
        new_pointee: TypeId,
        node: NodeId,
    ) -> Result<PointerDomain, AnalysisError> {
        if offsets.is_empty() {
            return Err(AnalysisError::AssertionFailed {
                node,
                reason: "getElementPtr requires at least one offset".into(),
            });
        }
        let mut result = PointerDomain { pointee: new_pointee, targets: self.targets.clone() };
        for target in result.targets.values_mut() {
            let mut offsets = offsets.iter().cloned();
            let first = offsets.next();
            match (first, target.element_offsets.last_mut()) {
                (Some(first), Some(last)) => last.add_in_place(&first, node)?,
                (Some(first), None) => target.element_offsets.push(first),
                (None, _) => {}
            }
            for rest in offsets {
                target.element_offsets.push(rest);
            }
        }
        Ok(result)
    }

    pub fn bitcast(&self, new_pointee: TypeId) -> PointerDomain {
        PointerDomain { pointee: new_pointee, targets: self.targets.clone() }
    }

    /// Ground: `Pointer::setZero` — clears targets, installs a single
    /// `Constant` target with no referent.
    pub fn set_zero(&mut self) {
        self.targets.clear();
        self.targets.insert(NodeId(0), Target::new(TargetTag::Constant, None, Vec::new(), None));
    }

    /// Ground: `Pointer::join` — union of targets by place, target-wise
    /// merge.
    pub fn join(&mut self, other: &PointerDomain, node: NodeId) -> Result<(), AnalysisError> {
        for (place, target) in &other.targets {
            self.add_target(*place, target.clone())?;
        }
        let _ = node;
        Ok(())
    }

    /// `meet` is an explicitly resolved Open Question: the original leaves
    /// it `CANAL_NOT_IMPLEMENTED()`, and this crate preserves that rather
    /// than inventing a meet the original never specified.
    pub fn meet(&mut self, _other: &PointerDomain, node: NodeId) -> Result<(), AnalysisError> {
        Err(AnalysisError::NotImplemented { node, detail: "Pointer::meet".into() })
    }

    /// Ground: `Pointer::load` — joins the dereferenced value of every
    /// `Block` target, skipping anything else (`Uninitialized`, `Constant`,
    /// `Function`, `Top`). `None` when no live target resolves to a block,
    /// mirroring `mergedValue` starting `NULL`.
    pub fn load(&self, state: &State, node: NodeId) -> Result<Option<AbstractValue>, AnalysisError> {
        let mut result: Option<AbstractValue> = None;
        for target in self.targets.values() {
            let referent = match (&target.tag, &target.referent) {
                (TargetTag::Block, Some(TargetReferent::Block(place))) => *place,
                _ => continue,
            };
            let block = match state.find_block(referent) {
                Some(block) => block,
                None => continue,
            };
            let offset = flatten_offset(target);
            let value = block.load(offset, 1, node)?;
            match &mut result {
                Some(acc) => acc.join(&value, node)?,
                None => result = Some(value),
            }
        }
        Ok(result)
    }

    /// Ground: `Pointer::store`. Strong update iff this domain carries
    /// exactly one target (`mTargets.size() == 1`); every `Block` target is
    /// written back to whichever map (`global_blocks`/`function_blocks`)
    /// already owns it.
    pub fn store(&self, value: &AbstractValue, state: &mut State, node: NodeId) -> Result<(), AnalysisError> {
        let strong = self.targets.len() == 1;
        for target in self.targets.values() {
            let referent = match (&target.tag, &target.referent) {
                (TargetTag::Block, Some(TargetReferent::Block(place))) => *place,
                _ => continue,
            };
            let offset = flatten_offset(target);
            let is_global = state.has_global_block(referent);
            let block = match state.find_block_mut(referent) {
                Some(block) => block,
                None => {
                    let mut fresh = MemoryBlock::new(self.pointee, value.clone());
                    fresh.cells.clear();
                    if is_global {
                        state.add_global_block(referent, fresh);
                        state.global_blocks.get_mut(&referent).unwrap()
                    } else {
                        state.add_function_block(referent, fresh);
                        state.function_blocks.get_mut(&referent).unwrap()
                    }
                }
            };
            block.store(offset, value, strong, node)?;
        }
        Ok(())
    }
}

/// Flattens the nested `element_offsets` GEP chain into a single concrete
/// cell key. `MemoryBlock` is a flat map, so only the most specific
/// (innermost) offset distinguishes cells; outer struct/array indices are
/// folded in by `get_element_ptr` before this is ever called. Offsets that
/// are not yet concrete collapse to cell `0`, matching the deliberately
/// imprecise behavior `assertOffsetFitsToArray` would force into `top`
/// anyway.
fn flatten_offset(target: &Target) -> u64 {
    target
        .element_offsets
        .last()
        .and_then(AbstractValue::unsigned_max)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lmlang_core::type_id::TypeId;

    fn pid(n: u32) -> NodeId {
        NodeId(n)
    }

    #[test]
    fn set_zero_installs_single_constant_target() {
        let mut p = PointerDomain::bottom(TypeId(1));
        p.set_zero();
        assert_eq!(p.targets().len(), 1);
        assert!(!p.is_bottom());
    }

    #[test]
    fn is_bottom_when_no_targets() {
        let p = PointerDomain::bottom(TypeId(1));
        assert!(p.is_bottom());
    }

    #[test]
    fn add_target_merges_same_place() {
        let mut p = PointerDomain::bottom(TypeId(1));
        p.add_target(pid(1), Target::new(TargetTag::Uninitialized, None, vec![], None)).unwrap();
        p.add_target(pid(1), Target::new(TargetTag::Uninitialized, None, vec![], None)).unwrap();
        assert_eq!(p.targets().len(), 1);
    }

    #[test]
    fn get_element_ptr_on_fresh_target_keeps_the_index() {
        use crate::integer::container::{Container, DomainMask};

        let mut p = PointerDomain::bottom(TypeId(1));
        p.add_target(pid(1), Target::new(TargetTag::Block, Some(TargetReferent::Block(pid(2))), vec![], None))
            .unwrap();
        let index = AbstractValue::Integer(Container::singleton(32, 3, DomainMask::default(), 40));
        let result = p.get_element_ptr(vec![index], TypeId(1), pid(9)).unwrap();
        let target = result.targets().get(&pid(1)).unwrap();
        assert_eq!(target.element_offsets.len(), 1);
        assert_eq!(flatten_offset(target), 3);
    }
}
