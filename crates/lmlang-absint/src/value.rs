//! [`AbstractValue`]: the tagged sum type dispatching to every domain.
//!
//! Ground: spec §9's REDESIGN FLAG replaces the original's `Value*` +
//! `dynamic_cast` dispatch (unavoidable in C++ without generics over a
//! closed set) with a single enum matched exhaustively — adding a domain
//! means adding a variant and fixing every non-exhaustive match, rather
//! than hunting down every `dynamic_cast` call site.

use lmlang_core::id::NodeId;

use crate::aggregate::{ArrayFixed, SingleItemArray, StringTrie, StructValue};
use crate::error::AnalysisError;
use crate::float::FloatInterval;
use crate::integer::Container;
use crate::pointer::PointerDomain;

#[derive(Debug, Clone, PartialEq)]
pub enum AbstractValue {
    Integer(Container),
    Float(FloatInterval),
    Pointer(PointerDomain),
    Array(ArrayFixed),
    ArraySingle(SingleItemArray),
    StringTrie(StringTrie),
    Struct(StructValue),
}

/// Two values of mismatched domain kind being merged or compared is a
/// logic error upstream (the type checker guarantees every SSA value's
/// domain kind is stable at a given program point), not a data-dependent
/// condition — it is reported the same way the original's failed
/// `dynamic_cast` + `CANAL_ASSERT` would be.
fn kind_mismatch(node: NodeId) -> AnalysisError {
    AnalysisError::AssertionFailed { node, reason: "abstract value kind mismatch".into() }
}

impl AbstractValue {
    pub fn is_bottom(&self) -> bool {
        match self {
            AbstractValue::Integer(v) => v.is_bottom(),
            AbstractValue::Float(v) => v.is_bottom(),
            AbstractValue::Pointer(v) => v.is_bottom(),
            AbstractValue::Array(v) => v.is_bottom(),
            AbstractValue::ArraySingle(v) => v.is_bottom(),
            AbstractValue::StringTrie(v) => v.is_bottom(),
            AbstractValue::Struct(v) => v.is_bottom(),
        }
    }

    pub fn is_top(&self) -> bool {
        match self {
            AbstractValue::Integer(v) => v.is_top(),
            AbstractValue::Float(v) => v.is_top(),
            AbstractValue::Pointer(v) => v.is_top(),
            AbstractValue::Array(v) => v.is_top(),
            AbstractValue::ArraySingle(v) => v.is_top(),
            AbstractValue::StringTrie(v) => v.is_top(),
            AbstractValue::Struct(v) => v.is_top(),
        }
    }

    pub fn is_constant(&self) -> bool {
        match self {
            AbstractValue::Integer(v) => v.is_constant(),
            AbstractValue::Float(_) => false,
            AbstractValue::Pointer(v) => v.is_constant(),
            _ => false,
        }
    }

    /// Best known unsigned upper bound, used by the array domains' bounds
    /// checks. Only integers carry one.
    pub fn unsigned_max(&self) -> Option<u64> {
        match self {
            AbstractValue::Integer(v) => v.unsigned_bounds().map(|(_, hi)| hi),
            _ => None,
        }
    }

    pub fn join(&mut self, other: &AbstractValue, node: NodeId) -> Result<(), AnalysisError> {
        match (self, other) {
            (AbstractValue::Integer(a), AbstractValue::Integer(b)) => {
                a.join(b);
                Ok(())
            }
            (AbstractValue::Float(a), AbstractValue::Float(b)) => {
                a.join(b);
                Ok(())
            }
            (AbstractValue::Pointer(a), AbstractValue::Pointer(b)) => a.join(b, node),
            (AbstractValue::Array(a), AbstractValue::Array(b)) => a.join(b, node),
            (AbstractValue::ArraySingle(a), AbstractValue::ArraySingle(b)) => a.join(b, node),
            (AbstractValue::StringTrie(a), AbstractValue::StringTrie(b)) => a.join(b, node),
            (AbstractValue::Struct(a), AbstractValue::Struct(b)) => a.join(b, node),
            _ => Err(kind_mismatch(node)),
        }
    }

    pub fn meet(&mut self, other: &AbstractValue, node: NodeId) -> Result<(), AnalysisError> {
        match (self, other) {
            (AbstractValue::Integer(a), AbstractValue::Integer(b)) => {
                a.meet(b);
                Ok(())
            }
            (AbstractValue::Float(a), AbstractValue::Float(b)) => {
                a.meet(b);
                Ok(())
            }
            (AbstractValue::Pointer(a), AbstractValue::Pointer(b)) => a.meet(b, node),
            (AbstractValue::StringTrie(a), AbstractValue::StringTrie(b)) => a.meet(b, node),
            _ => Err(kind_mismatch(node)),
        }
    }

    pub fn widen(&mut self, other: &AbstractValue, node: NodeId) -> Result<(), AnalysisError> {
        match (self, other) {
            (AbstractValue::Integer(a), AbstractValue::Integer(b)) => {
                a.widen(b);
                Ok(())
            }
            (AbstractValue::Float(a), AbstractValue::Float(b)) => {
                a.widen(b);
                Ok(())
            }
            // Every other domain either has no ascending chains worth
            // widening (pointers, aggregates summarize structurally) or
            // widens by the same rule as `join`.
            (a, b) => a.join(b, node),
        }
    }

    /// In-place scalar addition, used by `getElementPtr` to fold a new
    /// offset onto a target's existing trailing offset.
    pub fn add_in_place(&mut self, other: &AbstractValue, node: NodeId) -> Result<(), AnalysisError> {
        match (self, other) {
            (AbstractValue::Integer(a), AbstractValue::Integer(b)) => {
                *a = a.add(b);
                Ok(())
            }
            _ => Err(kind_mismatch(node)),
        }
    }

    pub fn accuracy(&self) -> f32 {
        match self {
            AbstractValue::Integer(v) => v.accuracy(),
            AbstractValue::Float(_) => {
                if self.is_top() {
                    0.0
                } else {
                    1.0
                }
            }
            _ => {
                if self.is_top() {
                    0.0
                } else if self.is_bottom() {
                    1.0
                } else {
                    0.5
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integer::DomainMask;

    fn scalar(v: u64) -> AbstractValue {
        AbstractValue::Integer(Container::singleton(32, v, DomainMask::default(), 40))
    }

    #[test]
    fn join_of_same_kind_succeeds() {
        let mut a = scalar(1);
        let b = scalar(2);
        a.join(&b, NodeId(0)).unwrap();
        assert!(!a.is_constant());
    }

    #[test]
    fn join_of_mismatched_kinds_is_an_error() {
        let mut a = scalar(1);
        let b = AbstractValue::Float(FloatInterval::singleton(crate::float::FloatFormat::F64, 1.0));
        assert!(a.join(&b, NodeId(0)).is_err());
    }

    #[test]
    fn add_in_place_accumulates_gep_offsets() {
        let mut a = scalar(1);
        let b = scalar(2);
        a.add_in_place(&b, NodeId(0)).unwrap();
        assert_eq!(a, scalar(3));
    }
}
