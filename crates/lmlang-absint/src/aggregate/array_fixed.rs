//! Fixed-size array domain (spec §4.7): `N` independently-tracked slots.
//!
//! The original pack only keeps the summarizing `Array::SingleItem`; this
//! domain is the precise counterpart `ArraySingleItem.cpp` contrasts
//! itself against ("a single item representing all the elements of the
//! array" implies a sibling that does not summarize). Bounds checking
//! reuses the same `assertOffsetFitsToArray` discipline.

use crate::error::AnalysisError;
use crate::value::AbstractValue;
use lmlang_core::id::NodeId;

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayFixed {
    pub elements: Vec<AbstractValue>,
}

impl ArrayFixed {
    pub fn new(elements: Vec<AbstractValue>) -> ArrayFixed {
        ArrayFixed { elements }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn is_bottom(&self) -> bool {
        self.elements.iter().all(AbstractValue::is_bottom)
    }

    pub fn is_top(&self) -> bool {
        !self.elements.is_empty() && self.elements.iter().all(AbstractValue::is_top)
    }

    fn assert_in_bounds(&self, offset: u64, node: NodeId) -> Result<usize, AnalysisError> {
        let index = usize::try_from(offset)
            .map_err(|_| AnalysisError::AssertionFailed { node, reason: "offset does not fit in usize".into() })?;
        if index >= self.elements.len() {
            return Err(AnalysisError::AssertionFailed { node, reason: "offset out of bounds".into() });
        }
        Ok(index)
    }

    pub fn get_item(&self, offset: u64, node: NodeId) -> Result<&AbstractValue, AnalysisError> {
        let index = self.assert_in_bounds(offset, node)?;
        Ok(&self.elements[index])
    }

    /// Strong update: a known element is overwritten (not merged), same as
    /// `SingleItem` only once offsets are distinguishable. A caller that
    /// cannot prove the offset exact should use a weak merge instead.
    pub fn set_item(&mut self, offset: u64, value: AbstractValue, node: NodeId) -> Result<(), AnalysisError> {
        let index = self.assert_in_bounds(offset, node)?;
        self.elements[index] = value;
        Ok(())
    }

    pub fn join(&mut self, other: &ArrayFixed, node: NodeId) -> Result<(), AnalysisError> {
        if self.elements.len() != other.elements.len() {
            return Err(AnalysisError::AssertionFailed {
                node,
                reason: "array merge requires equal length".into(),
            });
        }
        for (a, b) in self.elements.iter_mut().zip(other.elements.iter()) {
            a.join(b, node)?;
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
    fn set_item_is_a_strong_update() {
        let mut arr = ArrayFixed::new(vec![scalar(1), scalar(2)]);
        arr.set_item(0, scalar(9), NodeId(0)).unwrap();
        assert_eq!(arr.elements[0], scalar(9));
    }

    #[test]
    fn out_of_bounds_is_an_error() {
        let arr = ArrayFixed::new(vec![scalar(1)]);
        assert!(arr.get_item(5, NodeId(0)).is_err());
    }
}
