//! Single-item (summarizing) array domain (spec §4.7).
//!
//! Grounded on `original_source/lib/ArraySingleItem.cpp`: one summary value
//! stands for every element, alongside a size. Every write joins into the
//! summary rather than overwriting it, and every access is bounds-checked
//! against `size`'s unsigned bounds (`assertOffsetFitsToArray`).

use crate::error::AnalysisError;
use crate::value::AbstractValue;
use lmlang_core::id::NodeId;

#[derive(Debug, Clone, PartialEq)]
pub struct SingleItemArray {
    pub summary: Box<AbstractValue>,
    pub size: Box<AbstractValue>,
}

impl SingleItemArray {
    pub fn new(summary: AbstractValue, size: AbstractValue) -> SingleItemArray {
        SingleItemArray { summary: Box::new(summary), size: Box::new(size) }
    }

    pub fn is_bottom(&self) -> bool {
        self.summary.is_bottom()
    }

    pub fn is_top(&self) -> bool {
        self.summary.is_top()
    }

    /// Ground: `assertOffsetFitsToArray(offset, size)`. Fatal (matches the
    /// original's `CANAL_ASSERT_MSG`) unless the size's unsigned maximum
    /// is known and the offset provably fits under it.
    fn assert_offset_fits(&self, offset: u64, node: NodeId) -> Result<(), AnalysisError> {
        let max = self.size.unsigned_max().ok_or_else(|| AnalysisError::AssertionFailed {
            node,
            reason: "array size must be a known value".into(),
        })?;
        if offset >= max {
            return Err(AnalysisError::AssertionFailed { node, reason: "offset out of bounds".into() });
        }
        Ok(())
    }

    pub fn get_item(&self, offset: u64, node: NodeId) -> Result<&AbstractValue, AnalysisError> {
        self.assert_offset_fits(offset, node)?;
        Ok(&self.summary)
    }

    /// Ground: `SingleItem::setItem` — always merges, never overwrites.
    pub fn set_item(&mut self, offset: u64, value: &AbstractValue, node: NodeId) -> Result<(), AnalysisError> {
        self.assert_offset_fits(offset, node)?;
        self.summary.join(value, node)
    }

    /// Ground: `SingleItem::merge` — both operands must already be
    /// initialized.
    pub fn join(&mut self, other: &SingleItemArray, node: NodeId) -> Result<(), AnalysisError> {
        self.summary.join(&other.summary, node)?;
        self.size.join(&other.size, node)
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
    fn set_item_merges_into_summary_rather_than_overwriting() {
        let mut arr = SingleItemArray::new(scalar(1), scalar(10));
        arr.set_item(3, &scalar(2), NodeId(0)).unwrap();
        assert!(!arr.summary.is_constant());
    }

    #[test]
    fn out_of_bounds_offset_is_an_error() {
        let arr = SingleItemArray::new(scalar(1), scalar(4));
        assert!(arr.get_item(10, NodeId(0)).is_err());
    }
}
