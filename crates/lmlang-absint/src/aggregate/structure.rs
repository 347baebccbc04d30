//! Struct domain: an ordered vector of member values (spec §4.7).
//!
//! Grounded on `original_source/lib/Structure.h`: `Structure` is just
//! `std::vector<Value*> mMembers`, merged member-wise. No bounds
//! assertion here (unlike the array domains) since field count is fixed
//! by the struct's type.

use crate::error::AnalysisError;
use crate::value::AbstractValue;

#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
    pub fields: Vec<AbstractValue>,
}

impl StructValue {
    pub fn new(fields: Vec<AbstractValue>) -> StructValue {
        StructValue { fields }
    }

    pub fn is_bottom(&self) -> bool {
        self.fields.iter().all(AbstractValue::is_bottom)
    }

    pub fn is_top(&self) -> bool {
        !self.fields.is_empty() && self.fields.iter().all(AbstractValue::is_top)
    }

    /// Ground: `Structure::getItems` — a field is addressed by an
    /// already-resolved index (GEP resolves symbolic struct offsets to a
    /// concrete field index before reaching here, since fields may have
    /// different types).
    pub fn get_field(&self, index: usize) -> Option<&AbstractValue> {
        self.fields.get(index)
    }

    pub fn get_field_mut(&mut self, index: usize) -> Option<&mut AbstractValue> {
        self.fields.get_mut(index)
    }

    /// Ground: `Structure::merge` — member-wise merge.
    pub fn join(&mut self, other: &StructValue, node: lmlang_core::id::NodeId) -> Result<(), AnalysisError> {
        if self.fields.len() != other.fields.len() {
            return Err(AnalysisError::AssertionFailed {
                node,
                reason: "struct merge requires equal field counts".into(),
            });
        }
        for (a, b) in self.fields.iter_mut().zip(other.fields.iter()) {
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
    fn join_merges_each_field_independently() {
        let mut a = StructValue::new(vec![scalar(1), scalar(2)]);
        let b = StructValue::new(vec![scalar(1), scalar(5)]);
        a.join(&b, lmlang_core::id::NodeId(0)).unwrap();
        assert!(!a.fields[1].is_constant());
    }

    #[test]
    fn mismatched_field_counts_is_an_error() {
        let mut a = StructValue::new(vec![scalar(1)]);
        let b = StructValue::new(vec![scalar(1), scalar(2)]);
        assert!(a.join(&b, lmlang_core::id::NodeId(0)).is_err());
    }
}
