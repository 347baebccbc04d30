//! Comparison predicates used by every domain's `icmp`/`fcmp` transfer.
//!
//! The IR's own [`lmlang_core::ops::CmpOp`] has no signed/unsigned split:
//! every scalar integer type in this language (`I8`..`I64`) is signed, so
//! the surface syntax never needs to pick a sign. The abstract domains still
//! have to reason about the *bit pattern* both ways (pointer offsets and GEP
//! indices are unsigned 64-bit regardless of the source language's integer
//! types, and the interval domain tracks both halves independently per the
//! product design), so this crate's `Predicate` is the full icmp predicate
//! set. [`Predicate::from_cmp_op`] maps the IR's generic predicate to its
//! signed interpretation, the only one surface syntax can express.

use lmlang_core::ops::CmpOp;

/// Integer comparison predicate, signed and unsigned variants both named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    Eq,
    Ne,
    SLt,
    SLe,
    SGt,
    SGe,
    ULt,
    ULe,
    UGt,
    UGe,
}

impl Predicate {
    /// The IR's comparison op carries no sign; this language's scalar
    /// integer types are all signed, so `Lt`/`Le`/`Gt`/`Ge` are interpreted
    /// as their signed variants.
    pub fn from_cmp_op(op: CmpOp) -> Predicate {
        match op {
            CmpOp::Eq => Predicate::Eq,
            CmpOp::Ne => Predicate::Ne,
            CmpOp::Lt => Predicate::SLt,
            CmpOp::Le => Predicate::SLe,
            CmpOp::Gt => Predicate::SGt,
            CmpOp::Ge => Predicate::SGe,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(self, Predicate::SLt | Predicate::SLe | Predicate::SGt | Predicate::SGe)
    }

    pub fn is_unsigned(self) -> bool {
        matches!(self, Predicate::ULt | Predicate::ULe | Predicate::UGt | Predicate::UGe)
    }
}

/// Float comparison predicate. Ordered predicates are false whenever either
/// operand might be NaN; unordered predicates are true in that case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatPredicate {
    OEq,
    ONe,
    OLt,
    OLe,
    OGt,
    OGe,
    UEq,
    UNe,
    ULt,
    ULe,
    UGt,
    UGe,
}

impl FloatPredicate {
    pub fn is_ordered(self) -> bool {
        matches!(
            self,
            FloatPredicate::OEq
                | FloatPredicate::ONe
                | FloatPredicate::OLt
                | FloatPredicate::OLe
                | FloatPredicate::OGt
                | FloatPredicate::OGe
        )
    }
}

/// Four-valued result of a comparison between two abstract values: the
/// comparison may be known to always hold, always fail, be data-dependent,
/// or (for floats) be unordered because one side might be NaN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FourValued {
    MustFalse,
    MustTrue,
    Unknown,
    Unordered,
}

impl FourValued {
    /// Lower a four-valued comparison result into a 1-bit `IntSet`-shaped
    /// truth value: `MustTrue` -> `{1}`, `MustFalse` -> `{0}`, otherwise
    /// both bits are possible (`{0,1}`, i.e. top at width 1). `Unordered`
    /// collapses the receiving domain to bottom instead (handled by the
    /// caller, not representable as a truth set).
    pub fn to_bits(self) -> Option<&'static [u64]> {
        match self {
            FourValued::MustTrue => Some(&[1]),
            FourValued::MustFalse => Some(&[0]),
            FourValued::Unknown => Some(&[0, 1]),
            FourValued::Unordered => None,
        }
    }
}
