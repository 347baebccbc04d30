//! Error taxonomy for the abstract interpreter.
//!
//! Every variant carries the [`NodeId`]/[`TypeId`] context needed to locate
//! the problem without a second graph query, in the same spirit as
//! `lmlang_core::error::CoreError`.

use lmlang_core::id::NodeId;
use lmlang_core::type_id::TypeId;
use serde::{Deserialize, Serialize};

/// Abnormal conditions raised while interpreting a program.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum AnalysisError {
    /// A precondition was violated: bit-width mismatch, out-of-bounds
    /// concrete access, or an operand type mismatch. Fatal.
    #[error("assertion failed at node {node}: {reason}")]
    AssertionFailed { node: NodeId, reason: String },

    /// A type the `Constructors` factory does not know how to build a
    /// domain for.
    #[error("unsupported type: {type_id}")]
    UnsupportedType { type_id: TypeId },

    /// An opcode with no transfer function for the operand domains it was
    /// given.
    #[error("unsupported opcode at node {node}")]
    UnsupportedOpcode { node: NodeId },

    /// A documented gap in the domain (e.g. `Bits::icmp`, `StringTrie`
    /// join of two non-bottom, non-top tries, `Pointer::meet`).
    #[error("not implemented at node {node}: {detail}")]
    NotImplemented { node: NodeId, detail: String },

    /// The driver's step budget was exhausted before reaching a fixed
    /// point; the caller still receives whatever summaries were computed.
    #[error("analysis budget exhausted after {steps_taken} steps")]
    BudgetExhausted { steps_taken: u64 },
}

/// Whether an [`AnalysisError`] should abort the whole analysis or be
/// recorded against one instruction (as `top`) and continued past.
impl AnalysisError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, AnalysisError::AssertionFailed { .. })
    }
}
