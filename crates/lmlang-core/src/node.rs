//! Node wrappers for both graph layers.
//!
//! The computational graph uses [`ComputeNode`] to wrap operations with function
//! ownership metadata (flat graph with logical function boundaries).
//!
//! The semantic graph uses [`SemanticNode`] to represent module, function, and
//! type definition nodes with structural metadata.

use serde::{Deserialize, Serialize};

use crate::id::{FunctionId, ModuleId};
use crate::ops::{ComputeNodeOp, ComputeOp, StructuredOp};
use crate::type_id::TypeId;
use crate::types::Visibility;

// ---------------------------------------------------------------------------
// Computational graph nodes
// ---------------------------------------------------------------------------

/// A node in the computational graph, wrapping an operation with ownership
/// metadata.
///
/// All compute nodes live in a single flat `StableGraph`. Function boundaries
/// are represented via the `owner` field -- a function's nodes are those with
/// `owner == function_id`. This preserves cross-function edges (direct calls)
/// within one connected graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeNode {
    /// The operation this node performs.
    pub op: ComputeNodeOp,
    /// Which function owns this node. Used to identify function boundaries
    /// in the flat graph.
    pub owner: FunctionId,
}

impl ComputeNode {
    /// Creates a new compute node with the given op and owner.
    pub fn new(op: ComputeNodeOp, owner: FunctionId) -> Self {
        ComputeNode { op, owner }
    }

    /// Creates a compute node wrapping a core (Tier 1) operation.
    pub fn core(op: ComputeOp, owner: FunctionId) -> Self {
        ComputeNode {
            op: ComputeNodeOp::Core(op),
            owner,
        }
    }

    /// Creates a compute node wrapping a structured (Tier 2) operation.
    pub fn structured(op: StructuredOp, owner: FunctionId) -> Self {
        ComputeNode {
            op: ComputeNodeOp::Structured(op),
            owner,
        }
    }

    /// Returns the tier of this node's operation: 1 for core, 2 for structured.
    pub fn tier(&self) -> u8 {
        self.op.tier()
    }

    /// Returns `true` if this node is a control flow operation.
    pub fn is_control_flow(&self) -> bool {
        self.op.is_control_flow()
    }

    /// Returns `true` if this node is a basic block terminator.
    pub fn is_terminator(&self) -> bool {
        self.op.is_terminator()
    }

    /// Returns `true` if this node is an I/O operation.
    pub fn is_io(&self) -> bool {
        self.op.is_io()
    }
}

// ---------------------------------------------------------------------------
// Semantic graph nodes
// ---------------------------------------------------------------------------

/// A node in the semantic graph, representing a module, function, or type
/// definition.
///
/// The semantic graph is a lightweight skeleton in Phase 1: structural
/// containment, function names and signatures, type definitions. No embeddings,
/// summaries, or rich relationships -- those come in later phases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SemanticNode {
    /// A module in the module tree.
    Module(ModuleDef),
    /// A function with its name, signature, and module membership.
    /// Note: This is a summary, not the full `FunctionDef` (which includes
    /// entry nodes, captures, etc. and lives in a separate lookup table).
    Function(FunctionSummary),
    /// A type definition node.
    TypeDef(TypeDefNode),
}

// ---------------------------------------------------------------------------
// Supporting types for SemanticNode
// ---------------------------------------------------------------------------

/// Temporary forward definition of ModuleDef.
///
/// Contains the minimum fields needed for the semantic graph skeleton.
// TODO(plan-03): Move ModuleDef to module.rs when it exists. This stub
// provides the basics so the code compiles and the semantic graph can
// represent module nodes. Plan 03 will add the full definition with
// child tracking and module-level metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDef {
    /// Module name.
    pub name: String,
    /// Parent module, if any. `None` for the root module.
    pub parent: Option<ModuleId>,
    /// Visibility of this module.
    pub visibility: Visibility,
}

/// Lightweight function summary for the semantic graph.
///
/// Contains just the identity and signature -- enough for structural queries
/// ("what functions exist in this module?", "what's the signature of function X?").
/// The full `FunctionDef` (with entry node, captures, etc.) lives in a
/// separate lookup table, not in the graph node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSummary {
    /// Function name.
    pub name: String,
    /// Unique function identifier.
    pub function_id: FunctionId,
    /// Module this function belongs to.
    pub module: ModuleId,
    /// Visibility across module boundaries.
    pub visibility: Visibility,
    /// Function type signature (parameters and return type).
    pub signature: FunctionSignature,
}

/// Function type signature: parameter names + types, and return type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSignature {
    /// Named parameters with their types.
    pub params: Vec<(String, TypeId)>,
    /// Return type of the function.
    pub return_type: TypeId,
}

/// A type definition node for the semantic graph.
///
/// Represents a named type (struct or enum) defined in a module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDefNode {
    /// Type name.
    pub name: String,
    /// The TypeId of this type definition.
    pub type_id: TypeId,
    /// Module this type is defined in.
    pub module: ModuleId,
    /// Visibility across module boundaries.
    pub visibility: Visibility,
}
