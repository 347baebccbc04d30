//! Per-function abstract interpreter (spec §4.10).
//!
//! Walks a function's basic blocks (via [`lmlang_core::cfg`]) with a
//! worklist, joining predecessor outputs into each block's input state,
//! widening once a block has been revisited past
//! [`AnalysisConfig::widening_threshold`], and re-enqueueing successors
//! whose input changed. Operations this crate has no transfer function
//! for (console/file I/O, closures, indirect calls, enum ops, and any
//! `IfElse`/`Loop`/`Match` node that survived lowering) are modeled as
//! `top` of their declared output type; the Non-goals already accept
//! unmodeled external calls on the same terms.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::graph::NodeIndex;
use petgraph::Direction;

use lmlang_core::cfg::{self, BlockId, FunctionCfg};
use lmlang_core::edge::FlowEdge;
use lmlang_core::graph::ProgramGraph;
use lmlang_core::id::{FunctionId, NodeId};
use lmlang_core::ops::{ArithOp, CmpOp, ComputeNodeOp, ComputeOp, LogicOp, ShiftOp, StructuredOp, UnaryArithOp};
use lmlang_core::type_id::{TypeId, TypeRegistry};
use lmlang_core::types::{LmType, ScalarType};

use crate::aggregate::{ArrayFixed, StructValue};
use crate::config::AnalysisConfig;
use crate::constructors::Constructors;
use crate::error::AnalysisError;
use crate::float::{FloatFormat, FloatInterval};
use crate::integer::Container;
use crate::pointer::{PointerDomain, Target, TargetReferent, TargetTag};
use crate::predicate::Predicate;
use crate::state::State;
use crate::value::AbstractValue;

/// Per-function result: the converged summary plus every call site this
/// run observed, so the driver can thread fresh argument values back to
/// the callee and caller.
pub struct FunctionRun {
    pub summary: FunctionSummary,
    pub calls: Vec<(FunctionId, Vec<AbstractValue>)>,
}

/// Distinct from [`lmlang_core::node::FunctionSummary`] (the semantic-node
/// payload describing a signature): this is the interpreter's fixed-point
/// result for one function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSummary {
    pub input: State,
    pub output: State,
    pub block_input: HashMap<BlockId, State>,
    pub block_output: HashMap<BlockId, State>,
}

pub struct Interpreter<'a> {
    graph: &'a ProgramGraph,
    types: &'a TypeRegistry,
    config: &'a AnalysisConfig,
}

impl<'a> Interpreter<'a> {
    pub fn new(graph: &'a ProgramGraph, types: &'a TypeRegistry, config: &'a AnalysisConfig) -> Interpreter<'a> {
        Interpreter { graph, types, config }
    }

    /// Runs `function` to a fixed point from `input` (global blocks and any
    /// already-known values carried in from the driver), with `args`
    /// supplying the abstract value for each `Parameter { index }` node.
    /// `callee_summaries` is read for `Call` targets already analyzed in a
    /// previous driver round; a target with no summary yet is treated as
    /// `bottom` of its return type, the standard least-fixed-point start.
    pub fn run_function(
        &self,
        function: FunctionId,
        input: State,
        args: &[AbstractValue],
        callee_summaries: &HashMap<FunctionId, FunctionSummary>,
    ) -> Result<FunctionRun, AnalysisError> {
        let def = self
            .graph
            .get_function(function)
            .ok_or(AnalysisError::AssertionFailed { node: NodeId(0), reason: "unknown function".into() })?;

        let cfg = match cfg::build(self.graph, function) {
            Some(cfg) => cfg,
            // A function with no body (declaration only, or an un-lowered
            // stub) contributes nothing but its declared return type as top.
            None => {
                let mut output = input.clone();
                let ctors = Constructors::new(self.types, self.config);
                output.returned_value = Some(ctors.top(def.return_type)?);
                let summary = FunctionSummary {
                    input: input.clone(),
                    output,
                    block_input: HashMap::new(),
                    block_output: HashMap::new(),
                };
                return Ok(FunctionRun { summary, calls: Vec::new() });
            }
        };

        let mut block_input: HashMap<BlockId, State> = HashMap::new();
        let mut block_output: HashMap<BlockId, State> = HashMap::new();
        let mut visits: HashMap<BlockId, u32> = HashMap::new();
        let mut worklist: VecDeque<BlockId> = VecDeque::new();
        let mut calls: Vec<(FunctionId, Vec<AbstractValue>)> = Vec::new();

        worklist.push_back(cfg.entry);

        while let Some(block_id) = worklist.pop_front() {
            let block = cfg.block(block_id).ok_or(AnalysisError::AssertionFailed {
                node: block_id.0,
                reason: "worklist referenced an unknown block".into(),
            })?;

            let mut merged: Option<State> = if block_id == cfg.entry { Some(input.clone()) } else { None };
            for pred in &block.predecessors {
                if let Some(out) = block_output.get(pred) {
                    match &mut merged {
                        Some(acc) => acc.join(out, block_id.0)?,
                        None => merged = Some(out.clone()),
                    }
                }
            }
            let Some(merged) = merged else {
                // Not every predecessor has run yet; this block will be
                // re-queued once one of them does.
                continue;
            };

            let visit_count = visits.entry(block_id).or_insert(0);
            *visit_count += 1;
            let count = *visit_count;

            let new_input = match block_input.get(&block_id) {
                Some(prev) => {
                    let mut combined = prev.clone();
                    if count > self.config.widening_threshold {
                        combined.widen(&merged, block_id.0)?;
                    } else {
                        combined.join(&merged, block_id.0)?;
                    }
                    combined
                }
                None => merged,
            };

            if block_input.get(&block_id) == Some(&new_input) && block_output.contains_key(&block_id) {
                continue;
            }
            block_input.insert(block_id, new_input.clone());

            let out_state = self.run_block(block.instructions.as_slice(), new_input, args, callee_summaries, &mut calls)?;
            let changed = block_output.get(&block_id) != Some(&out_state);
            block_output.insert(block_id, out_state);

            if changed {
                for succ in &block.successors {
                    worklist.push_back(*succ);
                }
            }
        }

        let output = merge_exits(&cfg, &block_output)?;
        let summary = FunctionSummary { input, output, block_input, block_output };
        Ok(FunctionRun { summary, calls })
    }

    fn run_block(
        &self,
        instructions: &[NodeId],
        mut state: State,
        args: &[AbstractValue],
        callee_summaries: &HashMap<FunctionId, FunctionSummary>,
        calls: &mut Vec<(FunctionId, Vec<AbstractValue>)>,
    ) -> Result<State, AnalysisError> {
        for &node_id in instructions {
            self.step(node_id, &mut state, args, callee_summaries, calls)?;
        }
        Ok(state)
    }

    fn step(
        &self,
        node_id: NodeId,
        state: &mut State,
        args: &[AbstractValue],
        callee_summaries: &HashMap<FunctionId, FunctionSummary>,
        calls: &mut Vec<(FunctionId, Vec<AbstractValue>)>,
    ) -> Result<(), AnalysisError> {
        let node = self
            .graph
            .get_compute_node(node_id)
            .ok_or(AnalysisError::AssertionFailed { node: node_id, reason: "missing compute node".into() })?;
        let ctors = Constructors::new(self.types, self.config);
        let operands = self.operands(node_id);

        match &node.op {
            ComputeNodeOp::Core(op) => self.step_core(node_id, op, state, &operands, args, &ctors, callee_summaries, calls)?,
            ComputeNodeOp::Structured(op) => self.step_structured(node_id, op, state, &operands, &ctors)?,
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn step_core(
        &self,
        node_id: NodeId,
        op: &ComputeOp,
        state: &mut State,
        operands: &[NodeId],
        args: &[AbstractValue],
        ctors: &Constructors,
        callee_summaries: &HashMap<FunctionId, FunctionSummary>,
        calls: &mut Vec<(FunctionId, Vec<AbstractValue>)>,
    ) -> Result<(), AnalysisError> {
        match op {
            ComputeOp::Const { value } => {
                let ty = self.output_type(node_id).unwrap_or(TypeId::UNIT);
                let v = ctors.from_const(value, ty)?;
                state.set_local(node_id, v);
            }
            ComputeOp::BinaryArith { op } => {
                let (lhs, rhs) = self.binary_operands(state, operands, node_id)?;
                let result = binary_arith(*op, &lhs, &rhs, node_id)?;
                state.set_local(node_id, result);
            }
            ComputeOp::UnaryArith { op } => {
                let operand = self.operand_value(state, operands, 0, node_id)?;
                let result = unary_arith(*op, &operand, ctors, self.output_type(node_id), node_id)?;
                state.set_local(node_id, result);
            }
            ComputeOp::Compare { op } => {
                let (lhs, rhs) = self.binary_operands(state, operands, node_id)?;
                let result = compare(*op, &lhs, &rhs, node_id)?;
                state.set_local(node_id, result);
            }
            ComputeOp::BinaryLogic { op } => {
                let (lhs, rhs) = self.binary_operands(state, operands, node_id)?;
                let result = binary_logic(*op, &lhs, &rhs, node_id)?;
                state.set_local(node_id, result);
            }
            ComputeOp::Not => {
                let operand = self.operand_value(state, operands, 0, node_id)?;
                let result = match &operand {
                    AbstractValue::Integer(c) => {
                        let ones = Container::singleton(c.width(), all_ones(c.width()), c.mask(), c.set_threshold());
                        AbstractValue::Integer(c.xor(&ones))
                    }
                    other => other.clone(),
                };
                state.set_local(node_id, result);
            }
            ComputeOp::Shift { op } => {
                let (lhs, rhs) = self.binary_operands(state, operands, node_id)?;
                let result = shift(*op, &lhs, &rhs, node_id)?;
                state.set_local(node_id, result);
            }
            ComputeOp::IfElse | ComputeOp::Loop | ComputeOp::Match => {
                // High-level structured control flow is expected to have
                // been lowered to Branch/Jump/Phi before analysis; a node
                // that survives is treated the same as any other
                // unmodeled operation.
                if let Some(ty) = self.output_type(node_id) {
                    state.set_local(node_id, ctors.top(ty)?);
                }
            }
            ComputeOp::Branch | ComputeOp::Jump | ComputeOp::Return => {
                if let ComputeOp::Return = op {
                    let value = operands.first().and_then(|&o| state.get_local(o).cloned());
                    state.returned_value = value;
                }
            }
            ComputeOp::Phi => {
                // Every incoming edge's source value is already present in
                // this block's (pre-joined) input state; folding them again
                // here is a sound no-op refinement, not a second join of
                // unseen data.
                let mut result: Option<AbstractValue> = None;
                for &src in operands {
                    if let Some(value) = state.get_local(src).cloned() {
                        match &mut result {
                            Some(acc) => acc.join(&value, node_id)?,
                            None => result = Some(value),
                        }
                    }
                }
                if let Some(result) = result {
                    state.set_local(node_id, result);
                }
            }
            ComputeOp::Alloc => {
                let ty = self.output_type(node_id).ok_or(AnalysisError::AssertionFailed {
                    node: node_id,
                    reason: "alloc has no declared pointee type".into(),
                })?;
                let pointee = pointee_of(self.types, ty, node_id)?;
                let initial = ctors.bottom(pointee)?;
                state.add_function_block(node_id, crate::memory::MemoryBlock::new(pointee, initial));
                let mut pointer = PointerDomain::bottom(pointee);
                pointer.add_target(
                    node_id,
                    Target::new(TargetTag::Block, Some(TargetReferent::Block(node_id)), vec![], None),
                )?;
                state.set_local(node_id, AbstractValue::Pointer(pointer));
            }
            ComputeOp::Load => {
                let pointer = self.pointer_operand(state, operands, 0, node_id)?;
                let loaded = pointer.load(state, node_id)?;
                if let Some(value) = loaded {
                    state.set_local(node_id, value);
                }
            }
            ComputeOp::Store => {
                let pointer = self.pointer_operand(state, operands, 0, node_id)?;
                let value = self.operand_value(state, operands, 1, node_id)?;
                pointer.store(&value, state, node_id)?;
            }
            ComputeOp::GetElementPtr => {
                let pointer = self.pointer_operand(state, operands, 0, node_id)?;
                let offsets: Vec<AbstractValue> = operands[1..]
                    .iter()
                    .map(|&o| state.get_local(o).cloned())
                    .collect::<Option<Vec<_>>>()
                    .ok_or(AnalysisError::AssertionFailed { node: node_id, reason: "GEP offset not yet evaluated".into() })?;
                let new_pointee = self.output_type(node_id).map(|t| pointee_of(self.types, t, node_id)).transpose()?.unwrap_or(pointer.pointee());
                let result = pointer.get_element_ptr(offsets, new_pointee, node_id)?;
                state.set_local(node_id, AbstractValue::Pointer(result));
            }
            ComputeOp::Call { target } => {
                let arg_values: Vec<AbstractValue> = operands
                    .iter()
                    .map(|&o| state.get_local(o).cloned().unwrap_or(AbstractValue::Integer(Container::bottom(1, Default::default(), 1))))
                    .collect();
                calls.push((*target, arg_values));

                let return_type = self.graph.get_function(*target).map(|f| f.return_type).unwrap_or(TypeId::UNIT);
                match callee_summaries.get(target) {
                    Some(summary) => {
                        if let Some(returned) = &summary.output.returned_value {
                            state.set_local(node_id, returned.clone());
                        }
                        merge_visible_globals(state, &summary.output, node_id)?;
                    }
                    None => {
                        state.set_local(node_id, ctors.bottom(return_type)?);
                    }
                }
            }
            ComputeOp::IndirectCall => {
                if let Some(ty) = self.output_type(node_id) {
                    state.set_local(node_id, ctors.top(ty)?);
                }
            }
            ComputeOp::Parameter { index } => {
                let value = args.get(*index as usize).cloned();
                let value = match value {
                    Some(v) => v,
                    None => {
                        let ty = self.output_type(node_id).unwrap_or(TypeId::UNIT);
                        ctors.bottom(ty)?
                    }
                };
                state.set_local(node_id, value);
            }
            ComputeOp::Print
            | ComputeOp::ReadLine
            | ComputeOp::FileOpen
            | ComputeOp::FileRead
            | ComputeOp::FileWrite
            | ComputeOp::FileClose
            | ComputeOp::MakeClosure { .. }
            | ComputeOp::CaptureAccess { .. } => {
                if let Some(ty) = self.output_type(node_id) {
                    state.set_local(node_id, ctors.top(ty)?);
                }
            }
        }
        Ok(())
    }

    fn step_structured(
        &self,
        node_id: NodeId,
        op: &StructuredOp,
        state: &mut State,
        operands: &[NodeId],
        ctors: &Constructors,
    ) -> Result<(), AnalysisError> {
        match op {
            StructuredOp::StructCreate { .. } => {
                let fields: Vec<AbstractValue> = operands
                    .iter()
                    .map(|&o| state.get_local(o).cloned())
                    .collect::<Option<Vec<_>>>()
                    .ok_or(AnalysisError::AssertionFailed { node: node_id, reason: "struct field not yet evaluated".into() })?;
                state.set_local(node_id, AbstractValue::Struct(StructValue::new(fields)));
            }
            StructuredOp::StructGet { field_index } => {
                let base = self.operand_value(state, operands, 0, node_id)?;
                let field = match &base {
                    AbstractValue::Struct(s) => s.get_field(*field_index as usize).cloned(),
                    _ => None,
                };
                if let Some(field) = field {
                    state.set_local(node_id, field);
                }
            }
            StructuredOp::StructSet { field_index } => {
                let mut base = self.operand_value(state, operands, 0, node_id)?;
                let new_value = self.operand_value(state, operands, 1, node_id)?;
                if let AbstractValue::Struct(s) = &mut base {
                    if let Some(slot) = s.get_field_mut(*field_index as usize) {
                        *slot = new_value;
                    }
                }
                state.set_local(node_id, base);
            }
            StructuredOp::ArrayCreate { .. } => {
                let elements: Vec<AbstractValue> = operands
                    .iter()
                    .map(|&o| state.get_local(o).cloned())
                    .collect::<Option<Vec<_>>>()
                    .ok_or(AnalysisError::AssertionFailed { node: node_id, reason: "array element not yet evaluated".into() })?;
                state.set_local(node_id, AbstractValue::Array(ArrayFixed::new(elements)));
            }
            StructuredOp::ArrayGet => {
                let base = self.operand_value(state, operands, 0, node_id)?;
                let index = self.operand_value(state, operands, 1, node_id)?;
                let result = array_get(&base, &index, node_id)?;
                if let Some(result) = result {
                    state.set_local(node_id, result);
                }
            }
            StructuredOp::ArraySet => {
                let mut base = self.operand_value(state, operands, 0, node_id)?;
                let index = self.operand_value(state, operands, 1, node_id)?;
                let value = self.operand_value(state, operands, 2, node_id)?;
                array_set(&mut base, &index, &value, node_id)?;
                state.set_local(node_id, base);
            }
            StructuredOp::Cast { target_type } => {
                let operand = self.operand_value(state, operands, 0, node_id)?;
                let result = cast(&operand, *target_type, self.types, ctors, node_id)?;
                state.set_local(node_id, result);
            }
            StructuredOp::EnumCreate { type_id, .. } => {
                state.set_local(node_id, ctors.top(*type_id)?);
            }
            StructuredOp::EnumDiscriminant | StructuredOp::EnumPayload { .. } => {
                if let Some(ty) = self.output_type(node_id) {
                    state.set_local(node_id, ctors.top(ty)?);
                }
            }
        }
        Ok(())
    }

    /// Incoming `Data` edges into `node`, sorted by `target_port` (operand
    /// position).
    fn operands(&self, node: NodeId) -> Vec<NodeId> {
        let idx: NodeIndex<u32> = node.into();
        let mut pairs: Vec<(u16, NodeId)> = self
            .graph
            .compute()
            .edges_directed(idx, Direction::Incoming)
            .filter_map(|e| match e.weight() {
                FlowEdge::Data { target_port, .. } => Some((*target_port, NodeId::from(e.source()))),
                FlowEdge::Control { .. } => None,
            })
            .collect();
        pairs.sort_by_key(|(port, _)| *port);
        pairs.into_iter().map(|(_, n)| n).collect()
    }

    /// The type carried by `node`'s first outgoing `Data` edge, i.e. the
    /// type of the value it produces.
    fn output_type(&self, node: NodeId) -> Option<TypeId> {
        let idx: NodeIndex<u32> = node.into();
        self.graph.compute().edges_directed(idx, Direction::Outgoing).find_map(|e| match e.weight() {
            FlowEdge::Data { value_type, .. } => Some(*value_type),
            FlowEdge::Control { .. } => None,
        })
    }

    fn operand_value(&self, state: &State, operands: &[NodeId], position: usize, node: NodeId) -> Result<AbstractValue, AnalysisError> {
        let operand = *operands.get(position).ok_or(AnalysisError::AssertionFailed {
            node,
            reason: "missing operand".into(),
        })?;
        state
            .get_local(operand)
            .cloned()
            .ok_or(AnalysisError::AssertionFailed { node, reason: "operand not yet evaluated".into() })
    }

    fn binary_operands(&self, state: &State, operands: &[NodeId], node: NodeId) -> Result<(AbstractValue, AbstractValue), AnalysisError> {
        Ok((self.operand_value(state, operands, 0, node)?, self.operand_value(state, operands, 1, node)?))
    }

    fn pointer_operand(&self, state: &State, operands: &[NodeId], position: usize, node: NodeId) -> Result<PointerDomain, AnalysisError> {
        match self.operand_value(state, operands, position, node)? {
            AbstractValue::Pointer(p) => Ok(p),
            _ => Err(AnalysisError::AssertionFailed { node, reason: "operand is not a pointer".into() }),
        }
    }
}

fn all_ones(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// The type a pointer type points to; fails (rather than guessing) on
/// anything that is not `LmType::Pointer`.
fn pointee_of(types: &TypeRegistry, ty: TypeId, node: NodeId) -> Result<TypeId, AnalysisError> {
    match types.get(ty) {
        Some(LmType::Pointer { pointee, .. }) => Ok(*pointee),
        _ => Err(AnalysisError::UnsupportedType { type_id: ty }),
    }
}

fn scalar_width(ty: ScalarType) -> u32 {
    match ty {
        ScalarType::Bool => 1,
        ScalarType::I8 => 8,
        ScalarType::I16 => 16,
        ScalarType::I32 => 32,
        ScalarType::I64 => 64,
        ScalarType::F32 | ScalarType::F64 => unreachable!("float scalars go through FloatInterval"),
    }
}

fn binary_arith(op: ArithOp, lhs: &AbstractValue, rhs: &AbstractValue, node: NodeId) -> Result<AbstractValue, AnalysisError> {
    match (lhs, rhs) {
        (AbstractValue::Integer(a), AbstractValue::Integer(b)) => {
            let r = match op {
                ArithOp::Add => a.add(b),
                ArithOp::Sub => a.sub(b),
                ArithOp::Mul => a.mul(b),
                // This language's scalar integers are all signed (see
                // predicate.rs), so division/remainder use the signed
                // transfer functions.
                ArithOp::Div => a.sdiv(b),
                ArithOp::Rem => a.srem(b),
            };
            Ok(AbstractValue::Integer(r))
        }
        (AbstractValue::Float(a), AbstractValue::Float(b)) => {
            let r = match op {
                ArithOp::Add => a.add(b),
                ArithOp::Sub => a.sub(b),
                ArithOp::Mul => a.mul(b),
                ArithOp::Div => a.div(b),
                ArithOp::Rem => a.rem(b),
            };
            Ok(AbstractValue::Float(r))
        }
        _ => Err(AnalysisError::AssertionFailed { node, reason: "arithmetic on mismatched operand domains".into() }),
    }
}

/// `Neg` has a precise transfer function (`0 - x`); `Abs` has no
/// component-level transfer function in any domain here, so it is modeled
/// as `top` of the output type, the same treatment given to operations
/// with no dedicated domain support.
fn unary_arith(op: UnaryArithOp, operand: &AbstractValue, ctors: &Constructors, output_ty: Option<TypeId>, node: NodeId) -> Result<AbstractValue, AnalysisError> {
    match (op, operand) {
        (UnaryArithOp::Neg, AbstractValue::Integer(c)) => {
            let zero = Container::singleton(c.width(), 0, c.mask(), c.set_threshold());
            Ok(AbstractValue::Integer(zero.sub(c)))
        }
        (UnaryArithOp::Neg, AbstractValue::Float(f)) => {
            let zero = FloatInterval::singleton(f.format(), 0.0);
            Ok(AbstractValue::Float(zero.sub(f)))
        }
        (UnaryArithOp::Abs, _) => {
            let ty = output_ty.ok_or(AnalysisError::AssertionFailed { node, reason: "abs has no declared output type".into() })?;
            ctors.top(ty)
        }
        _ => Err(AnalysisError::AssertionFailed { node, reason: "unary arithmetic on unsupported operand domain".into() }),
    }
}

fn compare(op: CmpOp, lhs: &AbstractValue, rhs: &AbstractValue, node: NodeId) -> Result<AbstractValue, AnalysisError> {
    match (lhs, rhs) {
        (AbstractValue::Integer(a), AbstractValue::Integer(b)) => {
            let pred = Predicate::from_cmp_op(op);
            Ok(AbstractValue::Integer(a.icmp(b, pred, node)?))
        }
        (AbstractValue::Float(a), AbstractValue::Float(b)) => {
            let pred = float_predicate(op);
            let result = a.compare(b, pred);
            let mask = Default::default();
            let bits = result.to_bits();
            let set = match bits {
                Some(bits) if bits.len() == 1 => Container::singleton(1, bits[0], mask, 1),
                Some(_) => Container::top(1, mask, 1),
                None => Container::bottom(1, mask, 1),
            };
            Ok(AbstractValue::Integer(set))
        }
        _ => Err(AnalysisError::AssertionFailed { node, reason: "comparison on mismatched operand domains".into() }),
    }
}

/// The IR's `CmpOp` carries no ordered/unordered split; every float
/// comparison is treated as the ordered variant (NaN makes it false),
/// matching how a surface `<`/`<=`/etc. operator reads.
fn float_predicate(op: CmpOp) -> crate::predicate::FloatPredicate {
    use crate::predicate::FloatPredicate::*;
    match op {
        CmpOp::Eq => OEq,
        CmpOp::Ne => ONe,
        CmpOp::Lt => OLt,
        CmpOp::Le => OLe,
        CmpOp::Gt => OGt,
        CmpOp::Ge => OGe,
    }
}

fn binary_logic(op: LogicOp, lhs: &AbstractValue, rhs: &AbstractValue, node: NodeId) -> Result<AbstractValue, AnalysisError> {
    match (lhs, rhs) {
        (AbstractValue::Integer(a), AbstractValue::Integer(b)) => {
            let r = match op {
                LogicOp::And => a.and(b),
                LogicOp::Or => a.or(b),
                LogicOp::Xor => a.xor(b),
            };
            Ok(AbstractValue::Integer(r))
        }
        _ => Err(AnalysisError::AssertionFailed { node, reason: "logic op on non-integer operand".into() }),
    }
}

fn shift(op: ShiftOp, lhs: &AbstractValue, rhs: &AbstractValue, node: NodeId) -> Result<AbstractValue, AnalysisError> {
    match (lhs, rhs) {
        (AbstractValue::Integer(a), AbstractValue::Integer(b)) => {
            let r = match op {
                ShiftOp::Shl => a.shl(b),
                ShiftOp::ShrLogical => a.lshr(b),
                ShiftOp::ShrArith => a.ashr(b),
            };
            Ok(AbstractValue::Integer(r))
        }
        _ => Err(AnalysisError::AssertionFailed { node, reason: "shift op on non-integer operand".into() }),
    }
}

/// Indexes into a fixed or summarizing array. A constant index reads the
/// precise element (fixed) or the summary under a bounds check (single
/// item); an imprecise index conservatively joins across every slot of a
/// fixed array, since any of them might be the one read.
fn array_get(base: &AbstractValue, index: &AbstractValue, node: NodeId) -> Result<Option<AbstractValue>, AnalysisError> {
    match base {
        AbstractValue::Array(arr) => match index.unsigned_max().filter(|_| is_constant_index(index)) {
            Some(offset) => Ok(Some(arr.get_item(offset, node)?.clone())),
            None => {
                let mut result: Option<AbstractValue> = None;
                for element in &arr.elements {
                    match &mut result {
                        Some(acc) => acc.join(element, node)?,
                        None => result = Some(element.clone()),
                    }
                }
                Ok(result)
            }
        },
        AbstractValue::ArraySingle(arr) => Ok(Some(arr.get_item(0, node)?.clone())),
        _ => Err(AnalysisError::AssertionFailed { node, reason: "array-get on a non-array value".into() }),
    }
}

fn array_set(base: &mut AbstractValue, index: &AbstractValue, value: &AbstractValue, node: NodeId) -> Result<(), AnalysisError> {
    match base {
        AbstractValue::Array(arr) => match index.unsigned_max().filter(|_| is_constant_index(index)) {
            Some(offset) => arr.set_item(offset, value.clone(), node),
            None => {
                for element in arr.elements.iter_mut() {
                    element.join(value, node)?;
                }
                Ok(())
            }
        },
        AbstractValue::ArraySingle(arr) => arr.set_item(0, value, node),
        _ => Err(AnalysisError::AssertionFailed { node, reason: "array-set on a non-array value".into() }),
    }
}

fn is_constant_index(index: &AbstractValue) -> bool {
    index.is_constant()
}

/// Type conversion transfer function. Integer widths go through the
/// container's own `trunc`/`zext`/`sext`; this language's scalar integers
/// are all signed (per `predicate.rs`), so widening always sign-extends
/// and bool-to-int zero-extends. Casts crossing the integer/float boundary
/// or changing float format have no precise transfer function here and
/// fall back to `top` of the target type, documented as a scope decision
/// rather than silently wrong output.
fn cast(operand: &AbstractValue, target_type: TypeId, types: &TypeRegistry, ctors: &Constructors, node: NodeId) -> Result<AbstractValue, AnalysisError> {
    let target = types.get(target_type).ok_or(AnalysisError::UnsupportedType { type_id: target_type })?;
    match (operand, target) {
        (AbstractValue::Integer(c), LmType::Scalar(ScalarType::Bool)) => Ok(AbstractValue::Integer(c.trunc(1))),
        (AbstractValue::Integer(c), LmType::Scalar(scalar @ (ScalarType::I8 | ScalarType::I16 | ScalarType::I32 | ScalarType::I64))) => {
            let new_width = scalar_width(*scalar);
            let r = if new_width > c.width() {
                c.sext(new_width)
            } else if new_width < c.width() {
                c.trunc(new_width)
            } else {
                c.clone()
            };
            Ok(AbstractValue::Integer(r))
        }
        (AbstractValue::Float(_), LmType::Scalar(ScalarType::F32)) => Ok(AbstractValue::Float(FloatInterval::top(FloatFormat::F32))),
        (AbstractValue::Float(_), LmType::Scalar(ScalarType::F64)) => Ok(AbstractValue::Float(FloatInterval::top(FloatFormat::F64))),
        _ => {
            let _ = node;
            ctors.top(target_type)
        }
    }
}

/// Joins every global block from a callee's exit state into the caller's,
/// approximating "globally-visible side effects (globals, blocks not
/// owned by the callee)" without threading ownership annotations through
/// `MemoryBlock`: function-local blocks never escape a callee's own
/// `function_blocks` map, so only `global_blocks` needs merging here.
fn merge_visible_globals(state: &mut State, callee_output: &State, node: NodeId) -> Result<(), AnalysisError> {
    for (place, block) in &callee_output.global_blocks {
        match state.global_blocks.get_mut(place) {
            Some(existing) => existing.join(block, node)?,
            None => {
                state.global_blocks.insert(*place, block.clone());
            }
        }
    }
    Ok(())
}

/// A function's externally observable output is the join of every
/// terminator block's exit state: any reachable `Return` could be the one
/// that actually fires.
fn merge_exits(cfg: &FunctionCfg, block_output: &HashMap<BlockId, State>) -> Result<State, AnalysisError> {
    let mut result = State::new();
    let mut seen = false;
    let exits: HashSet<BlockId> = cfg.blocks.values().filter(|b| b.successors.is_empty()).map(|b| b.id).collect();
    for (id, state) in block_output {
        if exits.contains(id) {
            if seen {
                result.join(state, id.0)?;
            } else {
                result = state.clone();
                seen = true;
            }
        }
    }
    if !seen {
        if let Some(entry_out) = block_output.get(&cfg.entry) {
            result = entry_out.clone();
        }
    }
    Ok(result)
}
