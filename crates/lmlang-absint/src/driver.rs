//! Inter-function driver (spec §4.11): runs every function in the program
//! to a whole-program fixed point, threading call arguments to callees and
//! callee summaries (return value, globally-visible globals) back to
//! callers.
//!
//! One-level context sensitivity: each function gets exactly one summary,
//! which is the join of every call site's argument values seen so far (no
//! per-call-site cloning of the callee). A function is re-enqueued when
//! either its own argument vector grows or one of its callees' summaries
//! changes; global memory is modeled as one program-wide store so any
//! function touching it forces every function to be reconsidered, the
//! simplest sound choice for cross-function global aliasing.

use std::collections::{HashMap, HashSet, VecDeque};

use lmlang_core::graph::ProgramGraph;
use lmlang_core::id::FunctionId;
use lmlang_core::ops::{ComputeNodeOp, ComputeOp};
use lmlang_core::type_id::TypeRegistry;

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::interpreter::{FunctionSummary, Interpreter};
use crate::state::State;
use crate::value::AbstractValue;

/// Result of a full analysis run: whatever summaries were computed, plus
/// the error that stopped the run early, if any. A `BudgetExhausted`
/// error here still carries every summary computed before the cutoff.
pub struct AnalysisOutcome {
    pub summaries: HashMap<FunctionId, FunctionSummary>,
    pub error: Option<AnalysisError>,
}

pub struct Driver<'a> {
    graph: &'a ProgramGraph,
    types: &'a TypeRegistry,
    config: &'a AnalysisConfig,
    callers: HashMap<FunctionId, Vec<FunctionId>>,
}

impl<'a> Driver<'a> {
    pub fn new(graph: &'a ProgramGraph, types: &'a TypeRegistry, config: &'a AnalysisConfig) -> Driver<'a> {
        let mut callers: HashMap<FunctionId, Vec<FunctionId>> = HashMap::new();
        for node in graph.compute().node_weights() {
            if let ComputeNodeOp::Core(ComputeOp::Call { target }) = &node.op {
                callers.entry(*target).or_default().push(node.owner);
            }
        }
        Driver { graph, types, config, callers }
    }

    pub fn run(&self) -> AnalysisOutcome {
        let mut jobs: VecDeque<FunctionId> = self.graph.functions().keys().copied().collect();
        let mut queued: HashSet<FunctionId> = jobs.iter().copied().collect();
        let mut param_values: HashMap<FunctionId, Vec<AbstractValue>> = HashMap::new();
        let mut summaries: HashMap<FunctionId, FunctionSummary> = HashMap::new();
        let mut global_store = State::new();
        let mut steps: u64 = 0;

        let interpreter = Interpreter::new(self.graph, self.types, self.config);

        while let Some(fid) = jobs.pop_front() {
            queued.remove(&fid);
            steps += 1;
            if let Some(budget) = self.config.step_budget {
                if steps > budget {
                    tracing::warn!(steps, budget, "analysis step budget exhausted, returning partial summaries");
                    return AnalysisOutcome {
                        summaries,
                        error: Some(AnalysisError::BudgetExhausted { steps_taken: steps }),
                    };
                }
            }

            let args = param_values.get(&fid).cloned().unwrap_or_default();
            let mut input = State::new();
            input.global_blocks = global_store.global_blocks.clone();

            let run = match interpreter.run_function(fid, input, &args, &summaries) {
                Ok(run) => run,
                Err(e) if e.is_fatal() => {
                    return AnalysisOutcome { summaries, error: Some(e) };
                }
                // A documented domain gap (e.g. `Pointer::meet`, an
                // unordered float comparison) leaves this function
                // unsummarized for now; it is retried once one of its
                // inputs changes again.
                Err(_) => continue,
            };

            let globals_grew = match merge_globals(&mut global_store, &run.summary.output) {
                Ok(grew) => grew,
                Err(e) => return AnalysisOutcome { summaries, error: Some(e) },
            };

            let mut newly_called = Vec::new();
            for (callee, call_args) in &run.calls {
                if merge_call_args(&mut param_values, *callee, call_args) {
                    newly_called.push(*callee);
                }
            }

            let summary_changed = summaries.get(&fid) != Some(&run.summary);
            summaries.insert(fid, run.summary);

            if globals_grew {
                for other in self.graph.functions().keys() {
                    if queued.insert(*other) {
                        jobs.push_back(*other);
                    }
                }
            }
            if summary_changed {
                if let Some(callers) = self.callers.get(&fid) {
                    for caller in callers {
                        if queued.insert(*caller) {
                            jobs.push_back(*caller);
                        }
                    }
                }
            }
            for callee in newly_called {
                if queued.insert(callee) {
                    jobs.push_back(callee);
                }
            }
        }

        tracing::debug!(functions = summaries.len(), steps, "analysis reached a fixed point");
        AnalysisOutcome { summaries, error: None }
    }
}

fn merge_globals(store: &mut State, callee_output: &State) -> Result<bool, AnalysisError> {
    let mut grew = false;
    for (place, block) in &callee_output.global_blocks {
        match store.global_blocks.get_mut(place) {
            Some(existing) => {
                let before = existing.clone();
                existing.join(block, *place)?;
                if *existing != before {
                    grew = true;
                }
            }
            None => {
                store.global_blocks.insert(*place, block.clone());
                grew = true;
            }
        }
    }
    Ok(grew)
}

/// Joins `call_args` into the callee's accumulated argument vector,
/// returning whether the vector actually changed (widening is not
/// applied here; the per-function interpreter's own block-level widening
/// already bounds growth of any one argument's domain).
fn merge_call_args(param_values: &mut HashMap<FunctionId, Vec<AbstractValue>>, callee: FunctionId, call_args: &[AbstractValue]) -> bool {
    match param_values.get_mut(&callee) {
        Some(existing) => {
            let mut changed = false;
            for (slot, incoming) in existing.iter_mut().zip(call_args.iter()) {
                let before = slot.clone();
                // A kind mismatch here means the callee's parameter type
                // disagrees with a call site's argument type, a type-checker
                // bug upstream; keep the previous value rather than panic.
                let _ = slot.join(incoming, lmlang_core::id::NodeId(0));
                if *slot != before {
                    changed = true;
                }
            }
            for extra in call_args.iter().skip(existing.len()) {
                existing.push(extra.clone());
                changed = true;
            }
            changed
        }
        None => {
            param_values.insert(callee, call_args.to_vec());
            true
        }
    }
}
