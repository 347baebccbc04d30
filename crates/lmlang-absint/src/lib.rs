//! Abstract interpreter over a compiled [`lmlang_core::graph::ProgramGraph`].
//!
//! Entry point: [`interpret`], which runs every function in a program to a
//! whole-program fixed point and returns one [`FunctionSummary`] per
//! reached function. Everything else in this crate (the numeric, pointer,
//! and aggregate domains, the per-function interpreter, the inter-function
//! driver, the textual dump format) is public so `lmlang-cli` and tests can
//! reach into any layer directly, the same flat-module shape the rest of
//! this workspace already uses.

pub mod aggregate;
pub mod config;
pub mod constructors;
pub mod driver;
pub mod dump;
pub mod error;
pub mod float;
pub mod integer;
pub mod interpreter;
pub mod memory;
pub mod pointer;
pub mod predicate;
pub mod state;
pub mod value;

use lmlang_core::graph::ProgramGraph;
use lmlang_core::id::FunctionId;
use lmlang_core::type_id::TypeRegistry;

pub use config::AnalysisConfig;
pub use driver::{AnalysisOutcome, Driver};
pub use error::AnalysisError;
pub use interpreter::FunctionSummary;

/// Runs the analysis to completion with a default [`AnalysisConfig`] and
/// returns the literal contract REPLs and other external callers expect:
/// every function's summary, or the first fatal error.
///
/// This collapses [`AnalysisOutcome`]'s richer `{summaries, error}` shape
/// (needed internally so a `BudgetExhausted` run still carries whatever was
/// computed before the cutoff) down to a plain `Result`. Callers that need
/// partial summaries alongside a non-fatal stopping reason should call
/// [`analyze`] directly instead.
pub fn interpret(graph: &ProgramGraph, types: &TypeRegistry) -> Result<Vec<FunctionSummary>, AnalysisError> {
    let outcome = analyze(graph, types, &AnalysisConfig::default());
    match outcome.error {
        Some(e) => Err(e),
        None => Ok(outcome.summaries.into_values().collect()),
    }
}

/// Runs the analysis with an explicit [`AnalysisConfig`] and returns the
/// full [`AnalysisOutcome`], partial results included.
pub fn analyze(graph: &ProgramGraph, types: &TypeRegistry, config: &AnalysisConfig) -> AnalysisOutcome {
    Driver::new(graph, types, config).run()
}

/// Convenience wrapper around [`analyze`] plus [`dump::dump_program`], the
/// shape `lmlang-cli`'s `dump <path>` command writes to disk.
pub fn interpret_and_dump(graph: &ProgramGraph, types: &TypeRegistry, config: &AnalysisConfig) -> (AnalysisOutcome, String) {
    let outcome = analyze(graph, types, config);
    let text = dump::dump_program(graph, &outcome.summaries);
    (outcome, text)
}

/// Summary for a single function, looked up by ID, used by `lmlang-cli`'s
/// `info module` command to report per-function analysis coverage.
pub fn summary_for(outcome: &AnalysisOutcome, function: FunctionId) -> Option<&FunctionSummary> {
    outcome.summaries.get(&function)
}
