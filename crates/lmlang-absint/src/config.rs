//! Analysis-wide tunables threaded into every constructor and the
//! interpreter's widening decision.
//!
//! Ground: the original has no single config object — `set_threshold` is a
//! file-scope constant in `IntegerSet.cpp` and the widening period comes
//! from `WideningDataIterationCount.h`'s `ITERATION_COUNT`. This crate
//! collects both into one struct passed by reference, the shape the
//! teacher workspace's own `lmlang-cli` config types already take.

use crate::integer::DomainMask;

#[derive(Debug, Clone, Copy)]
pub struct AnalysisConfig {
    /// `IntSet` collapses to `top` once its cardinality exceeds this.
    pub set_threshold: usize,
    /// Visits of a basic block beyond this count switch `join` to `widen`.
    pub widening_threshold: u32,
    /// Which integer domain components are tracked.
    pub domain_mask: DomainMask,
    /// Upper bound on worklist steps before the driver gives up and
    /// returns partial results.
    pub step_budget: Option<u64>,
}

impl Default for AnalysisConfig {
    fn default() -> AnalysisConfig {
        AnalysisConfig {
            set_threshold: 40,
            widening_threshold: 3,
            domain_mask: DomainMask::default(),
            step_budget: None,
        }
    }
}
