//! Textual dump format (spec §6): renders a completed analysis run as
//! multi-line indented text, one block per function.
//!
//! Ground: no single original file owns this; `IntegerSet::toString`,
//! `IntegerInterval::toString`, `IntegerBits::toString`, `Pointer::toString`
//! and friends each contribute the per-domain first token this module
//! reuses (`integerSet`, `interval`, `bits`, `pointer`, `array`,
//! `stringTrie`, `struct`). The per-function/per-block layout mirrors how
//! `lmlang-cli`'s own `repl.rs` already renders other multi-line structured
//! output: one header line, then indented body lines.

use std::collections::HashMap;
use std::fmt::Write as _;

use lmlang_core::cfg::{self, BlockId};
use lmlang_core::graph::ProgramGraph;
use lmlang_core::id::FunctionId;
use lmlang_core::ops::{ComputeNodeOp, ComputeOp};

use crate::aggregate::{ArrayFixed, SingleItemArray, StringTrie, StructValue};
use crate::float::FloatInterval;
use crate::integer::bits::BitValue;
use crate::integer::Container;
use crate::interpreter::FunctionSummary;
use crate::pointer::{PointerDomain, TargetReferent, TargetTag};
use crate::value::AbstractValue;

const INDENT: &str = "  ";

/// Renders every function's summary, in declaration order by name for a
/// stable dump across runs (the program graph itself has no canonical
/// function order).
pub fn dump_program(graph: &ProgramGraph, summaries: &HashMap<FunctionId, FunctionSummary>) -> String {
    let mut ids: Vec<FunctionId> = graph.functions().keys().copied().collect();
    ids.sort_by_key(|id| graph.functions()[id].name.clone());

    let mut out = String::new();
    for id in ids {
        dump_function(&mut out, graph, id, summaries.get(&id));
        out.push('\n');
    }
    out
}

fn dump_function(out: &mut String, graph: &ProgramGraph, id: FunctionId, summary: Option<&FunctionSummary>) {
    let def = match graph.get_function(id) {
        Some(def) => def,
        None => return,
    };
    let _ = writeln!(out, "function {}:", def.name);

    let summary = match summary {
        Some(s) => s,
        None => {
            let _ = writeln!(out, "{INDENT}(not reached)");
            return;
        }
    };

    let cfg = cfg::build(graph, id);
    let entry_block_id = def.entry_node.map(BlockId);
    let entry_instructions: Vec<_> = match (&cfg, entry_block_id) {
        (Some(c), Some(block_id)) => c.block(block_id).map(|b| b.instructions.clone()).unwrap_or_default(),
        _ => Vec::new(),
    };
    let entry_locals = entry_block_id.and_then(|block_id| summary.block_output.get(&block_id)).map(|s| &s.locals);

    for (index, (name, type_id)) in def.params.iter().enumerate() {
        let value = entry_locals.and_then(|locals| {
            entry_instructions.iter().find_map(|node| {
                let op = &graph.get_compute_node(*node)?.op;
                match op {
                    ComputeNodeOp::Core(ComputeOp::Parameter { index: i }) if *i == index => locals.get(node),
                    _ => None,
                }
            })
        });
        let rendered = value.map(dump_value).unwrap_or_else(|| "undefined".to_string());
        let _ = writeln!(out, "{INDENT}arg {name}: {type_id} = {}", indent_continuation(&rendered, INDENT));
    }

    if let Some(cfg) = &cfg {
        for block_id in cfg.reverse_post_order() {
            let block = match cfg.block(block_id) {
                Some(b) => b,
                None => continue,
            };
            let _ = writeln!(out, "{INDENT}block {}:", block_id.0);
            dump_state_locals(out, &format!("{INDENT}{INDENT}"), "input", summary.block_input.get(&block_id));
            for node in &block.instructions {
                let produced = summary
                    .block_output
                    .get(&block_id)
                    .and_then(|s| s.locals.get(node))
                    .map(dump_value);
                match produced {
                    Some(rendered) => {
                        let _ = writeln!(
                            out,
                            "{INDENT}{INDENT}{} = {}",
                            node,
                            indent_continuation(&rendered, &format!("{INDENT}{INDENT}"))
                        );
                    }
                    None => {
                        let _ = writeln!(out, "{INDENT}{INDENT}{} = (no value)", node);
                    }
                }
            }
            dump_state_locals(out, &format!("{INDENT}{INDENT}"), "output", summary.block_output.get(&block_id));
        }
    }

    let returned = summary.output.returned_value.as_ref().map(dump_value).unwrap_or_else(|| "undefined".to_string());
    let _ = writeln!(out, "{INDENT}return = {}", indent_continuation(&returned, INDENT));
}

fn dump_state_locals(out: &mut String, indent: &str, label: &str, state: Option<&crate::state::State>) {
    let _ = writeln!(out, "{indent}{label}:");
    let Some(state) = state else {
        let _ = writeln!(out, "{indent}{INDENT}(none)");
        return;
    };
    let mut ids: Vec<_> = state.locals.keys().copied().collect();
    ids.sort_by_key(|n| n.0);
    if ids.is_empty() {
        let _ = writeln!(out, "{indent}{INDENT}(empty)");
    }
    for id in ids {
        let rendered = dump_value(&state.locals[&id]);
        let _ = writeln!(out, "{indent}{INDENT}{} = {}", id, indent_continuation(&rendered, &format!("{indent}{INDENT}")));
    }
}

/// Re-indents every line after the first of a nested dump so it lines up
/// under the label that introduced it.
fn indent_continuation(rendered: &str, indent: &str) -> String {
    let mut lines = rendered.lines();
    let first = lines.next().unwrap_or("");
    let mut out = first.to_string();
    for line in lines {
        out.push('\n');
        out.push_str(indent);
        out.push_str(line);
    }
    out
}

pub fn dump_value(value: &AbstractValue) -> String {
    match value {
        AbstractValue::Integer(c) => dump_integer(c),
        AbstractValue::Float(f) => dump_float(f),
        AbstractValue::Pointer(p) => dump_pointer(p),
        AbstractValue::Array(a) => dump_array_fixed(a),
        AbstractValue::ArraySingle(a) => dump_array_single(a),
        AbstractValue::StringTrie(t) => dump_string_trie(t),
        AbstractValue::Struct(s) => dump_struct(s),
    }
}

fn dump_integer(c: &Container) -> String {
    format!(
        "integer{}:\n{INDENT}integerSet: {}\n{INDENT}interval: {}\n{INDENT}bits: {}",
        c.width(),
        dump_int_set(c),
        dump_interval(c),
        dump_bits(c)
    )
}

fn dump_int_set(c: &Container) -> String {
    let set = c.set();
    if set.is_top() {
        "top".to_string()
    } else if set.is_bottom() {
        "bottom".to_string()
    } else {
        let values: Vec<String> = set.values().map(|v| v.iter().map(|x| x.to_string()).collect()).unwrap_or_default();
        format!("{{{}}}", values.join(", "))
    }
}

fn dump_interval(c: &Container) -> String {
    let interval = c.interval();
    if interval.is_top() {
        return "top".to_string();
    }
    if interval.is_bottom() {
        return "bottom".to_string();
    }
    let signed = interval.signed_half();
    let unsigned = interval.unsigned_half();
    format!(
        "signed[{}, {}] unsigned[{}, {}]",
        signed.from, signed.to, unsigned.from, unsigned.to
    )
}

fn dump_bits(c: &Container) -> String {
    let bits = c.bits();
    if bits.is_top() {
        return "top".to_string();
    }
    if bits.is_bottom() {
        return "bottom".to_string();
    }
    let mut s = String::with_capacity(bits.width() as usize);
    for pos in (0..bits.width()).rev() {
        s.push(match bits.get(pos) {
            BitValue::Undef => 'u',
            BitValue::Zero => '0',
            BitValue::One => '1',
            BitValue::Top => '?',
        });
    }
    s
}

fn dump_float(f: &FloatInterval) -> String {
    let name = match f.format() {
        crate::float::FloatFormat::F32 => "float32",
        crate::float::FloatFormat::F64 => "float64",
    };
    if f.is_bottom() {
        return format!("{name}: bottom");
    }
    if f.is_top() {
        return format!("{name}: top");
    }
    let nan = if f.has_nan() { ", nan-possible" } else { "" };
    format!("{name}: [{}, {}]{nan}", f.from(), f.to())
}

fn dump_pointer(p: &PointerDomain) -> String {
    if p.is_bottom() {
        return format!("pointer(pointee={}): bottom", p.pointee());
    }
    if p.is_top() {
        return format!("pointer(pointee={}): top", p.pointee());
    }
    let mut targets: Vec<_> = p.targets().iter().collect();
    targets.sort_by_key(|(place, _)| place.0);
    let rendered: Vec<String> = targets
        .into_iter()
        .map(|(place, target)| {
            let referent = match (&target.tag, &target.referent) {
                (TargetTag::Block, Some(TargetReferent::Block(n))) => format!("block({n})"),
                (TargetTag::Function, Some(TargetReferent::Function(f))) => format!("function({f})"),
                (TargetTag::Constant, _) => "constant".to_string(),
                (TargetTag::Uninitialized, _) => "uninitialized".to_string(),
                (TargetTag::Top, _) => "top".to_string(),
                _ => "unknown".to_string(),
            };
            format!("place({place}) -> {referent}")
        })
        .collect();
    format!("pointer(pointee={}): {}", p.pointee(), rendered.join("; "))
}

fn dump_array_fixed(a: &ArrayFixed) -> String {
    if a.is_bottom() {
        return format!("array[{}]: bottom", a.len());
    }
    if a.is_top() {
        return format!("array[{}]: top", a.len());
    }
    let elements: Vec<String> = a.elements.iter().enumerate().map(|(i, e)| format!("[{i}]={}", dump_value(e))).collect();
    format!("array[{}]: {}", a.len(), elements.join("; "))
}

fn dump_array_single(a: &SingleItemArray) -> String {
    if a.is_bottom() {
        return "array (single-item): bottom".to_string();
    }
    if a.is_top() {
        return "array (single-item): top".to_string();
    }
    format!("array (single-item): size={}, summary={}", dump_value(&a.size), dump_value(&a.summary))
}

fn dump_string_trie(t: &StringTrie) -> String {
    if t.is_bottom() {
        return "stringTrie: bottom".to_string();
    }
    if t.is_top() {
        return "stringTrie: top".to_string();
    }
    format!("stringTrie: {:?}", t)
}

fn dump_struct(s: &StructValue) -> String {
    if s.is_bottom() {
        return "struct: bottom".to_string();
    }
    if s.is_top() {
        return "struct: top".to_string();
    }
    let fields: Vec<String> = s.fields.iter().enumerate().map(|(i, f)| format!("[{i}]={}", dump_value(f))).collect();
    format!("struct: {}", fields.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integer::DomainMask;

    #[test]
    fn integer_dump_names_all_three_components() {
        let v = AbstractValue::Integer(Container::singleton(8, 5, DomainMask::default(), 40));
        let s = dump_value(&v);
        assert!(s.contains("integerSet"));
        assert!(s.contains("interval"));
        assert!(s.contains("bits"));
    }

    #[test]
    fn top_container_dumps_top_everywhere() {
        let v = AbstractValue::Integer(Container::top(8, DomainMask::default(), 40));
        let s = dump_value(&v);
        assert_eq!(s.matches("top").count(), 3);
    }

    #[test]
    fn bottom_float_dumps_bottom() {
        let v = AbstractValue::Float(FloatInterval::bottom(crate::float::FloatFormat::F64));
        assert!(dump_value(&v).contains("bottom"));
    }
}
