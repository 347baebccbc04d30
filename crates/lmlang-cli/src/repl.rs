//! Interactive command loop (spec §6): `file`, `info module`, `run`,
//! `start`, `dump`, `help`, `quit`.
//!
//! Ground: `original_source/CommandFile.h`, `CommandInfo.cpp`,
//! `CommandStart.cpp`, `tool/CommandDump.cpp`. This crate has no notion of
//! an LLVM `Module`, so `info module` reports the program graph's own
//! module tree and function count instead of data layout/target triple/
//! endianness. `start`'s original body was empty (`CommandStart::run` does
//! nothing); this keeps that shape and uses it only to reset any previous
//! analysis run, leaving `run` to do the actual interpretation.

use std::fs;
use std::io::{BufRead, Write};

use lmlang_absint::{analyze, dump, AnalysisConfig, AnalysisOutcome};
use lmlang_core::graph::ProgramGraph;

pub struct Repl {
    config: AnalysisConfig,
    graph: Option<ProgramGraph>,
    outcome: Option<AnalysisOutcome>,
}

impl Repl {
    pub fn new(config: AnalysisConfig) -> Repl {
        Repl { config, graph: None, outcome: None }
    }

    /// Reads commands from `input` until `quit` or end of input, writing
    /// replies to `output`.
    pub fn run_loop(&mut self, input: impl BufRead, mut output: impl Write) {
        for line in input.lines() {
            let line = match line {
                Ok(l) => l,
                Err(_) => break,
            };
            if self.execute_line(&line, &mut output) {
                break;
            }
        }
    }

    /// Executes one command line. Returns `true` if the REPL should stop
    /// (the `quit` command, or end of input handled by the caller).
    pub fn execute_line(&mut self, line: &str, output: &mut impl Write) -> bool {
        let words: Vec<&str> = line.split_whitespace().collect();
        let command = match words.first() {
            Some(&c) => c,
            None => return false,
        };
        match command {
            "file" => match words.get(1) {
                Some(path) => self.cmd_file(path, output),
                None => {
                    let _ = writeln!(output, "usage: file <path>");
                }
            },
            "info" => match words.get(1).copied() {
                Some("module") => self.cmd_info_module(output),
                _ => {
                    let _ = writeln!(output, "usage: info module");
                }
            },
            "start" => self.cmd_start(output),
            "run" => self.cmd_run(output),
            "dump" => match words.get(1) {
                Some(path) => self.cmd_dump(path, output),
                None => {
                    let _ = writeln!(output, "usage: dump <path>");
                }
            },
            "help" => self.cmd_help(output),
            "quit" => return true,
            other => {
                let _ = writeln!(output, "unknown command: \"{other}\".  Try \"help\".");
            }
        }
        false
    }

    pub fn cmd_file(&mut self, path: &str, output: &mut impl Write) {
        tracing::debug!(path, "loading program graph");
        match fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str::<ProgramGraph>(&text) {
                Ok(graph) => {
                    let _ = writeln!(output, "Loaded {} function(s) from {path}", graph.functions().len());
                    self.graph = Some(graph);
                    self.outcome = None;
                }
                Err(e) => {
                    let _ = writeln!(output, "failed to parse program graph: {e}");
                }
            },
            Err(e) => {
                let _ = writeln!(output, "failed to read {path}: {e}");
            }
        }
    }

    fn cmd_info_module(&self, output: &mut impl Write) {
        let Some(graph) = &self.graph else {
            let _ = writeln!(output, "No module is loaded.");
            return;
        };
        let root = graph.modules.root_id();
        let name = graph.modules.get_module(root).map(|m| m.name.as_str()).unwrap_or("<root>");
        let _ = writeln!(output, "Identifier: {name}");
        let _ = writeln!(output, "Functions: {}", graph.functions().len());
    }

    fn cmd_start(&mut self, output: &mut impl Write) {
        self.outcome = None;
        let _ = writeln!(output, "Ready to interpret.");
    }

    pub fn cmd_run(&mut self, output: &mut impl Write) {
        let Some(graph) = &self.graph else {
            let _ = writeln!(output, "No program is loaded.  Load a program first.");
            return;
        };
        tracing::info!("running analysis to a fixed point");
        let outcome = analyze(graph, &graph.types, &self.config);
        let suffix = outcome.error.as_ref().map(|e| format!(", stopped early: {e}")).unwrap_or_default();
        let _ = writeln!(output, "Analyzed {} function(s){suffix}", outcome.summaries.len());
        self.outcome = Some(outcome);
    }

    fn cmd_dump(&self, path: &str, output: &mut impl Write) {
        let Some(graph) = &self.graph else {
            let _ = writeln!(output, "No program is loaded.  Load a program first.");
            return;
        };
        let Some(outcome) = &self.outcome else {
            let _ = writeln!(output, "No analysis has been run yet.  Try \"run\" first.");
            return;
        };
        let text = dump::dump_program(graph, &outcome.summaries);
        match fs::write(path, text) {
            Ok(()) => {
                let _ = writeln!(output, "Interpretation state saved.");
            }
            Err(e) => {
                let _ = writeln!(output, "failed to write {path}: {e}");
            }
        }
    }

    fn cmd_help(&self, output: &mut impl Write) {
        let _ = writeln!(output, "Commands:");
        let _ = writeln!(output, "  file <path>   Load a program graph from a JSON file");
        let _ = writeln!(output, "  info module   Show the loaded program's module metadata");
        let _ = writeln!(output, "  start         Reset any previous analysis run");
        let _ = writeln!(output, "  run           Interpret the loaded program to a fixed point");
        let _ = writeln!(output, "  dump <path>   Write the last analysis run's textual dump to a file");
        let _ = writeln!(output, "  help          Show this message");
        let _ = writeln!(output, "  quit          Exit");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_command_does_not_stop_the_loop() {
        let mut repl = Repl::new(AnalysisConfig::default());
        let mut out = Vec::new();
        assert!(!repl.execute_line("frobnicate", &mut out));
        assert!(String::from_utf8(out).unwrap().contains("unknown command"));
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut repl = Repl::new(AnalysisConfig::default());
        let mut out = Vec::new();
        assert!(repl.execute_line("quit", &mut out));
    }

    #[test]
    fn run_without_a_loaded_program_reports_it() {
        let mut repl = Repl::new(AnalysisConfig::default());
        let mut out = Vec::new();
        repl.execute_line("run", &mut out);
        assert!(String::from_utf8(out).unwrap().contains("No program is loaded"));
    }
}
