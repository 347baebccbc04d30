//! LM Language abstract-interpretation REPL.
//!
//! Thin external collaborator: owns command parsing, file I/O, and help
//! text, and talks to `lmlang-absint` through its public `analyze`/`dump`
//! entry points. No analysis semantics live here.

use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use lmlang_absint::AnalysisConfig;

mod repl;

use repl::Repl;

/// LM Language abstract interpreter.
#[derive(Parser)]
#[command(name = "lmlang", about = "LM Language abstract interpretation REPL")]
struct Cli {
    /// Program graph JSON file to load before entering the command loop.
    file: Option<PathBuf>,

    /// IntegerSet cardinality threshold before it collapses to top.
    #[arg(long, default_value_t = AnalysisConfig::default().set_threshold)]
    set_threshold: usize,

    /// Basic-block visit count before the fixed-point loop starts widening.
    #[arg(long, default_value_t = AnalysisConfig::default().widening_threshold)]
    widening_threshold: u32,

    /// Stop the driver after this many worklist steps and return partial
    /// results (unbounded by default).
    #[arg(long)]
    step_budget: Option<u64>,
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = AnalysisConfig {
        set_threshold: cli.set_threshold,
        widening_threshold: cli.widening_threshold,
        step_budget: cli.step_budget,
        ..AnalysisConfig::default()
    };

    let mut repl = Repl::new(config);

    if let Some(path) = &cli.file {
        let mut startup_out = Vec::new();
        repl.cmd_file(&path.to_string_lossy(), &mut startup_out);
        let message = String::from_utf8_lossy(&startup_out);
        print!("{message}");
        if message.contains("failed to") {
            process::exit(1);
        }
    }

    let stdin = io::stdin();
    repl.run_loop(stdin.lock(), io::stdout());
    process::exit(0);
}
