mod builtins;
mod exec;
mod jobs;
mod parser;
mod shell;
mod signals;
mod utils;

use std::env;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use log::LevelFilter;

fn main() {
    // Parse command-line arguments.
    let args: Vec<String> = env::args().collect();
    let mut emit_prompt = true;
    let mut verbose = false;
    for arg in &args[1..] {
        match arg.as_str() {
            "-h" => utils::print_usage(),
            "-v" => verbose = true,
            "-p" => emit_prompt = false,
            _ => {}
        }
    }

    // Traces go to stderr; stdout carries the shell's own output protocol.
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();

    // Foreground-only mode flag, shared with the SIGTSTP handler.
    let fg_only = Arc::new(AtomicBool::new(false));
    if let Err(e) = signals::install_signal_handlers(&fg_only) {
        utils::fatal(&format!("cannot install signal handlers: {}", e));
    }

    // Run the main shell loop.
    shell::run_shell(emit_prompt, fg_only);
}
