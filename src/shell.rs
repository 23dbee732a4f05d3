use std::io::{self, Write};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;

use crate::builtins::handle_builtin;
use crate::exec::execute_command;
use crate::jobs::{ExitInfo, Jobs};
use crate::parser;

/// Prompt printed before each read.
pub static PROMPT: &str = ": ";

/// Session-wide interpreter state. `fg_only` is the only field shared with
/// the signal handler; everything else belongs to the single-threaded main
/// flow and needs no synchronization.
pub struct ShellState {
    pub fg_only: Arc<AtomicBool>,
    pub last_fg: ExitInfo,
    pub jobs: Jobs,
}

impl ShellState {
    pub fn new(fg_only: Arc<AtomicBool>) -> Self {
        ShellState {
            fg_only,
            last_fg: ExitInfo::default(),
            jobs: Jobs::new(),
        }
    }
}

/// Runs the main shell loop: prints the prompt (if enabled), reads input,
/// parses and dispatches it, then sweeps for finished background children
/// before the next prompt.
///
/// - `emit_prompt`: if true, prints the command prompt.
/// - `fg_only`: the mode flag shared with the SIGTSTP handler.
pub fn run_shell(emit_prompt: bool, fg_only: Arc<AtomicBool>) {
    let mut state = ShellState::new(fg_only);
    let pid = process::id().to_string();

    loop {
        if emit_prompt {
            print!("{}", PROMPT);
            io::stdout().flush().unwrap();
        }

        let mut cmdline = String::new();
        match io::stdin().read_line(&mut cmdline) {
            Ok(0) => break, // End-of-file (Ctrl-D)
            Ok(_) => {
                if !should_skip(&cmdline) {
                    run_command(&cmdline, &pid, &mut state);
                }
                state.jobs.reap_finished();
            }
            Err(e) => {
                eprintln!("smallsh: error reading input: {}", e);
                break;
            }
        }
    }
}

/// One command cycle: tokenize and expand, parse against the current mode,
/// then dispatch to a built-in or spawn the program.
fn run_command(cmdline: &str, pid: &str, state: &mut ShellState) {
    let tokens = parser::tokenize(cmdline, pid);
    let fg_only = state.fg_only.load(Ordering::SeqCst);
    match parser::parse(tokens, fg_only) {
        Ok(command) => {
            debug!("parsed {:?}", command);
            if !handle_builtin(&command, state) {
                execute_command(&command, state);
            }
        }
        Err(e) => eprintln!("smallsh: {}", e),
    }
}

/// Comment lines, blank lines, and lines starting with whitespace are
/// silently treated as no-ops.
fn should_skip(line: &str) -> bool {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.is_empty() || line.starts_with('#') || line.starts_with(|c: char| c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_comment_lines() {
        assert!(should_skip("# a comment\n"));
        assert!(should_skip("#ls\n"));
    }

    #[test]
    fn test_skip_blank_lines() {
        assert!(should_skip("\n"));
        assert!(should_skip(""));
    }

    #[test]
    fn test_skip_lines_starting_with_whitespace() {
        assert!(should_skip(" ls\n"));
        assert!(should_skip("\techo hi\n"));
    }

    #[test]
    fn test_regular_lines_are_not_skipped() {
        assert!(!should_skip("ls -l\n"));
        assert!(!should_skip("echo # not a comment\n"));
    }
}
