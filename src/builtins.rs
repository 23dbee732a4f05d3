use std::env;
use std::path::PathBuf;
use std::process;

use log::debug;

use crate::parser::ParsedCommand;
use crate::shell::ShellState;

/// Checks if the command is a built-in and, if so, runs it inside the shell
/// process. Supported built-ins are "exit", "cd", and "status".
/// Returns true if the command was built-in and handled; false otherwise.
pub fn handle_builtin(cmd: &ParsedCommand, state: &mut ShellState) -> bool {
    match cmd.program.as_str() {
        "exit" => {
            // Outstanding background children are left to the OS on purpose.
            if !state.jobs.is_empty() {
                debug!("exiting with background children still outstanding");
            }
            process::exit(0);
        }
        "cd" => {
            run_cd(cmd.arguments.first().map(String::as_str));
            true
        }
        "status" => {
            println!("{}", state.last_fg);
            true
        }
        _ => false,
    }
}

/// Changes the shell's working directory to `arg`, or to the home directory
/// when no argument is given. Failure is reported and leaves the current
/// directory unchanged.
fn run_cd(arg: Option<&str>) {
    let target = match arg {
        Some(path) => PathBuf::from(path),
        None => match home_dir() {
            Some(dir) => dir,
            None => {
                eprintln!("cd: cannot determine home directory");
                return;
            }
        },
    };
    if let Err(e) = env::set_current_dir(&target) {
        eprintln!("cd: {}: {}", target.display(), e);
    }
}

/// Home directory from $HOME, falling back to the platform lookup.
fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs_next::home_dir)
}
