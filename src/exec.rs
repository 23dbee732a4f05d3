use std::ffi::CString;
use std::process;

use log::debug;
use nix::errno::Errno;
use nix::fcntl::{open, OFlag};
use nix::libc::{STDIN_FILENO, STDOUT_FILENO};
use nix::sys::signal::{signal, SigHandler, Signal};
use nix::sys::stat::Mode;
use nix::sys::wait::waitpid;
use nix::unistd::{close, dup2, execvp, fork, ForkResult, Pid};

use crate::jobs::ExitInfo;
use crate::parser::{ParsedCommand, RedirKind};
use crate::shell::ShellState;
use crate::utils;

/// Spawns `cmd` as a child process. Foreground commands are waited on and
/// their termination recorded in `state.last_fg`; background commands are
/// announced by pid and left to the per-cycle reap sweep.
pub fn execute_command(cmd: &ParsedCommand, state: &mut ShellState) {
    debug!("spawning {:?}", cmd);
    match unsafe { fork() } {
        Ok(ForkResult::Child) => run_child(cmd),
        Ok(ForkResult::Parent { child }) => {
            if cmd.background {
                println!("background pid is {}", child);
                state.jobs.add(child);
            } else {
                state.last_fg = wait_foreground(child);
                debug!("foreground pid {} finished: {}", child, state.last_fg);
            }
        }
        // No child exists at this point, so this is not a bad command but
        // an unusable process table; the whole shell goes down.
        Err(e) => utils::fatal(&format!("cannot spawn child process: {}", e)),
    }
}

/// Blocks until `child` terminates and decodes how it ended.
fn wait_foreground(child: Pid) -> ExitInfo {
    loop {
        match waitpid(child, None) {
            Ok(status) => {
                if let Some(info) = ExitInfo::from_wait_status(status) {
                    return info;
                }
            }
            Err(Errno::EINTR) => continue,
            Err(e) => {
                eprintln!("smallsh: wait failed for pid {}: {}", child, e);
                return ExitInfo::Exited(1);
            }
        }
    }
}

/// Child side of the fork. Any setup failure is reported on the child's
/// stderr and turned into a non-zero exit; the child never falls through
/// to exec with half-applied redirections.
fn run_child(cmd: &ParsedCommand) -> ! {
    match prepare_and_exec(cmd) {
        Ok(never) => match never {},
        Err(msg) => {
            eprintln!("{}", msg);
            process::exit(1);
        }
    }
}

/// Child setup in load-bearing order: signal dispositions, then
/// redirections, then the program image. Returns only on failure.
fn prepare_and_exec(cmd: &ParsedCommand) -> Result<std::convert::Infallible, String> {
    // 1. Signals. Background children keep the ignore inherited from the
    //    shell; foreground children take the default terminate action.
    //    No child ever reacts to the mode-toggle signal.
    unsafe {
        if !cmd.background {
            signal(Signal::SIGINT, SigHandler::SigDfl)
                .map_err(|e| format!("cannot reset SIGINT: {}", e))?;
        }
        signal(Signal::SIGTSTP, SigHandler::SigIgn)
            .map_err(|e| format!("cannot ignore SIGTSTP: {}", e))?;
    }

    // 2. Redirections, in parse order so a later one on the same stream wins.
    for (kind, path) in &cmd.redirections {
        apply_redirection(*kind, path)?;
    }

    // 3. Program image, resolved through PATH.
    let program = CString::new(cmd.program.as_str())
        .map_err(|_| format!("{}: invalid program name", cmd.program))?;
    let mut argv = vec![program.clone()];
    for arg in &cmd.arguments {
        argv.push(
            CString::new(arg.as_str()).map_err(|_| format!("{}: invalid argument", arg))?,
        );
    }
    match execvp(&program, &argv) {
        Ok(never) => match never {},
        Err(e) => Err(format!("{}: {}", cmd.program, e)),
    }
}

fn apply_redirection(kind: RedirKind, path: &str) -> Result<(), String> {
    let (fd, target) = match kind {
        RedirKind::Input => {
            let fd = open(path, OFlag::O_RDONLY, Mode::empty())
                .map_err(|e| format!("cannot open {} for input: {}", path, e))?;
            (fd, STDIN_FILENO)
        }
        RedirKind::Output => {
            let fd = open(
                path,
                OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
                Mode::from_bits_truncate(0o644),
            )
            .map_err(|e| format!("cannot open {} for output: {}", path, e))?;
            (fd, STDOUT_FILENO)
        }
    };
    dup2(fd, target).map_err(|e| format!("cannot redirect {}: {}", path, e))?;
    close(fd).map_err(|e| format!("cannot close descriptor for {}: {}", path, e))?;
    Ok(())
}
