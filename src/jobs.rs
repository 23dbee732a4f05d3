use std::fmt;

use log::debug;
use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

/// How the last foreground child (or a reaped background child) ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitInfo {
    Exited(i32),
    Signaled(i32),
}

impl Default for ExitInfo {
    /// Before any foreground child has run, `status` reports exit value 0.
    fn default() -> Self {
        ExitInfo::Exited(0)
    }
}

impl fmt::Display for ExitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitInfo::Exited(code) => write!(f, "exit value {}", code),
            ExitInfo::Signaled(sig) => write!(f, "terminated by signal {}", sig),
        }
    }
}

impl ExitInfo {
    /// Decodes a termination report. Stop and continue events carry no
    /// exit information; children of this shell never stop (they ignore
    /// the mode-toggle signal), so those map to `None`.
    pub fn from_wait_status(status: WaitStatus) -> Option<ExitInfo> {
        match status {
            WaitStatus::Exited(_, code) => Some(ExitInfo::Exited(code)),
            WaitStatus::Signaled(_, sig, _) => Some(ExitInfo::Signaled(sig as i32)),
            _ => None,
        }
    }
}

/// Background children spawned and not yet confirmed reaped.
#[derive(Default)]
pub struct Jobs {
    pids: Vec<Pid>,
}

impl Jobs {
    pub fn new() -> Self {
        Jobs { pids: Vec::new() }
    }

    pub fn add(&mut self, pid: Pid) {
        debug!("tracking background pid {}", pid);
        self.pids.push(pid);
    }

    pub fn is_empty(&self) -> bool {
        self.pids.is_empty()
    }

    /// Reaps every immediately-collectable child, printing the completion
    /// notice for each, and returns without blocking. Safe to call with no
    /// outstanding children: it produces no output and returns at once.
    pub fn reap_finished(&mut self) {
        loop {
            match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::StillAlive) => break,
                Ok(status) => {
                    let pid = match status.pid() {
                        Some(pid) => pid,
                        None => break,
                    };
                    if let Some(info) = ExitInfo::from_wait_status(status) {
                        println!("background pid {} is done: {}", pid, info);
                        self.pids.retain(|p| *p != pid);
                    }
                }
                Err(Errno::ECHILD) => break, // no children exist at all
                Err(e) => {
                    debug!("reap sweep stopped: {}", e);
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_info_rendering() {
        assert_eq!(ExitInfo::Exited(2).to_string(), "exit value 2");
        assert_eq!(ExitInfo::Signaled(9).to_string(), "terminated by signal 9");
    }

    #[test]
    fn test_exit_info_default_is_exit_zero() {
        assert_eq!(ExitInfo::default().to_string(), "exit value 0");
    }

    #[test]
    fn test_decode_wait_status() {
        let exited = WaitStatus::Exited(Pid::from_raw(100), 3);
        assert_eq!(
            ExitInfo::from_wait_status(exited),
            Some(ExitInfo::Exited(3))
        );
        let signaled =
            WaitStatus::Signaled(Pid::from_raw(100), nix::sys::signal::Signal::SIGKILL, false);
        assert_eq!(
            ExitInfo::from_wait_status(signaled),
            Some(ExitInfo::Signaled(9))
        );
    }

    #[test]
    fn test_reap_with_no_children_is_a_no_op() {
        let mut jobs = Jobs::new();
        jobs.reap_finished();
        assert!(jobs.is_empty());
    }
}
