use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use nix::sys::signal::{signal, SigHandler, Signal};
use signal_hook::consts::signal::SIGTSTP;
use signal_hook::low_level;

const ENTER_FG_ONLY: &[u8] = b"\nEntering foreground-only mode (& is now ignored)\n";
const EXIT_FG_ONLY: &[u8] = b"\nExiting foreground-only mode\n";

/// Installs the session-lifetime signal dispositions:
///
/// - SIGINT is ignored by the shell itself. The ignore disposition survives
///   fork and exec, so background children inherit it; foreground children
///   restore the default action before exec, which is how Ctrl-C interrupts
///   a running foreground command without killing the shell.
/// - SIGTSTP toggles foreground-only mode. The handler is limited to one
///   atomic flag flip and one raw write(2) of a fixed message; it performs
///   no allocation, no formatting, and no reaping.
pub fn install_signal_handlers(fg_only: &Arc<AtomicBool>) -> io::Result<()> {
    unsafe { signal(Signal::SIGINT, SigHandler::SigIgn) }.map_err(io::Error::from)?;

    let flag = Arc::clone(fg_only);
    unsafe {
        low_level::register(SIGTSTP, move || {
            let was_on = flag.fetch_xor(true, Ordering::SeqCst);
            let msg = if was_on { EXIT_FG_ONLY } else { ENTER_FG_ONLY };
            let _ = nix::unistd::write(nix::libc::STDOUT_FILENO, msg);
        })
    }?;
    Ok(())
}
