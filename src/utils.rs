use std::process;

pub fn print_usage() -> ! {
    println!("Usage: smallsh [-hvp]");
    println!("   -h   Print this help message");
    println!("   -v   Enable debug logging");
    println!("   -p   Do not print a command prompt");
    process::exit(1);
}

/// Reports an unrecoverable error and terminates the shell with status 1.
pub fn fatal(msg: &str) -> ! {
    eprintln!("smallsh: {}", msg);
    process::exit(1);
}
