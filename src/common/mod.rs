pub mod io;

#[cfg(test)]
mod tests;

/// Name used in diagnostics: the binary name without its 'f' prefix,
/// e.g. "fprune" -> "prune".
#[inline]
pub fn tool_name(binary_name: &str) -> &str {
    binary_name.strip_prefix('f').unwrap_or(binary_name)
}

/// Restore the default SIGPIPE action so a closed output pipe ends the
/// process quietly (exit 141) instead of surfacing as a write error.
/// Call at the start of main().
#[inline]
pub fn reset_sigpipe() {
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

/// Format an IO error message without the "(os error N)" suffix that
/// Rust's Display impl appends.
pub fn io_error_msg(e: &std::io::Error) -> String {
    if let Some(raw) = e.raw_os_error() {
        let os_err = std::io::Error::from_raw_os_error(raw);
        let msg = format!("{}", os_err);
        msg.replace(&format!(" (os error {})", raw), "")
    } else {
        format!("{}", e)
    }
}
