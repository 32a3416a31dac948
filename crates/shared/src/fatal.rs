use std::process;

use tracing::error;

/// Exit code used when the process cannot start.
pub const STARTUP_FAILURE_EXIT_CODE: i32 = 1;

/// Log an error at the error level then exit the process.
///
/// The log guards are not dropped by `process::exit`, so the message is also printed to stderr in
/// case the non-blocking writers have not flushed yet.
pub fn log_and_exit<Err: core::fmt::Display>(error: Err, message: &str) -> ! {
    error!("{message}: {error}");
    eprintln!("{message}: {error}");

    process::exit(STARTUP_FAILURE_EXIT_CODE);
}

/// Extension trait for results that must succeed for the process to continue.
pub trait Fatal<T> {
    /// Return the value or log the error and exit.
    fn or_log_and_exit(self, message: &str) -> T;
}

impl<T, E: core::fmt::Display> Fatal<T> for Result<T, E> {
    fn or_log_and_exit(self, message: &str) -> T {
        match self {
            Ok(value) => value,
            Err(error) => log_and_exit(error, message),
        }
    }
}
