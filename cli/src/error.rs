use std::path::PathBuf;
use std::process::ExitCode;

/// Exit code for a lookup that found nothing.
pub const EXIT_NOT_FOUND: u8 = 1;
/// Exit code for a failed command, the same one clap uses for usage errors.
pub const EXIT_ERROR: u8 = 2;

/// Unified error type for CLI operations.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from the table library.
    #[error(transparent)]
    Table(#[from] loctable::Error),
    /// A table file that loaded but holds no buckets.
    #[error("{} is not a valid table", .0.display())]
    InvalidTable(PathBuf),
    /// A key that can't be passed to the table as bytes on this platform.
    #[cfg_attr(unix, allow(dead_code))]
    #[error("key {0:?} is not valid UTF-8")]
    NonUtf8Key(std::ffi::OsString),
    /// Writing results to stdout failed.
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;

/// Report an error on stderr and produce the matching exit code.
pub fn exit_with_error(err: &CliError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(EXIT_ERROR)
}
