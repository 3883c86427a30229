mod cli;
mod error;

use clap::Parser;
use cli::{Cli, Commands};
use error::{exit_with_error, CliError, CliResult};
use loctable::{LocTable, TableBuilder};
use std::ffi::OsStr;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

fn init_tracing(cli: &Cli) {
    //   --quiet   → "off"
    //   --verbose → RUST_LOG if set, otherwise "info"
    //   default   → "warn", so malformed tables are still reported
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("off")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(cli) {
        Ok(code) => code,
        Err(e) => exit_with_error(&e),
    }
}

fn run(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Commands::Build {
            input,
            languages,
            bucket_multiplier,
            buckets,
            reserve_mib,
        } => {
            let mut builder = TableBuilder::new();
            if let Some(multiplier) = bucket_multiplier {
                builder.bucket_multiplier(multiplier);
            }
            if let Some(mib) = reserve_mib {
                builder.arena_reserve(mib.saturating_mul(1 << 20));
            }
            builder.bucket_count(buckets);

            let written = loctable::generate(&input, &languages, &builder)?;
            let mut out = io::stdout().lock();
            for table in &written {
                writeln!(
                    out,
                    "{}: {} strings, {} bytes",
                    table.path.display(),
                    table.strings,
                    table.bytes
                )?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Get { table, key } => {
            let table = load(&table)?;
            let Some(value) = table.get(key_bytes(&key)?) else {
                tracing::debug!(key = ?key, "key not found");
                return Ok(ExitCode::from(error::EXIT_NOT_FOUND));
            };
            let mut out = io::stdout().lock();
            out.write_all(value)?;
            out.write_all(b"\n")?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Info { table: path } => {
            let table = load(&path)?;
            let stats = table.stats();
            let mut out = io::stdout().lock();
            writeln!(out, "file:             {}", path.display())?;
            writeln!(out, "size:             {} bytes", table.as_bytes().len())?;
            writeln!(out, "entries:          {}", stats.entries)?;
            writeln!(out, "buckets:          {}", stats.bucket_count)?;
            writeln!(out, "occupied buckets: {}", stats.occupied_buckets)?;
            writeln!(out, "longest chain:    {}", stats.longest_chain)?;
            writeln!(out, "string bytes:     {}", stats.blob_bytes)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Dump { table } => {
            let table = load(&table)?;
            let mut out = io::stdout().lock();
            for (key, value) in table.entries() {
                out.write_all(key)?;
                out.write_all(b"\t")?;
                out.write_all(value)?;
                out.write_all(b"\n")?;
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Load a table, treating one without buckets as an error.
fn load(path: &Path) -> CliResult<LocTable> {
    let table = loctable::load(path)?;
    if !table.is_valid() {
        return Err(CliError::InvalidTable(path.to_path_buf()));
    }
    Ok(table)
}

/// Raw bytes of a command line key.
#[cfg(unix)]
fn key_bytes(key: &OsStr) -> CliResult<&[u8]> {
    use std::os::unix::ffi::OsStrExt;
    Ok(key.as_bytes())
}

/// Raw bytes of a command line key, which must be UTF-8 here.
#[cfg(not(unix))]
fn key_bytes(key: &OsStr) -> CliResult<&[u8]> {
    key.to_str()
        .map(str::as_bytes)
        .ok_or_else(|| CliError::NonUtf8Key(key.to_owned()))
}
