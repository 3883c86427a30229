use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "loctable", about = "Build and query localization tables", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log progress to stderr (RUST_LOG overrides the level)
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress all log output
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build one table per language from a pipe-delimited source file
    ///
    /// Tables are written next to the source: `strings.txt` with languages
    /// `en fr` gives `strings.en.loc` and `strings.fr.loc`.
    Build {
        /// Source file
        input: PathBuf,

        /// Language of each column, canonical key column first
        #[arg(required = true)]
        languages: Vec<String>,

        /// Buckets to allocate per row
        #[arg(long, value_name = "N")]
        bucket_multiplier: Option<usize>,

        /// Fixed bucket count, rounded up to a power of two
        #[arg(long, value_name = "N")]
        buckets: Option<usize>,

        /// Build arena reservation in MiB
        #[arg(long, value_name = "N")]
        reserve_mib: Option<usize>,
    },

    /// Print the value stored for a key (exits 1 if there is none, 2 on error)
    Get {
        /// Table file
        table: PathBuf,

        /// Canonical key, matched byte for byte
        key: OsString,
    },

    /// Print bucket statistics for a table
    Info {
        /// Table file
        table: PathBuf,
    },

    /// Print every key and value, tab separated, in source order
    Dump {
        /// Table file
        table: PathBuf,
    },
}
