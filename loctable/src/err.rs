//! Error types for the `loctable` crate

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Errors applicable to building, writing, and loading localization tables
///
/// A lookup miss is never an error; [`crate::LocTable::get`] reports it as
/// `None`. A table file that is too short or internally inconsistent is also
/// not an error: it loads as an empty table.
#[derive(Clone, Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A table build was requested with zero language columns.
    ///
    /// Column 0 is the canonical key, so at least one column is required.
    #[error("at least one language column is required")]
    NoLanguages,

    /// More language columns were requested than a single build supports.
    #[error("too many languages: {requested} requested, at most {max} are supported")]
    TooManyLanguages {
        /// Number of language columns that was requested
        requested: usize,
        /// Largest supported number of language columns
        max: usize,
    },

    /// The build arena could not satisfy a request.
    ///
    /// This is a sizing problem, not a transient condition. Retrying with the
    /// same reservation will fail the same way.
    #[error("build arena failure: {0}")]
    Arena(#[from] ArenaError),

    /// Reading a source file or reading/writing a table file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File the operation was working on
        path: PathBuf,
        /// Underlying operating system error
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl Error {
    /// Wrap an [`std::io::Error`] together with the path it concerns.
    pub(crate) fn io(path: &Path, err: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source: Arc::new(err),
        }
    }
}

/// Errors from reserving or carving memory out of an [`crate::Arena`]
#[derive(Clone, Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ArenaError {
    /// The operating system refused to reserve the address range.
    #[error("failed to reserve {size} bytes of address space: {source}")]
    Reserve {
        /// Size of the reservation, already rounded up to whole pages
        size: usize,
        /// Underlying operating system error
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The request does not fit in what remains of the reservation.
    ///
    /// Regions handed out before the failed request are unaffected.
    #[error("allocation of {requested} bytes exceeds the arena reservation ({used} of {reserved} bytes in use)")]
    Exhausted {
        /// Size of the failed request, in bytes
        requested: usize,
        /// Bytes already carved from the arena, including alignment padding
        used: usize,
        /// Total reservation, in bytes
        reserved: usize,
    },

    /// Committing additional pages inside the reservation failed.
    #[error("failed to commit arena pages: {0}")]
    Commit(#[source] Arc<std::io::Error>),
}
