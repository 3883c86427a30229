#![cfg_attr(docsrs, feature(doc_auto_cfg, doc_cfg))]
#![doc = include_str!("../README.md")]
// @@ begin lint list maintained by maint/add_warning @@
#![allow(renamed_and_removed_lints)] // @@REMOVE_WHEN(ci_arti_stable)
#![allow(unknown_lints)] // @@REMOVE_WHEN(ci_arti_nightly)
#![warn(missing_docs)]
#![warn(noop_method_call)]
#![warn(unreachable_pub)]
#![warn(clippy::all)]
#![deny(clippy::await_holding_lock)]
#![deny(clippy::cargo_common_metadata)]
#![deny(clippy::cast_lossless)]
#![deny(clippy::checked_conversions)]
#![warn(clippy::cognitive_complexity)]
#![deny(clippy::debug_assert_with_mut_call)]
#![deny(clippy::exhaustive_enums)]
#![deny(clippy::exhaustive_structs)]
#![deny(clippy::expl_impl_clone_on_copy)]
#![deny(clippy::fallible_impl_from)]
#![deny(clippy::implicit_clone)]
#![deny(clippy::large_stack_arrays)]
#![warn(clippy::manual_ok_or)]
#![deny(clippy::missing_docs_in_private_items)]
#![warn(clippy::needless_borrow)]
#![warn(clippy::needless_pass_by_value)]
#![warn(clippy::option_option)]
#![deny(clippy::print_stderr)]
#![deny(clippy::print_stdout)]
#![warn(clippy::rc_buffer)]
#![deny(clippy::ref_option_ref)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(clippy::trait_duplication_in_bounds)]
#![deny(clippy::unchecked_duration_subtraction)]
#![deny(clippy::unnecessary_wraps)]
#![warn(clippy::unseparated_literal_suffix)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::mod_module_files)]
#![allow(clippy::let_unit_value)] // This can reasonably be done for explicitness
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::significant_drop_in_scrutinee)] // arti/-/merge_requests/588/#note_2812945
#![allow(clippy::result_large_err)] // temporary workaround for arti#587
#![allow(clippy::needless_raw_string_hashes)] // complained-about code is fine, often best
#![allow(clippy::needless_lifetimes)] // See arti#1765
//! <!-- @@ end lint list maintained by maint/add_warning @@ -->

mod arena;
mod builder;
mod err;
mod files;
mod format;
mod hash;
mod source;
mod table;

use std::path::Path;

pub use arena::{Arena, ARENA_ALIGNMENT, DEFAULT_ARENA_RESERVE};
pub use builder::{EncodedTables, TableBuilder, DEFAULT_BUCKET_MULTIPLIER};
pub use err::{ArenaError, Error};
pub use files::{generate, output_path, read_source, write_table, GeneratedTable, TABLE_EXTENSION};
pub use format::WORD_SIZE;
pub use hash::fnv1a;
pub use source::{unescape_into, unescaped_len, Row, SourceReader};
pub use table::{Entries, LocTable, TableStats};

/// Largest number of language columns a single build supports
///
/// The canonical key column counts as one of them.
pub const MAX_LANGUAGES: usize = 32;

/// Encode pipe-delimited `source` into one table per language column,
/// using default [`TableBuilder`] options.
///
/// Table `i` maps each canonical key to the row's column `i`. Table 0 maps
/// every key to itself.
pub fn encode(source: &[u8], language_count: usize) -> Result<Vec<Vec<u8>>, Error> {
    TableBuilder::new().encode(source, language_count)
}

/// Load a table file.
///
/// See [`LocTable::load`].
pub fn load(path: impl AsRef<Path>) -> Result<LocTable, Error> {
    LocTable::load(path)
}
