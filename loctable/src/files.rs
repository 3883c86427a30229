//! Reading source files and writing table files
//!
//! A generator run reads one source file, builds every language's table in
//! a single arena, then writes one file per language next to the input.

use crate::arena::Arena;
use crate::builder::{check_language_count, TableBuilder};
use crate::err::Error;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Extension shared by all table files
pub const TABLE_EXTENSION: &str = "loc";

/// Path of the table file for `language`, derived from the source path.
///
/// The source's final extension is replaced, so `strings.txt` and `fr` give
/// `strings.fr.loc`. A source without an extension keeps its whole name.
pub fn output_path(input: &Path, language: &str) -> PathBuf {
    let extension = format!("{language}.{TABLE_EXTENSION}");
    if input.extension().is_some() {
        input.with_extension(extension)
    } else {
        let mut name = input.as_os_str().to_owned();
        name.push(".");
        name.push(extension);
        PathBuf::from(name)
    }
}

/// Read a whole file into a fresh arena region.
///
/// An empty file reads as an empty slice. Pipes and other files without a
/// known size are read to their end first, then copied into the arena.
pub fn read_source<'a>(arena: &'a Arena, path: &Path) -> Result<&'a [u8], Error> {
    let mut file = File::open(path).map_err(|e| Error::io(path, e))?;
    let metadata = file.metadata().map_err(|e| Error::io(path, e))?;
    if !metadata.is_file() {
        let mut data = Vec::new();
        file.read_to_end(&mut data).map_err(|e| Error::io(path, e))?;
        let buf = arena.allocate(data.len())?;
        buf.copy_from_slice(&data);
        return Ok(buf);
    }
    let buf = arena.allocate(usize::try_from(metadata.len()).unwrap_or(usize::MAX))?;
    file.read_exact(buf).map_err(|e| Error::io(path, e))?;
    Ok(buf)
}

/// Write one serialized table, replacing any existing file.
pub fn write_table(path: &Path, bytes: &[u8]) -> Result<(), Error> {
    std::fs::write(path, bytes).map_err(|e| Error::io(path, e))
}

/// One table file written by [`generate`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct GeneratedTable {
    /// Language name the table was written for
    pub language: String,
    /// Where the table was written
    pub path: PathBuf,
    /// Number of strings in the table
    pub strings: usize,
    /// Size of the table file in bytes
    pub bytes: usize,
}

/// Build and write one table per language from the source file at `input`.
///
/// `languages` names every column in order, the canonical key column
/// included, and fixes the column count. Each table is written to
/// [`output_path`]. A bad language count is reported before the source is
/// read. The run stops at the first write that fails; tables written before
/// it are left in place.
pub fn generate<S: AsRef<str>>(
    input: &Path,
    languages: &[S],
    builder: &TableBuilder,
) -> Result<Vec<GeneratedTable>, Error> {
    check_language_count(languages.len())?;
    let arena = Arena::new(builder.reserve())?;
    let source = read_source(&arena, input)?;
    let tables = builder.build(&arena, source, languages.len())?;

    let mut written = Vec::with_capacity(tables.len());
    for (language, table) in languages.iter().zip(tables.iter()) {
        let language = language.as_ref();
        let path = output_path(input, language);
        write_table(&path, table)?;
        tracing::info!(
            path = %path.display(),
            strings = tables.row_count(),
            bytes = table.len(),
            "created table"
        );
        written.push(GeneratedTable {
            language: language.to_owned(),
            path,
            strings: tables.row_count(),
            bytes: table.len(),
        });
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_names() {
        assert_eq!(
            output_path(Path::new("data/strings.txt"), "fr"),
            PathBuf::from("data/strings.fr.loc")
        );
        assert_eq!(
            output_path(Path::new("strings"), "en"),
            PathBuf::from("strings.en.loc")
        );
        assert_eq!(
            output_path(Path::new("ui.v2.txt"), "jp"),
            PathBuf::from("ui.v2.jp.loc")
        );
    }
}
