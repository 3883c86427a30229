//! Fuzzer for the source parser and encoder.
//!
//! Whatever rows the parser finds must come back out of the built tables.

#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use loctable::{LocTable, SourceReader, TableBuilder};

#[derive(Clone, Debug, Arbitrary)]
struct Input {
    languages: u8,
    buckets: Option<u8>,
    source: Vec<u8>,
}

fuzz_target!(|input: Input| {
    // NUL terminates stored strings, so it can't appear in source text.
    if input.source.contains(&0) {
        return;
    }
    let languages = usize::from(input.languages % 4) + 1;
    let mut builder = TableBuilder::new();
    builder
        .arena_reserve(1 << 24)
        .bucket_count(input.buckets.map(usize::from));
    let Ok(tables) = builder.encode(&input.source, languages) else {
        return;
    };
    let tables: Vec<LocTable> = tables.into_iter().map(LocTable::from_bytes).collect();

    let mut reader = SourceReader::new(&input.source);
    let mut rows = 0;
    while let Some(row) = reader.next_row(languages) {
        rows += 1;
        // Keys without escapes are found by their own spelling.
        if !row[0].contains(&b'|') {
            for table in &tables {
                assert!(table.get(row[0]).is_some());
            }
        }
    }
    for table in &tables {
        assert!(table.is_valid());
        assert_eq!(table.stats().entries, rows);
        assert_eq!(table.entries().count(), rows);
    }
});
