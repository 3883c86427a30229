//! Fuzzer for the table loader.
//!
//! Table files come from disk, so loading and querying arbitrary bytes must
//! never panic.

#![no_main]
use libfuzzer_sys::fuzz_target;
use loctable::LocTable;

fuzz_target!(|data: (Vec<u8>, Vec<u8>)| {
    let (bytes, key) = data;
    let table = LocTable::from_bytes(bytes);
    let _ = table.get(&key);
    let _ = table.stats();
    for (stored, value) in table.entries() {
        assert!(!stored.contains(&0));
        assert!(!value.contains(&0));
    }
});
