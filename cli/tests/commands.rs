//! Run the `loctable` binary against tables in a scratch directory

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const STRINGS: &str = "hello | bonjour | konnichiwa |bye | au revoir | sayonara |";

fn loctable() -> Command {
    Command::new(env!("CARGO_BIN_EXE_loctable"))
}

/// Write the sample source and build its tables, returning the source path.
fn build_sample(dir: &Path) -> PathBuf {
    let input = dir.join("strings.txt");
    fs::write(&input, STRINGS).unwrap();
    let out = loctable()
        .args(["build", "-q"])
        .arg(&input)
        .args(["en", "fr", "jp"])
        .output()
        .unwrap();
    assert!(out.status.success(), "{out:?}");
    input
}

fn stdout(out: &Output) -> String {
    String::from_utf8(out.stdout.clone()).unwrap()
}

#[test]
fn build_reports_each_table() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("strings.txt");
    fs::write(&input, STRINGS).unwrap();

    let out = loctable()
        .arg("build")
        .arg(&input)
        .args(["en", "fr", "jp", "--bucket-multiplier", "4"])
        .output()
        .unwrap();
    assert!(out.status.success(), "{out:?}");
    let text = stdout(&out);
    assert_eq!(text.lines().count(), 3);
    for language in ["en", "fr", "jp"] {
        let path = dir.path().join(format!("strings.{language}.loc"));
        assert!(path.is_file());
        assert!(text.contains(&format!("{}: 2 strings", path.display())));
    }
}

#[test]
fn get_prints_value() {
    let dir = tempfile::tempdir().unwrap();
    build_sample(dir.path());
    let out = loctable()
        .arg("get")
        .arg(dir.path().join("strings.fr.loc"))
        .arg("bye")
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(stdout(&out), "au revoir\n");
}

#[test]
fn get_miss_and_error_exit_codes_differ() {
    let dir = tempfile::tempdir().unwrap();
    build_sample(dir.path());

    let miss = loctable()
        .arg("get")
        .arg(dir.path().join("strings.jp.loc"))
        .arg("thanks")
        .output()
        .unwrap();
    assert_eq!(miss.status.code(), Some(1));
    assert!(miss.stdout.is_empty());

    let missing_table = loctable()
        .arg("get")
        .arg(dir.path().join("strings.de.loc"))
        .arg("hello")
        .output()
        .unwrap();
    assert_eq!(missing_table.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&missing_table.stderr).contains("error:"));
}

#[cfg(unix)]
#[test]
fn get_accepts_non_utf8_keys() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("latin1.txt");
    fs::write(&input, b"caf\xe9|coffee|").unwrap();
    let built = loctable()
        .args(["build", "-q"])
        .arg(&input)
        .args(["key", "en"])
        .output()
        .unwrap();
    assert!(built.status.success(), "{built:?}");

    let out = loctable()
        .arg("get")
        .arg(dir.path().join("latin1.en.loc"))
        .arg(OsStr::from_bytes(b"caf\xe9"))
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(out.stdout, b"coffee\n");
}

#[test]
fn info_prints_stats() {
    let dir = tempfile::tempdir().unwrap();
    build_sample(dir.path());
    let out = loctable()
        .arg("info")
        .arg(dir.path().join("strings.fr.loc"))
        .output()
        .unwrap();
    assert!(out.status.success(), "{out:?}");
    let text = stdout(&out);
    let field = |name: &str| {
        text.lines()
            .find_map(|line| line.strip_prefix(name))
            .map(|rest| rest.trim_start_matches(':').trim().to_owned())
            .unwrap()
    };
    assert_eq!(field("entries"), "2");
    assert_eq!(field("buckets"), "16");
}

#[test]
fn dump_lists_entries_in_source_order() {
    let dir = tempfile::tempdir().unwrap();
    build_sample(dir.path());
    let out = loctable()
        .arg("dump")
        .arg(dir.path().join("strings.fr.loc"))
        .output()
        .unwrap();
    assert!(out.status.success(), "{out:?}");
    assert_eq!(stdout(&out), "hello\tbonjour\nbye\tau revoir\n");
}

#[test]
fn invalid_table_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.loc");
    fs::write(&path, [0_u8; 3]).unwrap();
    let out = loctable().args(["info", "-q"]).arg(&path).output().unwrap();
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("not a valid table"));
}

#[test]
fn build_rejects_too_many_languages() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("strings.txt");
    fs::write(&input, STRINGS).unwrap();
    let languages: Vec<String> = (0..33).map(|i| format!("l{i}")).collect();
    let out = loctable()
        .arg("build")
        .arg(&input)
        .args(&languages)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("too many languages"));
    assert!(!dir.path().join("strings.l0.loc").exists());
}
