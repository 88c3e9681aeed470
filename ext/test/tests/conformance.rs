//! Conformance tests that run YAML fixtures against gqtmatch
//!
//! Run with: cargo test -p gqtmatch-test --test conformance --features gqtmatch-test/fixtures
//!
//! Note: This test file requires the `fixtures` feature to be enabled.

#![cfg(feature = "fixtures")]

use gqtmatch_test::fixture::Fixture;
use std::fs;
use std::path::{Path, PathBuf};

/// The `fixtures` directory at the workspace root
fn fixtures_dir() -> PathBuf {
    // ext/test -> ext -> workspace root
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(Path::parent)
        .expect("Could not find workspace root")
        .join("fixtures")
}

/// Load and run all fixtures in a directory
fn run_fixtures_in_dir(dir: &Path) {
    assert!(dir.exists(), "Fixtures directory does not exist: {}", dir.display());

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| entry.expect("dir entry").path())
        .filter(|path| path.extension().is_some_and(|e| e == "yaml" || e == "yml"))
        .collect();
    paths.sort();
    assert!(!paths.is_empty(), "No fixtures in {}", dir.display());

    for path in paths {
        println!("Running fixture: {}", path.display());

        let yaml = fs::read_to_string(&path).expect("read yaml");
        let fixtures = Fixture::from_yaml_multi(&yaml).unwrap_or_else(|e| {
            panic!("Failed to parse {}: {}", path.display(), e);
        });

        for fixture in fixtures {
            println!("  Running: {}", fixture.name);
            fixture.run_and_assert();
        }
    }
}

#[test]
fn test_constraints() {
    run_fixtures_in_dir(&fixtures_dir().join("01_constraints"));
}

#[test]
fn test_selections() {
    run_fixtures_in_dir(&fixtures_dir().join("02_selections"));
}

#[test]
fn test_init() {
    run_fixtures_in_dir(&fixtures_dir().join("03_init"));
}

#[test]
fn test_operations() {
    run_fixtures_in_dir(&fixtures_dir().join("04_operations"));
}
