//! Shared helpers for the BAHAMAS integration tests.

use std::path::PathBuf;

/// Directory holding the bundled CSV and TOML fixtures.
pub fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Path of one fixture file or directory.
pub fn fixture(name: &str) -> PathBuf {
    fixture_dir().join(name)
}

pub fn assert_close(actual: f64, expected: f64, tol: f64, label: &str) {
    assert!(
        (actual - expected).abs() <= tol,
        "{label}: expected {expected}, got {actual} (tol {tol})"
    );
}

/// Relative-tolerance variant of [`assert_close`].
pub fn assert_rel_close(actual: f64, expected: f64, rel: f64, label: &str) {
    assert!(
        ((actual - expected) / expected).abs() <= rel,
        "{label}: expected {expected}, got {actual} (rel {rel})"
    );
}
