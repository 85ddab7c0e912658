//! Integration tests module that includes all integration test files.

#[path = "integration/workbook_tests.rs"]
mod workbook_tests;

#[path = "integration/bbn_tests.rs"]
mod bbn_tests;

#[path = "integration/cccg_tests.rs"]
mod cccg_tests;

#[path = "integration/workflow_tests.rs"]
mod workflow_tests;
