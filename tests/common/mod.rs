//! Common test utilities for the ingestor's CLI tests.
//!
//! This module provides:
//! - `TestEnv`: an isolated working directory plus helpers to run the binary
//! - Assertion macros: `assert_landed!`, `assert_output_contains!`
//! - Fixtures: reusable file contents

#![allow(dead_code)]

pub mod assertions;
pub mod env;
pub mod fixtures;

pub use assertions::*;
pub use env::*;
pub use fixtures::*;
