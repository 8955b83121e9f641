//! End-to-end tests for the stackwatch binary
//!
//! Each test runs the compiled CLI in an isolated working directory so no
//! user configuration leaks into the run.

pub mod helpers;
pub mod replay;

pub use helpers::*;
