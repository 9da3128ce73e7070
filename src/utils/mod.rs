//! Shared helpers: logging macros and test fixtures.

pub mod log;
pub mod test_utils;
