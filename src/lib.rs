//! EXA interpreter library.
//!
//! Provides the parser, the execution engine and the file store for EXA
//! programs, plus the logging macros the `exa` binary uses.

pub mod utils;
pub mod virtual_machine;
