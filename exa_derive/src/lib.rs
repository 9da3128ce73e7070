//! Derive macros for the exa crate.
//!
//! Provides `#[derive(Error)]`, which generates `Display` and
//! `std::error::Error` for the interpreter's error types.

mod error;

use proc_macro::TokenStream;

/// Automatically implements `Display` and `Error` traits for error types.
#[proc_macro_derive(Error, attributes(error))]
pub fn derive_error(input: TokenStream) -> TokenStream {
    error::derive_error(input)
}
