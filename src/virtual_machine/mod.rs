//! Interpreter for a small EXA-style register machine assembly language.
//!
//! A program is plain text, one instruction per line. It is parsed once into
//! a [`program::Program`] and then executed by a [`vm::VM`] against a file
//! store supplied by the caller.
//!
//! # Machine model
//!
//! - **Registers**: `T` and `X` hold integers (or the "no result" marker left
//!   by a division by zero). `F` is the file register and is only usable
//!   while a file is held.
//! - **Files**: named lists of integer rows. `GRAB` takes hold of one, the
//!   cursor moves with every arithmetic instruction and `SEEK`, reading `F`
//!   loads the row under the cursor and writing `F` inserts a row there.
//! - **Control flow**: `MARK` defines labels, `JUMP`/`TJMP`/`FJMP` branch on
//!   the `T` register. Execution ends when the program counter runs past the
//!   last instruction.
//!
//! # Modules
//!
//! - [`errors`]: Parse and execution error types
//! - [`files`]: File store trait and in-memory implementation
//! - [`isa`]: Instruction set table and opcode metadata
//! - [`operand`]: Register, literal and comparator operands
//! - [`parser`]: Source loading, parsing and diagnostics
//! - [`program`]: Parsed instructions and the label table
//! - [`vm`]: Execution engine and register bank

pub mod errors;
pub mod files;
pub mod isa;
#[cfg(test)]
mod isa_static_check;
pub mod operand;
pub mod parser;
pub mod program;
pub mod vm;
