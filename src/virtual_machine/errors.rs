use exa_derive::Error;

/// Errors raised while loading, parsing or running an EXA program.
///
/// Line numbers are 1-based physical lines of the source text. Every
/// variant is fatal: parse errors abort before execution starts, runtime
/// errors abort the run.
#[derive(Debug, Error)]
pub enum VMError {
    /// Program path does not name a `.exa` source file.
    #[error("invalid program file {path}: expected a .exa file")]
    InvalidFile { path: String },
    /// Source file could not be read.
    #[error("io error reading {path}: {source}")]
    IoError { path: String, source: String },
    /// `MARK` reused a label name.
    #[error("line {line}: label {label} already in use")]
    DuplicateLabel { line: usize, label: String },
    /// Mnemonic missing from the instruction table.
    #[error("line {line}: invalid instruction {opcode}: {text}")]
    UnknownOpcode {
        line: usize,
        opcode: String,
        text: String,
    },
    /// Operand count outside the instruction's arity.
    #[error("line {line}: {mnemonic} expects {expected} operand(s), got {actual}")]
    ArityMismatch {
        line: usize,
        mnemonic: &'static str,
        expected: String,
        actual: usize,
    },
    /// Destination is not one of `T`, `X`, `F`.
    #[error("line {line}: invalid register {token}")]
    InvalidRegister { line: usize, token: String },
    /// Token is neither a readable register nor a base-10 integer.
    #[error("line {line}: invalid register/number {token}")]
    InvalidOperand { line: usize, token: String },
    /// Jump to a label no `MARK` defines.
    #[error("line {line}: undefined label {label}")]
    UnknownLabel { line: usize, label: String },
    /// `F` read or written, or `VOID`/`FILE` used, while no file is held.
    #[error("line {line}: cannot {access} while no file is held")]
    FileAccessError { line: usize, access: &'static str },
    /// `VOID` found no row equal to `F`.
    #[error("line {line}: no row {value} in file {file_id}")]
    RowNotFound {
        line: usize,
        file_id: String,
        value: i64,
    },
    /// A "no result" value reached an integer-only position.
    #[error("line {line}: {operand} holds no result")]
    NoResult { line: usize, operand: String },
    /// Malformed `--file ID=ROWS` seed.
    #[error("invalid file seed {seed}: {reason}")]
    InvalidSeed { seed: String, reason: &'static str },
}

impl VMError {
    /// Source line the error points at, when it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            VMError::DuplicateLabel { line, .. }
            | VMError::UnknownOpcode { line, .. }
            | VMError::ArityMismatch { line, .. }
            | VMError::InvalidRegister { line, .. }
            | VMError::InvalidOperand { line, .. }
            | VMError::UnknownLabel { line, .. }
            | VMError::FileAccessError { line, .. }
            | VMError::RowNotFound { line, .. }
            | VMError::NoResult { line, .. } => Some(*line),
            VMError::InvalidFile { .. } | VMError::IoError { .. } | VMError::InvalidSeed { .. } => {
                None
            }
        }
    }
}
