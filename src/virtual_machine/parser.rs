//! Source parser and validator.
//!
//! Turns EXA source text into a [`Program`].
//!
//! # Syntax
//!
//! ```text
//! GRAB 100
//! MARK LOOP
//! NOTE comments run to the end of the line
//! ADDI F X X
//! TEST EOF
//! FJMP LOOP
//! ```
//!
//! - One instruction per line, tokens separated by whitespace
//! - Mnemonics are uppercase; registers are `T`, `X`, `F`
//! - Blank lines are dropped before positions are assigned
//!
//! Validation is all-or-nothing: the first bad line aborts the parse.
//! Labels, opcodes, arity and arithmetic destinations are checked here;
//! source operands and jump targets are checked when they execute.

use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::isa::{Category, Opcode};
use crate::virtual_machine::operand::Register;
use crate::virtual_machine::program::{Instruction, LabelTable, Program};
use std::fmt::Write;
use std::fs;
use std::path::Path;

/// Extension every program file must carry.
pub const SOURCE_EXTENSION: &str = "exa";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token<'a> {
    text: &'a str,
    /// 1-based column in the line.
    offset: usize,
}

/// Splits a line on ASCII whitespace, keeping column offsets.
fn tokenize(line: &str) -> Vec<Token<'_>> {
    let mut out = Vec::with_capacity(4);
    let mut start: Option<usize> = None;

    for (i, b) in line.bytes().enumerate() {
        if b.is_ascii_whitespace() {
            if let Some(s) = start.take() {
                out.push(Token {
                    text: &line[s..i],
                    offset: s + 1,
                });
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        out.push(Token {
            text: &line[s..],
            offset: s + 1,
        });
    }
    out
}

/// Parses and validates one non-blank line.
fn parse_line(
    position: usize,
    line_no: usize,
    text: &str,
    labels: &mut LabelTable,
) -> Result<Instruction, VMError> {
    let tokens = tokenize(text);
    let Some((head, rest)) = tokens.split_first() else {
        return Err(VMError::UnknownOpcode {
            line: line_no,
            opcode: String::new(),
            text: String::new(),
        });
    };

    let opcode = Opcode::from_mnemonic(head.text).ok_or_else(|| VMError::UnknownOpcode {
        line: line_no,
        opcode: head.text.to_string(),
        text: text.trim().to_string(),
    })?;

    let arity = opcode.arity();
    if !arity.accepts(rest.len()) {
        return Err(VMError::ArityMismatch {
            line: line_no,
            mnemonic: opcode.mnemonic(),
            expected: arity.to_string(),
            actual: rest.len(),
        });
    }

    match opcode.category() {
        Category::NoOp if opcode == Opcode::Mark => {
            labels.define(rest[0].text, position, line_no)?;
        }
        Category::Arithmetic => {
            let dst = rest.last().map(|t| t.text).unwrap_or_default();
            Register::parse_dst(dst, line_no)?;
        }
        _ => {}
    }

    Ok(Instruction {
        position,
        line: line_no,
        opcode,
        operands: rest.iter().map(|t| t.text.to_string()).collect(),
    })
}

/// Parses source text into a validated [`Program`].
pub fn parse_source(source: &str) -> Result<Program, VMError> {
    let mut labels = LabelTable::new();
    let mut instructions = Vec::new();

    let lines = source
        .lines()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty());
    for (position, (idx, text)) in lines.enumerate() {
        instructions.push(parse_line(position, idx + 1, text, &mut labels)?);
    }

    Ok(Program {
        instructions,
        labels,
    })
}

/// Column of the token an error points at, defaulting to the line start.
fn error_column(err: &VMError, line_text: &str) -> usize {
    let needle = match err {
        VMError::UnknownOpcode { opcode, .. } => opcode.as_str(),
        VMError::InvalidRegister { token, .. } | VMError::InvalidOperand { token, .. } => {
            token.as_str()
        }
        VMError::DuplicateLabel { label, .. } | VMError::UnknownLabel { label, .. } => {
            label.as_str()
        }
        _ => "",
    };
    let tokens = tokenize(line_text);
    tokens
        .iter()
        .rev()
        .find(|t| !needle.is_empty() && t.text == needle)
        .or_else(|| tokens.first())
        .map_or(1, |t| t.offset)
}

/// Formats a compiler-style diagnostic for an error tied to a source line.
pub fn render_diagnostic(file: &str, source: &str, err: &VMError) -> String {
    let mut diag = String::new();
    let _ = writeln!(diag, "error: {err}");

    let Some(line) = err.line() else {
        return diag;
    };
    let Some(raw_line) = source.lines().nth(line.saturating_sub(1)) else {
        return diag;
    };
    let line_text = raw_line.trim_end_matches('\r');
    let column = error_column(err, line_text);
    let _ = writeln!(diag, " --> {file}:{line}:{column}");
    let _ = writeln!(diag, "  |");
    let _ = writeln!(diag, "{:>4} | {}", line, line_text);
    let _ = writeln!(diag, "  | {}^", " ".repeat(column.saturating_sub(1)));
    diag
}

/// Parses `source`, printing a diagnostic to stderr on failure.
pub fn parse_named(source: &str, source_name: &str) -> Result<Program, VMError> {
    let result = parse_source(source);
    if let Err(err) = &result
        && cfg!(not(test))
    {
        eprint!("{}", render_diagnostic(source_name, source, err));
    }
    result
}

/// Reads a `.exa` file from disk.
pub fn load_source<P: AsRef<Path>>(path: P) -> Result<String, VMError> {
    let path = path.as_ref();
    if path.extension().and_then(|e| e.to_str()) != Some(SOURCE_EXTENSION) {
        return Err(VMError::InvalidFile {
            path: path.display().to_string(),
        });
    }
    fs::read_to_string(path).map_err(|e| VMError::IoError {
        path: path.display().to_string(),
        source: e.to_string(),
    })
}

/// Convenience: load and parse a program file.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Program, VMError> {
    let path = path.as_ref();
    let source = load_source(path)?;
    parse_named(&source, &path.display().to_string())
}
