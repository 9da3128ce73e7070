//! Operand tokens: registers, the `EOF` pseudo-register, integer literals and
//! `TEST` comparators. Operands stay as text in the [`Program`] and are
//! resolved here when the instruction executes.
//!
//! [`Program`]: crate::virtual_machine::program::Program

use crate::virtual_machine::errors::VMError;
use std::fmt;

/// Writable machine register.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Register {
    T,
    X,
    /// File register, backed by the held file at the cursor.
    F,
}

impl Register {
    pub fn parse(tok: &str) -> Option<Self> {
        match tok {
            "T" => Some(Register::T),
            "X" => Some(Register::X),
            "F" => Some(Register::F),
            _ => None,
        }
    }

    /// Parses a destination register, failing with [`VMError::InvalidRegister`].
    pub fn parse_dst(tok: &str, line: usize) -> Result<Self, VMError> {
        Self::parse(tok).ok_or_else(|| VMError::InvalidRegister {
            line,
            token: tok.to_string(),
        })
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Register::T => "T",
            Register::X => "X",
            Register::F => "F",
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Readable operand.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SrcOperand {
    Reg(Register),
    /// End-of-file bound; only `TEST` may read it.
    Eof,
    Int(i64),
}

impl SrcOperand {
    /// Parses a source operand. `EOF` is accepted only when `allow_eof` is set.
    pub fn parse(tok: &str, line: usize, allow_eof: bool) -> Result<Self, VMError> {
        if let Some(reg) = Register::parse(tok) {
            return Ok(SrcOperand::Reg(reg));
        }
        if allow_eof && tok == "EOF" {
            return Ok(SrcOperand::Eof);
        }
        parse_i64(tok)
            .map(SrcOperand::Int)
            .ok_or_else(|| VMError::InvalidOperand {
                line,
                token: tok.to_string(),
            })
    }
}

/// Parses a base-10 integer literal with an optional sign.
pub(crate) fn parse_i64(tok: &str) -> Option<i64> {
    let digits = tok.strip_prefix(['-', '+']).unwrap_or(tok);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    tok.parse().ok()
}

/// `TEST` comparator.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Comparison {
    Greater,
    Less,
    Equal,
}

impl Comparison {
    pub fn parse(tok: &str, line: usize) -> Result<Self, VMError> {
        match tok {
            ">" => Ok(Comparison::Greater),
            "<" => Ok(Comparison::Less),
            "=" => Ok(Comparison::Equal),
            _ => Err(VMError::InvalidOperand {
                line,
                token: tok.to_string(),
            }),
        }
    }
}
