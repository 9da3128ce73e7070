//! Parsed program representation.
//!
//! A [`Program`] is the validated instruction list plus its [`LabelTable`].
//! Instruction positions are indices into the list after blank lines are
//! removed, and double as jump targets.

use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::isa::Opcode;
use std::collections::HashMap;
use std::fmt;

/// One parsed source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// 0-based index in the program.
    pub position: usize,
    /// 1-based physical source line, for diagnostics.
    pub line: usize,
    pub opcode: Opcode,
    pub operands: Vec<String>,
}

impl Instruction {
    /// Operand `idx`; the parser has already checked arity.
    pub(crate) fn operand(&self, idx: usize) -> &str {
        self.operands.get(idx).map(String::as_str).unwrap_or_default()
    }

    /// Last operand, the destination of arithmetic instructions.
    pub(crate) fn last_operand(&self) -> &str {
        self.operands.last().map(String::as_str).unwrap_or_default()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        for operand in &self.operands {
            write!(f, " {operand}")?;
        }
        Ok(())
    }
}

/// Label name to the position of the `MARK` defining it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
    labels: HashMap<String, usize>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` at `position`; a name may be defined once.
    pub(crate) fn define(&mut self, name: &str, position: usize, line: usize) -> Result<(), VMError> {
        if self.labels.contains_key(name) {
            return Err(VMError::DuplicateLabel {
                line,
                label: name.to_string(),
            });
        }
        self.labels.insert(name.to_string(), position);
        Ok(())
    }

    /// Position of `name`, or [`VMError::UnknownLabel`] reported at `line`.
    pub fn resolve(&self, name: &str, line: usize) -> Result<usize, VMError> {
        self.labels
            .get(name)
            .copied()
            .ok_or_else(|| VMError::UnknownLabel {
                line,
                label: name.to_string(),
            })
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Validated instruction list. Immutable once built by the parser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub(crate) instructions: Vec<Instruction>,
    pub(crate) labels: LabelTable,
}

impl Program {
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn get(&self, position: usize) -> Option<&Instruction> {
        self.instructions.get(position)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}
