use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::operand::Register;
use std::fmt;

/// Value held by a register.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Value {
    /// 64-bit signed integer.
    Int(i64),
    /// Outcome of dividing by zero; not an integer.
    NoResult,
}

impl Value {
    /// Integer payload, or [`VMError::NoResult`] naming `operand`.
    pub fn int(self, operand: &str, line: usize) -> Result<i64, VMError> {
        match self {
            Value::Int(v) => Ok(v),
            Value::NoResult => Err(VMError::NoResult {
                line,
                operand: operand.to_string(),
            }),
        }
    }

    /// Jump condition: non-zero integers are true, "no result" is false.
    pub fn is_truthy(self) -> bool {
        matches!(self, Value::Int(v) if v != 0)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => fmt::Display::fmt(v, f),
            Value::NoResult => f.pad("None"),
        }
    }
}

/// Machine registers.
///
/// `F` is only reachable while a file is held; [`read_f`](Self::read_f) and
/// [`write_f`](Self::write_f) enforce that. `location` is the file cursor,
/// the row the next `F` access reads or inserts at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterBank {
    pub t: Value,
    pub x: Value,
    pub(crate) f: Value,
    /// Row count of the grabbed file.
    pub eof: usize,
    pub file_id: Option<String>,
    pub held: bool,
    pub location: usize,
}

impl Default for RegisterBank {
    fn default() -> Self {
        Self {
            t: Value::Int(0),
            x: Value::Int(0),
            f: Value::Int(0),
            eof: 0,
            file_id: None,
            held: false,
            location: 0,
        }
    }
}

impl RegisterBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current `F` without touching the file; fails when no file is held.
    pub fn read_f(&self, line: usize) -> Result<Value, VMError> {
        if !self.held {
            return Err(VMError::FileAccessError {
                line,
                access: "access the F register",
            });
        }
        Ok(self.f)
    }

    /// Sets `F`; fails when no file is held.
    pub fn write_f(&mut self, value: Value, line: usize) -> Result<(), VMError> {
        if !self.held {
            return Err(VMError::FileAccessError {
                line,
                access: "write the F register",
            });
        }
        self.f = value;
        Ok(())
    }

    /// Plain register read. `F` goes through [`read_f`](Self::read_f).
    pub fn get(&self, reg: Register, line: usize) -> Result<Value, VMError> {
        match reg {
            Register::T => Ok(self.t),
            Register::X => Ok(self.x),
            Register::F => self.read_f(line),
        }
    }

    /// Plain register write. `F` goes through [`write_f`](Self::write_f).
    pub fn set(&mut self, reg: Register, value: Value, line: usize) -> Result<(), VMError> {
        match reg {
            Register::T => self.t = value,
            Register::X => self.x = value,
            Register::F => self.write_f(value, line)?,
        }
        Ok(())
    }

    /// Identifier of the held file.
    pub(crate) fn held_file(&self, line: usize, access: &'static str) -> Result<&str, VMError> {
        match (&self.file_id, self.held) {
            (Some(id), true) => Ok(id.as_str()),
            _ => Err(VMError::FileAccessError { line, access }),
        }
    }
}

impl fmt::Display for RegisterBank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Registers: T = {:>3} | X = {:>3}", self.t, self.x)
    }
}
