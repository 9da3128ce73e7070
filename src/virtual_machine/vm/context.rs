use super::registers::{RegisterBank, Value};
use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::files::FileSystem;
use crate::virtual_machine::operand::{Register, SrcOperand};
use crate::virtual_machine::program::{Instruction, LabelTable};

/// What the engine does with the program counter after a handler returns.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Flow {
    /// Advance to the next instruction.
    Continue,
    /// Continue at the given position.
    JumpTo(usize),
}

/// Everything one handler invocation may touch.
pub(super) struct ExecContext<'a, S: FileSystem> {
    pub(super) instr: &'a Instruction,
    pub(super) regs: &'a mut RegisterBank,
    pub(super) files: &'a mut S,
    pub(super) labels: &'a LabelTable,
}

impl<'a, S: FileSystem> ExecContext<'a, S> {
    pub(super) fn line(&self) -> usize {
        self.instr.line
    }

    /// Resolves a source operand to a value.
    ///
    /// `T`/`X` read the register, integer literals stand for themselves,
    /// `EOF` (when allowed) is the end-of-file bound and `F` goes through
    /// [`read_file`](Self::read_file).
    pub(super) fn resolve(&mut self, tok: &str, allow_eof: bool) -> Result<Value, VMError> {
        let line = self.line();
        match SrcOperand::parse(tok, line, allow_eof)? {
            SrcOperand::Reg(Register::F) => self.read_file(),
            SrcOperand::Reg(reg) => self.regs.get(reg, line),
            SrcOperand::Eof => Ok(Value::Int(self.regs.eof as i64)),
            SrcOperand::Int(v) => Ok(Value::Int(v)),
        }
    }

    /// Reads `F`, first refreshing it from the held file when the cursor is
    /// still before `EOF` and the file has a row there.
    pub(super) fn read_file(&mut self) -> Result<Value, VMError> {
        let line = self.line();
        let id = self.regs.held_file(line, "read the F register")?;
        let location = self.regs.location;
        let row = if location < self.regs.eof {
            self.files.row(id, location)
        } else {
            None
        };
        if let Some(row) = row {
            self.regs.write_f(Value::Int(row), line)?;
        }
        self.regs.read_f(line)
    }

    /// Stores into `dst`. `F` needs a held file and only takes integers; the
    /// file itself is untouched until [`write_back`](Self::write_back).
    pub(super) fn store(&mut self, dst: Register, value: Value) -> Result<(), VMError> {
        let line = self.line();
        if dst == Register::F {
            self.regs.held_file(line, "write the F register")?;
            value.int("F", line)?;
        }
        self.regs.set(dst, value, line)
    }

    /// Inserts `F` into the held file at the cursor.
    pub(super) fn write_back(&mut self) -> Result<(), VMError> {
        let line = self.line();
        let row = self.regs.read_f(line)?.int("F", line)?;
        let id = self.regs.held_file(line, "write the F register")?;
        self.files.insert(id, self.regs.location, row);
        Ok(())
    }
}
