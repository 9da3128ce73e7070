//! Execution engine.
//!
//! The VM fetches the instruction at the program counter, hands it to the
//! handler for its category and applies the returned [`Flow`]: `Continue`
//! advances the counter by one, `JumpTo` replaces it. The run ends the first
//! time the counter reaches the end of the program. There is no step limit;
//! a program that never leaves a loop never returns.
//!
//! The file store is not owned by the VM. It is passed to [`VM::run`], so the
//! caller decides whether runs share one store or get their own.

use crate::debug;
use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::files::FileSystem;
use crate::virtual_machine::isa::{Category, Opcode};
use crate::virtual_machine::operand::{Comparison, Register, parse_i64};
use crate::virtual_machine::parser::parse_source;
use crate::virtual_machine::program::Program;

mod context;
pub mod registers;

use context::ExecContext;
pub use context::Flow;
pub use registers::{RegisterBank, Value};

/// EXA virtual machine for one program.
pub struct VM {
    program: Program,
    /// Index of the next instruction.
    pc: usize,
    registers: RegisterBank,
    /// Instructions dispatched so far, no-ops included.
    steps: u64,
}

impl VM {
    /// Creates a VM with zeroed registers, positioned at the first instruction.
    pub fn new(program: Program) -> Self {
        Self {
            program,
            pc: 0,
            registers: RegisterBank::new(),
            steps: 0,
        }
    }

    /// Parses `source` and creates a VM for it.
    pub fn from_source(source: &str) -> Result<Self, VMError> {
        parse_source(source).map(Self::new)
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn registers(&self) -> &RegisterBank {
        &self.registers
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn is_finished(&self) -> bool {
        self.pc >= self.program.len()
    }

    /// Runs until the program counter passes the last instruction and
    /// returns the final register snapshot.
    pub fn run<S: FileSystem>(&mut self, files: &mut S) -> Result<RegisterBank, VMError> {
        while !self.is_finished() {
            self.step(files)?;
        }
        Ok(self.registers.clone())
    }

    /// Executes the instruction at the program counter. Does nothing once
    /// the program has finished.
    pub fn step<S: FileSystem>(&mut self, files: &mut S) -> Result<(), VMError> {
        let Some(instr) = self.program.get(self.pc) else {
            return Ok(());
        };
        debug!("{} | {:>3}: {}", self.registers, self.pc, instr);

        let flow = if instr.opcode.category() == Category::NoOp {
            Flow::Continue
        } else {
            let mut ctx = ExecContext {
                instr,
                regs: &mut self.registers,
                files,
                labels: &self.program.labels,
            };
            exec(&mut ctx)?
        };

        self.pc = match flow {
            Flow::Continue => self.pc + 1,
            Flow::JumpTo(target) => target,
        };
        self.steps += 1;
        Ok(())
    }
}

/// Routes an instruction to its handler.
fn exec<S: FileSystem>(ctx: &mut ExecContext<'_, S>) -> Result<Flow, VMError> {
    match ctx.instr.opcode {
        // Arithmetic / copy
        op @ (Opcode::Addi
        | Opcode::Subi
        | Opcode::Muli
        | Opcode::Divi
        | Opcode::Modi
        | Opcode::Copy) => op_arithmetic(ctx, op),
        // Test
        Opcode::Test => op_test(ctx),
        // Jumps
        Opcode::Jump => op_jump(ctx, |_| true),
        Opcode::Tjmp => op_jump(ctx, Value::is_truthy),
        Opcode::Fjmp => op_jump(ctx, |t| !t.is_truthy()),
        // Files
        Opcode::Grab => op_grab(ctx),
        Opcode::File => op_file(ctx),
        Opcode::Seek => op_seek(ctx),
        Opcode::Void => op_void(ctx),
        Opcode::Drop => op_drop(ctx),
        // No-ops
        Opcode::Mark | Opcode::Note => Ok(Flow::Continue),
    }
}

/// Floor division; `None` for a zero divisor.
fn floor_div(a: i64, b: i64) -> Option<i64> {
    if b == 0 {
        return None;
    }
    let q = a.wrapping_div(b);
    if a.wrapping_rem(b) != 0 && ((a < 0) != (b < 0)) {
        Some(q - 1)
    } else {
        Some(q)
    }
}

/// Modulo with the sign of the divisor; `None` for a zero divisor.
fn floor_mod(a: i64, b: i64) -> Option<i64> {
    if b == 0 {
        return None;
    }
    let r = a.wrapping_rem(b);
    if r != 0 && ((r < 0) != (b < 0)) {
        Some(r + b)
    } else {
        Some(r)
    }
}

fn op_arithmetic<S: FileSystem>(
    ctx: &mut ExecContext<'_, S>,
    op: Opcode,
) -> Result<Flow, VMError> {
    let instr = ctx.instr;
    let line = ctx.line();
    let dst = Register::parse_dst(instr.last_operand(), line)?;
    let lhs_tok = instr.operand(0);
    let lhs = ctx.resolve(lhs_tok, false)?;

    let result = if op == Opcode::Copy {
        lhs
    } else {
        let rhs_tok = instr.operand(1);
        let rhs = ctx.resolve(rhs_tok, false)?;
        let a = lhs.int(lhs_tok, line)?;
        let b = rhs.int(rhs_tok, line)?;
        let computed = match op {
            Opcode::Addi => Some(a.wrapping_add(b)),
            Opcode::Subi => Some(a.wrapping_sub(b)),
            Opcode::Muli => Some(a.wrapping_mul(b)),
            Opcode::Divi => floor_div(a, b),
            _ => floor_mod(a, b),
        };
        computed.map_or(Value::NoResult, Value::Int)
    };

    ctx.store(dst, result)?;
    ctx.regs.location += 1;
    if dst == Register::F {
        ctx.write_back()?;
    }
    Ok(Flow::Continue)
}

fn op_test<S: FileSystem>(ctx: &mut ExecContext<'_, S>) -> Result<Flow, VMError> {
    let instr = ctx.instr;
    let line = ctx.line();
    let holds = match instr.operands.as_slice() {
        [only] if only == "EOF" => ctx.regs.location > ctx.regs.eof,
        [lhs_tok, cmp, rhs_tok] => {
            let lhs = ctx.resolve(lhs_tok, true)?;
            let cmp = Comparison::parse(cmp, line)?;
            let rhs = ctx.resolve(rhs_tok, true)?;
            match cmp {
                Comparison::Equal => lhs == rhs,
                Comparison::Greater => lhs.int(lhs_tok, line)? > rhs.int(rhs_tok, line)?,
                Comparison::Less => lhs.int(lhs_tok, line)? < rhs.int(rhs_tok, line)?,
            }
        }
        operands => {
            return Err(VMError::InvalidOperand {
                line,
                token: operands.join(" "),
            });
        }
    };
    ctx.regs.t = Value::Int(i64::from(holds));
    Ok(Flow::Continue)
}

fn op_jump<S: FileSystem>(
    ctx: &mut ExecContext<'_, S>,
    taken: impl Fn(Value) -> bool,
) -> Result<Flow, VMError> {
    let target = ctx.labels.resolve(ctx.instr.operand(0), ctx.line())?;
    if taken(ctx.regs.t) {
        Ok(Flow::JumpTo(target))
    } else {
        Ok(Flow::Continue)
    }
}

fn op_grab<S: FileSystem>(ctx: &mut ExecContext<'_, S>) -> Result<Flow, VMError> {
    let id = ctx.instr.operand(0);
    if let Some(rows) = ctx.files.rows(id)
        && !rows.is_empty()
    {
        ctx.regs.eof = rows.len();
    }
    ctx.regs.file_id = Some(id.to_string());
    ctx.regs.held = true;
    Ok(Flow::Continue)
}

fn op_file<S: FileSystem>(ctx: &mut ExecContext<'_, S>) -> Result<Flow, VMError> {
    let line = ctx.line();
    let dst = Register::parse_dst(ctx.instr.operand(0), line)?;
    let id = ctx.regs.held_file(line, "read the file id")?;
    let value = parse_i64(id).ok_or_else(|| VMError::InvalidOperand {
        line,
        token: id.to_string(),
    })?;
    ctx.store(dst, Value::Int(value))?;
    if dst == Register::F {
        ctx.write_back()?;
    }
    Ok(Flow::Continue)
}

fn op_seek<S: FileSystem>(ctx: &mut ExecContext<'_, S>) -> Result<Flow, VMError> {
    let tok = ctx.instr.operand(0);
    let offset = ctx.resolve(tok, false)?.int(tok, ctx.line())?;
    let eof = ctx.regs.eof;
    if offset > eof as i64 {
        ctx.regs.location = eof;
    } else if offset < 0 {
        ctx.regs.location = 0;
    } else {
        ctx.regs.location += offset as usize;
    }
    Ok(Flow::Continue)
}

fn op_void<S: FileSystem>(ctx: &mut ExecContext<'_, S>) -> Result<Flow, VMError> {
    let line = ctx.line();
    let value = ctx.regs.read_f(line)?.int("F", line)?;
    let id = ctx.regs.held_file(line, "VOID")?;
    if !ctx.files.remove_value(id, value) {
        return Err(VMError::RowNotFound {
            line,
            file_id: id.to_string(),
            value,
        });
    }
    Ok(Flow::Continue)
}

fn op_drop<S: FileSystem>(ctx: &mut ExecContext<'_, S>) -> Result<Flow, VMError> {
    ctx.regs.f = Value::Int(0);
    ctx.regs.location = 0;
    ctx.regs.held = false;
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests;
