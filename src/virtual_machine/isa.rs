//! Instruction table.
//!
//! The [`for_each_opcode!`](crate::for_each_opcode) macro holds the canonical
//! opcode list and hands it to a callback macro, so the [`Opcode`] enum, its
//! mnemonic lookup and the static checks in `isa_static_check` all come from
//! one definition.
//!
//! Each entry is `Name, "MNEMONIC" => Category, arity`.

use std::fmt;

/// Invokes `$callback!` with the complete opcode table.
#[macro_export]
macro_rules! for_each_opcode {
    ($callback:ident) => {
        $callback! {
            // =========================
            // Arithmetic / copy
            // =========================
            /// ADDI a b R ; R = a + b
            Addi, "ADDI" => Arithmetic, Arity::Exactly(3),
            /// SUBI a b R ; R = a - b
            Subi, "SUBI" => Arithmetic, Arity::Exactly(3),
            /// MULI a b R ; R = a * b
            Muli, "MULI" => Arithmetic, Arity::Exactly(3),
            /// DIVI a b R ; R = floor(a / b), no result when b = 0
            Divi, "DIVI" => Arithmetic, Arity::Exactly(3),
            /// MODI a b R ; R = a mod b, no result when b = 0
            Modi, "MODI" => Arithmetic, Arity::Exactly(3),
            /// COPY a R ; R = a (an extra middle operand is ignored)
            Copy, "COPY" => Arithmetic, Arity::Either(2, 3),
            // =========================
            // Test
            // =========================
            /// TEST a op b ; T = (a op b) with op in > < =
            /// TEST EOF ; T = (cursor > EOF)
            Test, "TEST" => Test, Arity::Either(1, 3),
            // =========================
            // Jumps
            // =========================
            /// JUMP L ; unconditional
            Jump, "JUMP" => Jump, Arity::Exactly(1),
            /// TJMP L ; jump when T != 0
            Tjmp, "TJMP" => Jump, Arity::Exactly(1),
            /// FJMP L ; jump when T = 0
            Fjmp, "FJMP" => Jump, Arity::Exactly(1),
            // =========================
            // Files
            // =========================
            /// GRAB id ; hold file id
            Grab, "GRAB" => File, Arity::Exactly(1),
            /// FILE R ; R = id of the held file
            File, "FILE" => File, Arity::Exactly(1),
            /// SEEK n ; move the file cursor
            Seek, "SEEK" => File, Arity::Exactly(1),
            /// VOID ; remove the row equal to F
            Void, "VOID" => File, Arity::Exactly(0),
            /// DROP ; release the held file
            Drop, "DROP" => File, Arity::Exactly(0),
            // =========================
            // No-ops
            // =========================
            /// MARK L ; label definition
            Mark, "MARK" => NoOp, Arity::Exactly(1),
            /// NOTE ... ; comment
            Note, "NOTE" => NoOp, Arity::Any,
        }
    };
}

#[macro_export]
macro_rules! define_opcodes {
    (
        $(
            $(#[$doc:meta])*
            $name:ident, $mnemonic:literal => $category:ident, $arity:expr
        ),* $(,)?
    ) => {
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        pub enum Opcode {
            $(
                $(#[$doc])*
                $name,
            )*
        }

        impl Opcode {
            /// Every opcode, in table order.
            pub const ALL: &'static [Opcode] = &[$( Opcode::$name, )*];

            /// Looks up an opcode by its exact (uppercase) mnemonic.
            pub fn from_mnemonic(name: &str) -> Option<Self> {
                match name {
                    $( $mnemonic => Some(Opcode::$name), )*
                    _ => None,
                }
            }

            pub const fn mnemonic(&self) -> &'static str {
                match self {
                    $( Opcode::$name => $mnemonic, )*
                }
            }

            /// Handler family the engine routes this opcode to.
            pub const fn category(&self) -> Category {
                match self {
                    $( Opcode::$name => Category::$category, )*
                }
            }

            pub const fn arity(&self) -> Arity {
                match self {
                    $( Opcode::$name => $arity, )*
                }
            }
        }
    };
}

/// Handler family of an opcode.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Category {
    Arithmetic,
    Test,
    Jump,
    File,
    NoOp,
}

/// Accepted operand counts.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Arity {
    Exactly(usize),
    Either(usize, usize),
    Any,
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::Either(a, b) => count == a || count == b,
            Arity::Any => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "{n}"),
            Arity::Either(a, b) => write!(f, "{a} or {b}"),
            Arity::Any => write!(f, "any number of"),
        }
    }
}

for_each_opcode!(define_opcodes);

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
