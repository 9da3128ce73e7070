//! Fixtures shared by the interpreter tests.
