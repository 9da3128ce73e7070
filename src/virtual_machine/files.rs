//! File store shared by program runs.
//!
//! The [`FileSystem`] trait is the interface file instructions read from and
//! write to. [`FileStore`] is the in-memory implementation: a map from file
//! identifier to an ordered list of integer rows. A store is handed to each
//! run by the caller, so every VM that runs against the same store observes
//! the mutations of the others.

use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::operand::parse_i64;
use std::collections::BTreeMap;
use std::fmt;

/// Row storage used by `GRAB`, `VOID` and the `F` register.
pub trait FileSystem {
    /// Rows of file `id`, or `None` if no such file exists.
    fn rows(&self, id: &str) -> Option<&[i64]>;

    /// Row at `index` of file `id`.
    fn row(&self, id: &str, index: usize) -> Option<i64> {
        self.rows(id).and_then(|rows| rows.get(index).copied())
    }

    /// Inserts `value` at `index` (clamped to the file length), shifting later
    /// rows. Creates the file if it does not exist.
    fn insert(&mut self, id: &str, index: usize, value: i64);

    /// Removes the first row equal to `value`. Returns whether one was found.
    fn remove_value(&mut self, id: &str, value: i64) -> bool;
}

/// In-memory [`FileSystem`] keyed by file identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileStore {
    files: BTreeMap<String, Vec<i64>>,
}

impl FileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates or replaces file `id` with `rows`.
    pub fn seed(&mut self, id: impl Into<String>, rows: Vec<i64>) {
        self.files.insert(id.into(), rows);
    }

    /// Parses an `ID=ROWS` seed such as `100=1,265,3` (rows may be empty)
    /// and stores it.
    pub fn seed_from_spec(&mut self, spec: &str) -> Result<(), VMError> {
        let invalid = |reason| VMError::InvalidSeed {
            seed: spec.to_string(),
            reason,
        };
        let (id, rows) = spec.split_once('=').ok_or_else(|| invalid("expected ID=ROWS"))?;
        let id = id.trim();
        if id.is_empty() || id.contains(char::is_whitespace) {
            return Err(invalid("file id must be a single non-empty word"));
        }
        let rows = rows
            .split(',')
            .map(str::trim)
            .filter(|row| !row.is_empty())
            .map(|row| parse_i64(row).ok_or_else(|| invalid("rows must be integers")))
            .collect::<Result<Vec<_>, _>>()?;
        self.seed(id, rows);
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.files.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[i64])> {
        self.files.iter().map(|(id, rows)| (id.as_str(), rows.as_slice()))
    }
}

impl FileSystem for FileStore {
    fn rows(&self, id: &str) -> Option<&[i64]> {
        self.files.get(id).map(Vec::as_slice)
    }

    fn insert(&mut self, id: &str, index: usize, value: i64) {
        let rows = self.files.entry(id.to_string()).or_default();
        let index = index.min(rows.len());
        rows.insert(index, value);
    }

    fn remove_value(&mut self, id: &str, value: i64) -> bool {
        let Some(rows) = self.files.get_mut(id) else {
            return false;
        };
        match rows.iter().position(|row| *row == value) {
            Some(idx) => {
                rows.remove(idx);
                true
            }
            None => false,
        }
    }
}

impl fmt::Display for FileStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, rows) in self.iter() {
            let rows: Vec<String> = rows.iter().map(i64::to_string).collect();
            writeln!(f, "{id}: [{}]", rows.join(", "))?;
        }
        Ok(())
    }
}
