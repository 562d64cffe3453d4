//! Named variable and array slots.
//!
//! Three reserved variables (箱A, 箱B, 箱C) exist after every reset and can
//! never be deleted, so expressions that reference them never fail on "not
//! found". Everything else is created per run and cleared by `reset`.

use std::collections::BTreeMap;

use crate::error::RuntimeError;

/// Variable names restored to zero, never deleted, by [`VariableStore::reset`].
pub const RESERVED: [&str; 3] = ["箱A", "箱B", "箱C"];

/// Mutable scalar and array slots consumed by the evaluator and by commands.
#[derive(Debug, Clone)]
pub struct VariableStore {
    variables: BTreeMap<String, i64>,
    arrays: BTreeMap<String, Vec<i64>>,
}

impl Default for VariableStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VariableStore {
    pub fn new() -> Self {
        let mut store = VariableStore {
            variables: BTreeMap::new(),
            arrays: BTreeMap::new(),
        };
        store.reset();
        store
    }

    /// Drop every dynamically created slot; reserved variables come back as 0.
    pub fn reset(&mut self) {
        self.variables.clear();
        self.arrays.clear();
        for name in RESERVED {
            self.variables.insert(name.to_string(), 0);
        }
    }

    /// Create a new variable. User-facing creation fails on duplicates;
    /// command-driven assignment goes through [`VariableStore::set`] instead.
    pub fn create(&mut self, name: &str, initial: i64) -> Result<(), RuntimeError> {
        if self.variables.contains_key(name) {
            return Err(RuntimeError::DuplicateVariable {
                name: name.to_string(),
            });
        }
        self.variables.insert(name.to_string(), initial);
        Ok(())
    }

    /// Assign a variable, creating it if absent.
    pub fn set(&mut self, name: &str, value: i64) {
        self.variables.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Result<i64, RuntimeError> {
        self.variables
            .get(name)
            .copied()
            .ok_or_else(|| RuntimeError::UnknownVariable {
                name: name.to_string(),
            })
    }

    pub fn has(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// All current variables, in name order.
    pub fn variables(&self) -> impl Iterator<Item = (&str, i64)> {
        self.variables.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn create_array(&mut self, name: &str, size: usize) -> Result<(), RuntimeError> {
        if size == 0 {
            return Err(RuntimeError::InvalidArraySize {
                name: name.to_string(),
            });
        }
        if self.arrays.contains_key(name) {
            return Err(RuntimeError::DuplicateArray {
                name: name.to_string(),
            });
        }
        self.arrays.insert(name.to_string(), vec![0; size]);
        Ok(())
    }

    pub fn array_get(&self, name: &str, index: i64) -> Result<i64, RuntimeError> {
        let array = self.array(name)?;
        let slot = usize::try_from(index)
            .ok()
            .and_then(|i| array.get(i))
            .ok_or(RuntimeError::IndexOutOfRange {
                index,
                size: array.len(),
            })?;
        Ok(*slot)
    }

    pub fn array_set(&mut self, name: &str, index: i64, value: i64) -> Result<(), RuntimeError> {
        let array = self
            .arrays
            .get_mut(name)
            .ok_or_else(|| RuntimeError::UnknownArray {
                name: name.to_string(),
            })?;
        let size = array.len();
        let slot = usize::try_from(index)
            .ok()
            .and_then(|i| array.get_mut(i))
            .ok_or(RuntimeError::IndexOutOfRange { index, size })?;
        *slot = value;
        Ok(())
    }

    /// Read a whole array (consumed by challenge checkers).
    pub fn array(&self, name: &str) -> Result<&[i64], RuntimeError> {
        self.arrays
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| RuntimeError::UnknownArray {
                name: name.to_string(),
            })
    }

    pub fn array_names(&self) -> impl Iterator<Item = &str> {
        self.arrays.keys().map(String::as_str)
    }
}
