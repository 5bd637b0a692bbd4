//! Shared string table.

use crate::bfast::read_null_terminated_strings;
use crate::util::{Error, Result};

/// Index-addressed pool of strings referenced by entity columns and properties.
///
/// Stored as `\0`-terminated UTF-8, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StringTable {
    strings: Vec<String>,
}

impl StringTable {
    pub fn new(strings: Vec<String>) -> Self {
        Self { strings }
    }

    /// Decode the Strings buffer.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self::new(read_null_terminated_strings(bytes)?))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.strings.iter().map(String::as_str)
    }

    /// Resolve a stored reference. Negative indices mean "no string" and
    /// resolve to `""` without touching the table.
    pub fn resolve(&self, index: i32) -> Result<&str> {
        if index < 0 {
            return Ok("");
        }
        self.get(index as usize).ok_or_else(|| {
            Error::format(format!(
                "string index {} out of range (table has {} strings)",
                index,
                self.len()
            ))
        })
    }
}
