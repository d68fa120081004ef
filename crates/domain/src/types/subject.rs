//! Subject identifiers a retrieval run is performed for

use std::collections::BTreeMap;
use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

use crate::errors::{RecordFetchError, Result};

/// Named, positive identifiers for the subject of a retrieval run
/// (e.g. `PatNum = 12345`, `AptNum = 67890`).
///
/// Validation of raw user input belongs to the caller; this type only
/// enforces the positive-integer constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectIds {
    ids: BTreeMap<String, NonZeroU64>,
}

impl SubjectIds {
    /// Empty identifier set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an identifier, rejecting zero.
    ///
    /// # Errors
    /// Returns `RecordFetchError::InvalidInput` when `value` is zero.
    pub fn insert(&mut self, key: impl Into<String>, value: u64) -> Result<()> {
        let key = key.into();
        let value = NonZeroU64::new(value).ok_or_else(|| {
            RecordFetchError::InvalidInput(format!("{key} must be a positive integer"))
        })?;
        self.ids.insert(key, value);
        Ok(())
    }

    /// Builder-style variant of [`insert`](Self::insert).
    ///
    /// # Errors
    /// Returns `RecordFetchError::InvalidInput` when `value` is zero.
    pub fn with(mut self, key: impl Into<String>, value: u64) -> Result<Self> {
        self.insert(key, value)?;
        Ok(self)
    }

    /// Identifier stored under `key`
    pub fn get(&self, key: &str) -> Option<u64> {
        self.ids.get(key).map(|v| v.get())
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
