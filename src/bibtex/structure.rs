//! BibTeX format data structures.
//!
//! This module defines the intermediate representation produced by the
//! scanner before conversion into the public [`Entry`] type.

use crate::Entry;
use std::collections::HashMap;

/// Structured raw data for a single record, fields in source order.
#[derive(Debug, Clone)]
pub(crate) struct RawBibEntry {
    /// Entry type, already lowercased by the scanner.
    pub(crate) entry_type: String,
    /// Citation key as written in the input.
    pub(crate) key: String,
    /// Field name-value pairs, names already lowercased by the scanner.
    pub(crate) fields: Vec<(String, String)>,
}

impl RawBibEntry {
    /// Create a new record with no fields yet.
    pub(crate) fn new(entry_type: String, key: String) -> Self {
        Self {
            entry_type,
            key,
            fields: Vec::new(),
        }
    }

    /// Append a field name-value pair.
    pub(crate) fn add_field(&mut self, name: String, value: String) {
        self.fields.push((name, value));
    }
}

impl From<RawBibEntry> for Entry {
    fn from(raw: RawBibEntry) -> Self {
        let mut fields = HashMap::with_capacity(raw.fields.len());
        for (name, value) in raw.fields {
            // A repeated field name keeps its last value
            fields.insert(name, value);
        }

        Entry {
            entry_type: raw.entry_type,
            key: raw.key,
            fields,
        }
    }
}
