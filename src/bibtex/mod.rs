//! BibTeX format parser implementation.
//!
//! Provides functionality to parse BibTeX bibliography databases into
//! [`Entry`] records.
//!
//! # Example
//!
//! ```
//! use bibtrend::BibtexParser;
//!
//! let input = r#"@article{smith2021,
//!     author = {Smith, John},
//!     title = {An Example Article},
//!     year = {2021}
//! }"#;
//!
//! let parser = BibtexParser::new();
//! let entries = parser.parse(input).unwrap();
//! assert_eq!(entries[0].field("title"), Some("An Example Article"));
//! ```

mod parse;
mod structure;

use crate::{Entry, Result};
use parse::bibtex_parse;
use std::fs;
use std::path::Path;

/// Parser for BibTeX bibliography databases.
///
/// BibTeX files hold records of the form `@type{key, name = value, ...}`,
/// optionally interleaved with `@string` abbreviation definitions,
/// `@comment` and `@preamble` blocks, and free text between records.
/// Entry types and field names are case-insensitive and are normalized to
/// lowercase; field values may be brace-delimited, quote-delimited, or bare
/// tokens joined with `#`.
#[derive(Debug, Clone, Default)]
pub struct BibtexParser;

impl BibtexParser {
    /// Creates a new BibTeX parser instance.
    ///
    /// # Examples
    ///
    /// ```
    /// use bibtrend::BibtexParser;
    /// let parser = BibtexParser::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a string containing zero or more BibTeX records.
    ///
    /// # Arguments
    ///
    /// * `input` - The BibTeX formatted string to parse
    ///
    /// # Returns
    ///
    /// A Result containing a vector of parsed Entries or a BibtrendError
    ///
    /// # Errors
    ///
    /// Returns [`BibtrendError::MalformedInput`](crate::BibtrendError::MalformedInput)
    /// with line context if the input violates the record grammar
    pub fn parse(&self, input: &str) -> Result<Vec<Entry>> {
        let raw_entries = bibtex_parse(input)?;

        let mut entries = Vec::with_capacity(raw_entries.len());
        for raw in raw_entries {
            entries.push(raw.into());
        }

        Ok(entries)
    }

    /// Reads and parses a BibTeX file from disk.
    ///
    /// The file handle is released once the content is read, before parsing
    /// begins.
    ///
    /// # Errors
    ///
    /// Returns [`BibtrendError::Io`](crate::BibtrendError::Io) if the file
    /// cannot be read, or a parse error as with [`parse`](Self::parse)
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Entry>> {
        let content = fs::read_to_string(path)?;
        self.parse(&content)
    }
}
