//! A library for charting publication trends from BibTeX bibliographies.
//!
//! `bibtrend` parses a BibTeX database, tabulates how many entries were published
//! in each year, and renders the result as a bar chart with a trailing moving
//! average and a fitted quadratic trend overlaid.
//!
//! # Key Features
//!
//! - **BibTeX Parsing**: Handles the standard record grammar:
//!   - `{}` and `()` entry delimiters
//!   - Braced, quoted, and bare field values with `#` concatenation
//!   - `@string` abbreviations, `@comment` and `@preamble` blocks
//!   - Case-insensitive entry types and field names
//!
//! - **Yearly Aggregation**:
//!   - Publication counts per year, sorted ascending
//!   - Trailing moving average with a minimum-periods policy
//!
//! - **Trend Analysis**:
//!   - Least-squares quadratic fit evaluated at each year
//!
//! - **Chart Rendering**:
//!   - Annotated bar chart saved as a PNG
//!   - Optional native preview window (`preview` feature, enabled by default)
//!
//! # Basic Usage
//!
//! ```rust
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
//! assert_eq!(entries[0].year(), Some("2021"));
//! ```
//!
//! # Counting and Trends
//!
//! ```rust
//! use bibtrend::{BibtexParser, YearCounts};
//!
//! let input = "@misc{a, year = {2020}}\n@misc{b, year = {2021}}";
//! let entries = BibtexParser::new().parse(input).unwrap();
//!
//! let counts = YearCounts::from_entries(&entries).unwrap();
//! assert_eq!(counts.total(), 2);
//!
//! let averages = counts.moving_average(3).unwrap();
//! assert_eq!(averages, vec![1.0, 1.0]);
//! ```
//!
//! # Error Handling
//!
//! The library uses a custom [`Result`] type that wraps [`BibtrendError`] for
//! consistent error handling across all operations:
//!
//! ```rust
//! use bibtrend::{BibtexParser, BibtrendError};
//!
//! let result = BibtexParser::new().parse("@article{broken");
//! match result {
//!     Ok(entries) => println!("Parsed {} entries", entries.len()),
//!     Err(BibtrendError::MalformedInput { message, line }) => {
//!         eprintln!("Parse error at line {line}: {message}");
//!     }
//!     Err(e) => eprintln!("Other error: {e}"),
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

pub mod bibtex;
pub mod chart;
pub mod counts;
#[cfg(feature = "preview")]
pub mod preview;
pub mod trend;

// Reexports
pub use bibtex::BibtexParser;
pub use chart::ChartStyle;
pub use counts::{YearCounts, YearRow};
pub use trend::QuadraticTrend;

/// A specialized Result type for bibliography operations.
pub type Result<T> = std::result::Result<T, BibtrendError>;

/// Represents errors that can occur while parsing, aggregating, or charting.
#[derive(Error, Debug)]
pub enum BibtrendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed input: {message} at line {line}")]
    MalformedInput { message: String, line: usize },

    #[error("Invalid year value: {0}")]
    InvalidYear(String),

    #[error("Invalid moving average window: {0}")]
    InvalidWindow(usize),

    #[error("Insufficient data: need at least {needed} points, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("Trend fitting failed: {0}")]
    Fit(String),

    #[error("Chart error: {0}")]
    Chart(String),
}

/// Represents a single BibTeX entry with its metadata fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Entry type such as `article` or `inproceedings`, lowercased
    pub entry_type: String,
    /// Citation key identifying the entry
    pub key: String,
    /// Field names (lowercased) mapped to their values
    pub fields: HashMap<String, String>,
}

impl Entry {
    /// Returns the value of a field, if present. Lookup is case-insensitive.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Returns the raw value of the `year` field, if present.
    #[must_use]
    pub fn year(&self) -> Option<&str> {
        self.field("year")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = BibtrendError::MalformedInput {
            message: "unexpected end of input".to_string(),
            line: 4,
        };
        assert_eq!(
            error.to_string(),
            "Malformed input: unexpected end of input at line 4"
        );
    }

    #[test]
    fn test_entry_field_lookup_is_case_insensitive() {
        let mut fields = HashMap::new();
        fields.insert("year".to_string(), "2021".to_string());
        let entry = Entry {
            entry_type: "article".to_string(),
            key: "smith2021".to_string(),
            fields,
        };
        assert_eq!(entry.field("YEAR"), Some("2021"));
        assert_eq!(entry.year(), Some("2021"));
        assert_eq!(entry.field("title"), None);
    }
}
