//! BibTeX format parsing implementation.
//!
//! This module handles the low-level scanning of BibTeX formatted text.

use crate::bibtex::structure::RawBibEntry;
use crate::{BibtrendError, Result};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Parse the content of a BibTeX formatted file, returning structured data.
///
/// Text between records is treated as an implicit comment and skipped up to
/// the next `@`. `@string` definitions are collected as they appear and
/// substituted into later values; `@comment` and `@preamble` blocks are
/// consumed and discarded.
pub(crate) fn bibtex_parse<S: AsRef<str>>(bibtex_text: S) -> Result<Vec<RawBibEntry>> {
    let mut scanner = Scanner::new(bibtex_text.as_ref());
    let mut abbreviations = common_abbreviations();
    let mut entries = Vec::new();

    while scanner.skip_to_record() {
        scanner.skip_whitespace();
        let entry_type = scanner.read_identifier();
        if entry_type.is_empty() {
            return Err(scanner.error("expected an entry type after '@'"));
        }

        match entry_type.to_lowercase().as_str() {
            "comment" => skip_block(&mut scanner, "comment")?,
            "preamble" => skip_block(&mut scanner, "preamble")?,
            "string" => parse_abbreviation(&mut scanner, &mut abbreviations)?,
            entry_type => {
                let entry = parse_record(&mut scanner, entry_type.to_string(), &abbreviations)?;
                entries.push(entry);
            }
        }
    }

    Ok(entries)
}

/// Parse a regular record: citation key followed by `name = value` fields.
fn parse_record(
    scanner: &mut Scanner,
    entry_type: String,
    abbreviations: &HashMap<String, String>,
) -> Result<RawBibEntry> {
    scanner.skip_whitespace();
    let close = match scanner.bump() {
        Some('{') => '}',
        Some('(') => ')',
        Some(c) => {
            return Err(scanner.error(format!(
                "expected '{{' or '(' after '@{entry_type}', found '{c}'"
            )));
        }
        None => {
            return Err(scanner.error(format!("unexpected end of input after '@{entry_type}'")));
        }
    };

    scanner.skip_whitespace();
    let key = scanner.read_key(close);
    if key.is_empty() {
        return Err(scanner.error(format!("missing citation key in '@{entry_type}' entry")));
    }

    let mut raw = RawBibEntry::new(entry_type, key);

    scanner.skip_whitespace();
    match scanner.bump() {
        Some(',') => {}
        Some(c) if c == close => return Ok(raw),
        Some(c) => {
            return Err(scanner.error(format!(
                "expected ',' after citation key '{}', found '{c}'",
                raw.key
            )));
        }
        None => {
            return Err(scanner.error(format!("unexpected end of input in entry '{}'", raw.key)));
        }
    }

    loop {
        scanner.skip_whitespace();
        match scanner.peek() {
            Some(c) if c == close => {
                scanner.bump();
                return Ok(raw);
            }
            // Tolerate a trailing comma before the closing delimiter
            Some(',') => {
                scanner.bump();
                continue;
            }
            Some(_) => {}
            None => {
                return Err(
                    scanner.error(format!("unexpected end of input in entry '{}'", raw.key))
                );
            }
        }

        let name = scanner.read_identifier().to_lowercase();
        if name.is_empty() {
            return Err(scanner.error(format!("empty field name in entry '{}'", raw.key)));
        }

        scanner.skip_whitespace();
        if scanner.bump() != Some('=') {
            return Err(scanner.error(format!("expected '=' after field name '{name}'")));
        }

        let value = read_value(scanner, abbreviations)?;
        raw.add_field(name, value);

        scanner.skip_whitespace();
        match scanner.peek() {
            Some(',') => {
                scanner.bump();
            }
            Some(c) if c == close => {}
            Some(c) => {
                return Err(scanner.error(format!(
                    "expected ',' or '{close}' after field value, found '{c}'"
                )));
            }
            None => {
                return Err(
                    scanner.error(format!("unexpected end of input in entry '{}'", raw.key))
                );
            }
        }
    }
}

/// Parse an `@string{name = value}` abbreviation definition.
fn parse_abbreviation(
    scanner: &mut Scanner,
    abbreviations: &mut HashMap<String, String>,
) -> Result<()> {
    scanner.skip_whitespace();
    let close = match scanner.bump() {
        Some('{') => '}',
        Some('(') => ')',
        _ => return Err(scanner.error("expected '{' or '(' after @string")),
    };

    scanner.skip_whitespace();
    let name = scanner.read_identifier().to_lowercase();
    if name.is_empty() {
        return Err(scanner.error("missing abbreviation name in @string"));
    }

    scanner.skip_whitespace();
    if scanner.bump() != Some('=') {
        return Err(scanner.error(format!("expected '=' after abbreviation name '{name}'")));
    }

    let value = read_value(scanner, abbreviations)?;

    scanner.skip_whitespace();
    if scanner.bump() != Some(close) {
        return Err(scanner.error(format!("expected '{close}' to close @string block")));
    }

    abbreviations.insert(name, value);
    Ok(())
}

/// Consume a delimited `@comment` or `@preamble` block without keeping it.
///
/// A bare `@comment` with no delimiter is treated like any other implicit
/// comment text.
fn skip_block(scanner: &mut Scanner, kind: &str) -> Result<()> {
    scanner.skip_whitespace();
    let (open, close) = match scanner.peek() {
        Some('{') => ('{', '}'),
        Some('(') => ('(', ')'),
        _ => return Ok(()),
    };
    scanner.bump();

    let mut depth = 1usize;
    while let Some(c) = scanner.bump() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Ok(());
            }
        }
    }

    Err(scanner.error(format!("unexpected end of input in @{kind} block")))
}

/// Read a field value: one or more parts joined with `#`.
///
/// Parts may be brace-delimited, quote-delimited, or bare tokens. A bare
/// token starting with a digit is kept literally; any other bare token is
/// looked up in the abbreviation table and kept verbatim when unknown.
fn read_value(scanner: &mut Scanner, abbreviations: &HashMap<String, String>) -> Result<String> {
    let mut value = String::new();

    loop {
        scanner.skip_whitespace();
        match scanner.peek() {
            Some('{') => value.push_str(&read_braced(scanner)?),
            Some('"') => value.push_str(&read_quoted(scanner)?),
            Some(c) if is_ident_char(c) => {
                let token = scanner.read_identifier();
                if token.starts_with(|c: char| c.is_ascii_digit()) {
                    value.push_str(&token);
                } else {
                    match abbreviations.get(&token.to_lowercase()) {
                        Some(expansion) => value.push_str(expansion),
                        None => value.push_str(&token),
                    }
                }
            }
            Some(c) => return Err(scanner.error(format!("unexpected '{c}' in field value"))),
            None => return Err(scanner.error("unexpected end of input in field value")),
        }

        scanner.skip_whitespace();
        if scanner.peek() == Some('#') {
            scanner.bump();
            continue;
        }
        break;
    }

    Ok(normalize_value(&value))
}

/// Read a brace-delimited value part. Inner braces nest and are kept verbatim.
fn read_braced(scanner: &mut Scanner) -> Result<String> {
    scanner.bump();
    let mut content = String::new();
    let mut depth = 1usize;

    while let Some(c) = scanner.bump() {
        match c {
            '{' => {
                depth += 1;
                content.push(c);
            }
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(content);
                }
                content.push(c);
            }
            _ => content.push(c),
        }
    }

    Err(scanner.error("unclosed '{' in field value"))
}

/// Read a quote-delimited value part. Braces protect embedded quotes.
fn read_quoted(scanner: &mut Scanner) -> Result<String> {
    scanner.bump();
    let mut content = String::new();
    let mut depth = 0usize;

    while let Some(c) = scanner.bump() {
        match c {
            '{' => {
                depth += 1;
                content.push(c);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                content.push(c);
            }
            '"' if depth == 0 => return Ok(content),
            _ => content.push(c),
        }
    }

    Err(scanner.error("unclosed '\"' in field value"))
}

/// Collapse internal whitespace runs to a single space and trim the ends.
fn normalize_value(value: &str) -> String {
    WHITESPACE_RUN.replace_all(value.trim(), " ").into_owned()
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '+' | ':' | '/')
}

/// Month abbreviations predefined by the standard BibTeX styles.
fn common_abbreviations() -> HashMap<String, String> {
    const MONTHS: [(&str, &str); 12] = [
        ("jan", "January"),
        ("feb", "February"),
        ("mar", "March"),
        ("apr", "April"),
        ("may", "May"),
        ("jun", "June"),
        ("jul", "July"),
        ("aug", "August"),
        ("sep", "September"),
        ("oct", "October"),
        ("nov", "November"),
        ("dec", "December"),
    ];

    MONTHS
        .iter()
        .map(|&(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

/// Character scanner with line tracking for error reporting.
struct Scanner {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Scanner {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Advance past implicit comment text to just after the next `@`.
    ///
    /// Returns false when the end of input is reached instead.
    fn skip_to_record(&mut self) -> bool {
        while let Some(c) = self.bump() {
            if c == '@' {
                return true;
            }
        }
        false
    }

    fn read_identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if !is_ident_char(c) {
                break;
            }
            ident.push(c);
            self.bump();
        }
        ident
    }

    /// Read a citation key, stopping at whitespace, a comma, or the record's
    /// closing delimiter.
    fn read_key(&mut self, close: char) -> String {
        let mut key = String::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == ',' || c == close {
                break;
            }
            key.push(c);
            self.bump();
        }
        key
    }

    fn error(&self, message: impl Into<String>) -> BibtrendError {
        BibtrendError::MalformedInput {
            message: message.into(),
            line: self.line,
        }
    }
}
