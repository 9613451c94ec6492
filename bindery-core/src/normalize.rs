use crate::{Result, SqlError};
use log::debug;
use std::{
    collections::HashMap,
    fmt::Write,
    sync::{Arc, PoisonError, RwLock},
};

/// A named placeholder extracted from SQL text together with every position
/// it occupies in the normalized statement.
///
/// Positions are 1-based (driver placeholder numbering), non-empty and
/// strictly increasing. A name re-occurring in the text merges into the same
/// entry instead of creating a duplicate. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedParameter {
    name: String,
    positions: Vec<u32>,
}

impl NamedParameter {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn positions(&self) -> &[u32] {
        &self.positions
    }
}

/// The driver's native positional-placeholder token. Never assumed by the
/// core; every driver states its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Placeholder {
    /// `?`, the most common form.
    #[default]
    QuestionMark,
    /// A prefix followed by the 1-based position, e.g. `$1`, `$2`.
    Numbered(char),
}

impl Placeholder {
    fn write(&self, out: &mut String, position: u32) {
        match self {
            Placeholder::QuestionMark => out.push('?'),
            Placeholder::Numbered(prefix) => {
                out.push(*prefix);
                // Writing to a String cannot fail.
                let _ = write!(out, "{position}");
            }
        }
    }
}

/// Immutable artifact of normalizing one SQL source text: the original text,
/// the driver-ready positional text, and the name -> positions index.
///
/// Safe to share across statements and threads; created once per distinct
/// source text and cached (see [`SqlCache`]).
#[derive(Debug)]
pub struct SqlInfo {
    unparsed: String,
    normalized: String,
    parameters: Vec<NamedParameter>,
}

impl SqlInfo {
    pub fn unparsed(&self) -> &str {
        &self.unparsed
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn parameters(&self) -> &[NamedParameter] {
        &self.parameters
    }

    pub fn positions(&self, name: &str) -> Option<&[u32]> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.positions.as_slice())
    }

    /// Total number of positional placeholders emitted, equal to the sum of
    /// all parameters' position-list lengths.
    pub fn placeholder_count(&self) -> usize {
        self.parameters.iter().map(|p| p.positions.len()).sum()
    }
}

fn malformed_sql(sql: &str, offset: usize, reason: impl Into<String>) -> crate::Error {
    SqlError::MalformedSql {
        reason: reason.into(),
        offset,
        sql: sql.to_owned(),
    }
    .into()
}

fn malformed_parameter(sql: &str, offset: usize, reason: impl Into<String>) -> crate::Error {
    SqlError::MalformedParameter {
        reason: reason.into(),
        offset,
        sql: sql.to_owned(),
    }
    .into()
}

/// Lexical context of the scanner. Placeholder-like text inside literals,
/// quoted identifiers and comments must be copied verbatim.
enum Mode {
    Plain,
    /// Inside `'...'`; remembers the opening offset for error reporting.
    SingleQuoted(usize),
    /// Inside `"..."`.
    DoubleQuoted(usize),
    LineComment,
    /// Inside `/* ... */`.
    BlockComment(usize),
}

/// Extracts named parameters (`:name`) from a SQL string and replaces them
/// with the driver's positional placeholders.
///
/// Pure function of the input text and placeholder syntax: one pass over the
/// characters, no lookbehind beyond the escape handling of quoted literals.
/// Re-normalizing the output of a statement whose parameters were already
/// replaced yields the identical text.
pub fn normalize(sql: &str, placeholder: Placeholder) -> Result<SqlInfo> {
    let mut normalized = String::with_capacity(sql.len());
    let mut parameters: Vec<NamedParameter> = Vec::new();
    let mut counter = 0u32;
    let mut mode = Mode::Plain;
    let mut chars = sql.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        match mode {
            Mode::Plain => match c {
                ':' => {
                    let name_start = offset + 1;
                    let mut name_end = name_start;
                    match chars.peek() {
                        Some(&(_, first)) if first.is_ascii_alphabetic() || first == '_' => {
                            while let Some(&(i, c)) = chars.peek() {
                                if c.is_ascii_alphanumeric() || c == '_' {
                                    name_end = i + c.len_utf8();
                                    chars.next();
                                } else {
                                    break;
                                }
                            }
                        }
                        Some(&(_, first)) if first.is_ascii_digit() => {
                            return Err(malformed_parameter(
                                sql,
                                offset,
                                "parameter name must not start with a digit",
                            ));
                        }
                        _ => {
                            return Err(malformed_parameter(
                                sql,
                                offset,
                                "zero-length parameter name",
                            ));
                        }
                    }
                    if let Some(&(i, ':')) = chars.peek() {
                        return Err(malformed_parameter(
                            sql,
                            i,
                            format!(
                                "adjacent parameters at offsets {offset} and {i} cannot yield valid SQL"
                            ),
                        ));
                    }
                    let name = &sql[name_start..name_end];
                    counter += 1;
                    placeholder.write(&mut normalized, counter);
                    match parameters.iter_mut().find(|p| p.name == name) {
                        Some(parameter) => parameter.positions.push(counter),
                        None => parameters.push(NamedParameter {
                            name: name.to_owned(),
                            positions: vec![counter],
                        }),
                    }
                }
                '\'' => {
                    normalized.push(c);
                    mode = Mode::SingleQuoted(offset);
                }
                '"' => {
                    normalized.push(c);
                    mode = Mode::DoubleQuoted(offset);
                }
                '-' if matches!(chars.peek(), Some(&(_, '-'))) => {
                    normalized.push(c);
                    mode = Mode::LineComment;
                }
                '/' if matches!(chars.peek(), Some(&(_, '*'))) => {
                    normalized.push(c);
                    normalized.push('*');
                    chars.next();
                    mode = Mode::BlockComment(offset);
                }
                _ => normalized.push(c),
            },
            Mode::SingleQuoted(start) => {
                normalized.push(c);
                match c {
                    // A doubled quote is an escaped quote, not a terminator.
                    '\'' => match chars.peek() {
                        Some(&(_, '\'')) => {
                            normalized.push('\'');
                            chars.next();
                        }
                        _ => mode = Mode::Plain,
                    },
                    '\\' => {
                        if let Some(&(_, escaped)) = chars.peek() {
                            normalized.push(escaped);
                            chars.next();
                        } else {
                            return Err(malformed_sql(sql, start, "unterminated string literal"));
                        }
                    }
                    _ => {}
                }
            }
            Mode::DoubleQuoted(_) => {
                normalized.push(c);
                if c == '"' {
                    mode = Mode::Plain;
                }
            }
            Mode::LineComment => {
                normalized.push(c);
                if c == '\n' {
                    mode = Mode::Plain;
                }
            }
            Mode::BlockComment(_) => {
                normalized.push(c);
                if c == '*' && matches!(chars.peek(), Some(&(_, '/'))) {
                    normalized.push('/');
                    chars.next();
                    mode = Mode::Plain;
                }
            }
        }
    }
    match mode {
        Mode::SingleQuoted(start) => {
            return Err(malformed_sql(sql, start, "unterminated string literal"));
        }
        Mode::DoubleQuoted(start) => {
            return Err(malformed_sql(sql, start, "unterminated quoted identifier"));
        }
        Mode::BlockComment(start) => {
            return Err(malformed_sql(sql, start, "unterminated block comment"));
        }
        _ => {}
    }
    debug!(
        "Normalized SQL with {} placeholder(s) across {} parameter(s)",
        counter,
        parameters.len()
    );
    Ok(SqlInfo {
        unparsed: sql.to_owned(),
        normalized,
        parameters,
    })
}

/// Process-wide cache of [`SqlInfo`] keyed by source text and placeholder
/// syntax.
///
/// Entries are immutable and value-equal for the same key, so concurrent
/// insert races are benign: the last writer wins and readers keep whichever
/// `Arc` they already cloned.
#[derive(Default)]
pub struct SqlCache {
    entries: RwLock<HashMap<(String, Placeholder), Arc<SqlInfo>>>,
}

impl SqlCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_normalize(&self, sql: &str, placeholder: Placeholder) -> Result<Arc<SqlInfo>> {
        let key = (sql.to_owned(), placeholder);
        if let Some(info) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(info.clone());
        }
        let info = Arc::new(normalize(sql, placeholder)?);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, info.clone());
        Ok(info)
    }
}
