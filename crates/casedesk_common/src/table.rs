//! Parser for delimiter-separated spreadsheet exports.
//!
//! Expected shape (sheet export with `;` delimiter, every field quoted):
//! ```text
//! "Nº";"Data comunicação";"Estado";"Ok/NO";"Fornecedor";"Motivo"
//! "101";"25/12/2025";"Aberto";"";"EDP";"Fatura errada"
//! ```
//! The header names are trimmed. Blank lines are skipped. A row whose field
//! count differs from the header's is a structural failure for the whole
//! table, as is an unterminated quote.

use crate::error::TableError;
use crate::record::RawRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

fn default_delimiter() -> char {
    ';'
}

/// How the export is laid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDialect {
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Lines to skip before the header row
    #[serde(default)]
    pub header_row: usize,
}

impl Default for TableDialect {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            header_row: 0,
        }
    }
}

/// Parse an export into raw records keyed by header name.
pub fn parse_table(text: &str, dialect: &TableDialect) -> Result<Vec<RawRecord>, TableError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = logical_lines(text, dialect.delimiter)?
        .into_iter()
        .skip(dialect.header_row);

    let (header_line, header_text) = lines
        .by_ref()
        .find(|(_, line)| !line.trim().is_empty())
        .ok_or(TableError::MissingHeader {
            line: dialect.header_row + 1,
        })?;

    let header = dedupe_header(
        split_fields(header_text, dialect.delimiter, header_line)?
            .into_iter()
            .map(|name| name.trim().to_string())
            .collect(),
    );

    let mut records: Vec<RawRecord> = Vec::new();
    for (line_num, line) in lines {
        if line.trim().is_empty() {
            continue;
        }

        let fields = split_fields(line, dialect.delimiter, line_num)?;
        if fields.len() != header.len() {
            return Err(TableError::FieldCount {
                line: line_num,
                expected: header.len(),
                found: fields.len(),
            });
        }

        records.push(header.iter().cloned().zip(fields).collect());
    }

    Ok(records)
}

/// Rename repeated header names to `name_1`, `name_2`, ...
/// The first occurrence keeps its name.
fn dedupe_header(names: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(names.len());

    for name in names {
        let mut unique = name.clone();
        let mut suffix = 1;
        while seen.contains(&unique) {
            unique = format!("{}_{}", name, suffix);
            suffix += 1;
        }
        if unique != name {
            warn!("Duplicate column '{}' renamed to '{}'", name, unique);
        }
        seen.insert(unique.clone());
        out.push(unique);
    }

    out
}

/// Split text into records, keeping newlines that sit inside quoted fields.
/// Yields (1-based starting line number, record text).
fn logical_lines(text: &str, delimiter: char) -> Result<Vec<(usize, &str)>, TableError> {
    let mut out = Vec::new();
    let mut in_quotes = false;
    let mut at_field_start = true;
    let mut start = 0;
    let mut start_line = 1;
    let mut line = 1;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if in_quotes {
            match ch {
                '"' if matches!(chars.peek(), Some((_, '"'))) => {
                    chars.next();
                }
                '"' => in_quotes = false,
                '\n' => line += 1,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' if at_field_start => {
                in_quotes = true;
                at_field_start = false;
            }
            '\n' => {
                out.push((start_line, text[start..idx].trim_end_matches('\r')));
                start = idx + 1;
                line += 1;
                start_line = line;
                at_field_start = true;
            }
            c if c == delimiter => at_field_start = true,
            _ => at_field_start = false,
        }
    }

    if in_quotes {
        return Err(TableError::UnterminatedQuote { line: start_line });
    }
    if start < text.len() {
        out.push((start_line, text[start..].trim_end_matches('\r')));
    }
    Ok(out)
}

/// Split one record on the delimiter. A field is quoted only when it starts
/// with `"`; quoted fields may contain the delimiter and `""` is a literal
/// quote. A `"` anywhere else is kept as is.
fn split_fields(line: &str, delimiter: char, line_num: usize) -> Result<Vec<String>, TableError> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut at_field_start = true;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(ch);
            }
        } else if ch == '"' && at_field_start {
            in_quotes = true;
            at_field_start = false;
        } else if ch == delimiter {
            fields.push(std::mem::take(&mut field));
            at_field_start = true;
        } else {
            field.push(ch);
            at_field_start = false;
        }
    }

    if in_quotes {
        return Err(TableError::UnterminatedQuote { line: line_num });
    }
    fields.push(field);
    Ok(fields)
}
