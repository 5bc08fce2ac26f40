use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::utils::validation::{check_row_limit, validate_text_content, ValidationError};

/// A data row: header name to raw value
pub type FieldMap = BTreeMap<String, String>;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    InvalidContent(#[from] ValidationError),

    #[error("No header row found")]
    MissingHeader,

    #[error("Unterminated quoted field starting on line {0}")]
    UnterminatedQuote(usize),

    #[error("Too many rows (maximum {0})")]
    TooManyRows(usize),
}

/// Pick the delimiter for a file: by extension, else by the header line
#[must_use]
pub fn detect_delimiter(path: Option<&Path>, content: &str) -> char {
    let extension = path
        .and_then(Path::extension)
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);
    match extension.as_deref() {
        Some("tsv" | "tab") => return '\t',
        Some("csv") => return ',',
        _ => {}
    }

    let header = content.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    ['\t', '|', ',']
        .into_iter()
        .map(|d| (d, header.matches(d).count()))
        .filter(|(_, count)| *count > 0)
        .max_by_key(|(_, count)| *count)
        .map_or(',', |(delimiter, _)| delimiter)
}

/// Parse a delimited file with a header row
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_rows_file(path: &Path) -> Result<Vec<FieldMap>, ParseError> {
    let bytes = std::fs::read(path)?;
    validate_text_content(&bytes)?;
    let content = String::from_utf8_lossy(&bytes);
    let delimiter = detect_delimiter(Some(path), &content);
    parse_rows_text(&content, delimiter)
}

/// Parse delimited text whose first non-blank record is the header.
///
/// Fields may be double-quoted; a quoted field can contain the delimiter,
/// line breaks and doubled quotes. Values are trimmed. Records shorter than
/// the header simply lack the trailing columns.
///
/// # Errors
///
/// Returns `ParseError::MissingHeader` for input without records,
/// `ParseError::UnterminatedQuote` for an unclosed quote, or
/// `ParseError::TooManyRows` if the row limit is exceeded.
pub fn parse_rows_text(text: &str, delimiter: char) -> Result<Vec<FieldMap>, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = split_records(text, delimiter)?
        .into_iter()
        .filter(|record| record.iter().any(|f| !f.trim().is_empty()));

    let header: Vec<String> = records
        .next()
        .ok_or(ParseError::MissingHeader)?
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in records {
        if check_row_limit(rows.len()).is_some() {
            return Err(ParseError::TooManyRows(rows.len()));
        }

        let row: FieldMap = header
            .iter()
            .zip(record)
            .filter(|(name, _)| !name.is_empty())
            .map(|(name, value)| (name.clone(), value.trim().to_string()))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

fn split_records(text: &str, delimiter: char) -> Result<Vec<Vec<String>>, ParseError> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quote_line = 0;
    let mut line = 1;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => {
                    if c == '\n' {
                        line += 1;
                    }
                    field.push(c);
                }
            }
            continue;
        }

        match c {
            '"' if field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
                quote_line = line;
            }
            '\n' => {
                line += 1;
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            c if c == delimiter => record.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(ParseError::UnterminatedQuote(quote_line));
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    Ok(records)
}
