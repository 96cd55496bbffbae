// src/storage/csv.rs

//! Minimal CSV codec for season output files: quote-aware writer and reader.

use std::io::{self, Write};
use std::mem::take;

use crate::models::FixtureRecord;

pub const SEPARATOR: char = ',';

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single row to any writer.
pub fn write_row<W: Write>(mut w: W, row: &[String], sep: char) -> io::Result<()> {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            write!(w, "{sep}")?;
        }
        if needs_quotes(cell, sep) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            w.write_all(cell.as_bytes())?;
        }
    }
    writeln!(w)
}

/// Header plus one row per record, in declared column order.
pub fn encode_records(records: &[FixtureRecord]) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_row(&mut buf, &FixtureRecord::header(), SEPARATOR)?;
    for record in records {
        write_row(&mut buf, &record.to_row(), SEPARATOR)?;
    }
    Ok(buf)
}

/// Parse delimited text (quotes and CRLF tolerant). Blank lines are skipped.
pub fn parse_rows(text: &str, sep: char) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut field = String::new();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    let flush = |row: &mut Vec<String>, rows: &mut Vec<Vec<String>>| {
        if !(row.len() == 1 && row[0].is_empty()) {
            rows.push(take(row));
        } else {
            row.clear();
        }
    };

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            c if c == sep && !in_quotes => row.push(take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(take(&mut field));
                flush(&mut row, &mut rows);
            }
            _ => field.push(ch),
        }
    }

    // Trailing row without a newline, even if quotes were unterminated.
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        flush(&mut row, &mut rows);
    }
    rows
}

/// Header and body rows of a season file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn parse(text: &str) -> Self {
        let mut rows = parse_rows(text, SEPARATOR);
        let header = if rows.is_empty() {
            Vec::new()
        } else {
            rows.remove(0)
        };
        Self { header, rows }
    }

    /// Whether the header is exactly the declared record columns.
    pub fn has_record_header(&self) -> bool {
        self.header == FixtureRecord::header()
    }

    /// Cell of `row` under column `name`; empty cells read as absent.
    pub fn cell(&self, row: usize, name: &str) -> Option<&str> {
        let col = self.header.iter().position(|h| h == name)?;
        self.rows
            .get(row)?
            .get(col)
            .map(String::as_str)
            .filter(|c| !c.is_empty())
    }
}
