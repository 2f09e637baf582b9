//! Reading geohash identifiers from input files.
//!
//! Input is read line by line, so a run only holds the current batch of
//! identifiers in memory.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use crate::error::{BatchError, BatchResult};

const GEOHASH_COLUMN: &str = "geohash";

/// Identifiers read lazily from a text or CSV source. Blank lines are skipped.
pub struct IdentifierReader<R> {
    lines: Lines<R>,
    /// `geohash` column for CSV input, `None` for one identifier per line.
    column: Option<usize>,
}

impl<R: BufRead> IdentifierReader<R> {
    /// One identifier per line.
    pub fn text(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            column: None,
        }
    }

    /// CSV with a header row containing a `geohash` column. Other columns are
    /// ignored.
    ///
    /// Rows too short to have the column yield an empty identifier, which the
    /// service then rejects and the run records as a failure.
    pub fn csv(reader: R) -> BatchResult<Self> {
        let mut lines = reader.lines();

        let header = loop {
            match lines.next() {
                None => return Err(BatchError::EmptyInput),
                Some(line) => {
                    let line = line?;
                    if !line.trim().is_empty() {
                        break line;
                    }
                }
            }
        };
        let column = split_record(header.trim_start_matches('\u{feff}'))
            .iter()
            .position(|name| name.trim() == GEOHASH_COLUMN)
            .ok_or(BatchError::MissingGeohashColumn)?;

        Ok(Self {
            lines,
            column: Some(column),
        })
    }
}

impl<R: BufRead> Iterator for IdentifierReader<R> {
    type Item = BatchResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            if line.trim().is_empty() {
                continue;
            }

            let identifier = match self.column {
                None => line.trim().to_string(),
                Some(column) => split_record(&line)
                    .get(column)
                    .map(|field| field.trim().to_string())
                    .unwrap_or_default(),
            };
            return Some(Ok(identifier));
        }
    }
}

/// Open `path` for reading.
///
/// `.txt` files hold one identifier per line; anything else is read as CSV.
pub fn open_identifiers(path: &Path) -> BatchResult<IdentifierReader<BufReader<File>>> {
    let reader = BufReader::new(File::open(path)?);

    let is_text = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("txt"));

    if is_text {
        Ok(IdentifierReader::text(reader))
    } else {
        IdentifierReader::csv(reader)
    }
}

/// Read every identifier in `path`.
pub fn read_identifiers(path: &Path) -> BatchResult<Vec<String>> {
    open_identifiers(path)?.collect()
}

/// One identifier per non-blank line.
pub fn parse_text_identifiers(content: &str) -> Vec<String> {
    IdentifierReader::text(content.as_bytes())
        .filter_map(Result::ok)
        .collect()
}

/// The `geohash` column of a CSV document.
pub fn parse_csv_identifiers(content: &str) -> BatchResult<Vec<String>> {
    IdentifierReader::csv(content.as_bytes())?.collect()
}

/// Split one CSV line into fields, honouring double-quoted fields with `""`
/// escapes. Quoted fields spanning several lines are not supported.
fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            '\r' if !in_quotes => {}
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}
