//! CSV output of computed cells.

use std::io::{self, Write};

use stats_engine::CellStatsResponse;

/// Writes one row per cell.
///
/// The header is `geohash` followed by the statistic names of the first
/// record written. Later rows follow that header: statistics it does not name
/// are dropped and statistics a row lacks are written empty. Nothing is
/// written until the first record arrives.
pub struct StatsCsvWriter<W: Write> {
    out: W,
    columns: Option<Vec<String>>,
    rows: usize,
}

impl<W: Write> StatsCsvWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            columns: None,
            rows: 0,
        }
    }

    /// Statistic columns, once the header has been written.
    pub fn columns(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }

    /// Data rows written so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn write_record(&mut self, record: &CellStatsResponse) -> io::Result<()> {
        if self.columns.is_none() {
            let columns: Vec<String> = record.stats.keys().cloned().collect();
            let header: Vec<&str> = std::iter::once("geohash")
                .chain(columns.iter().map(String::as_str))
                .collect();
            write_line(&mut self.out, &header)?;
            self.columns = Some(columns);
        }

        let mut fields = vec![record.geohash.clone()];
        if let Some(columns) = &self.columns {
            fields.extend(columns.iter().map(|name| {
                record
                    .stats
                    .get(name)
                    .map(|v| v.to_string())
                    .unwrap_or_default()
            }));
        }
        let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
        write_line(&mut self.out, &fields)?;

        self.rows += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

fn write_line<W: Write>(out: &mut W, fields: &[&str]) -> io::Result<()> {
    let line: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
    writeln!(out, "{}", line.join(","))
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
