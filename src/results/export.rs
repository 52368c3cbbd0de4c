//! CSV export and import of results tables
//!
//! Layout: a header row with an empty corner cell followed by one cell per
//! URL, then one row per run index labelled `fetch_<i>`. Successful cells hold
//! elapsed seconds, failed cells are empty.

use super::{FetchOutcome, ResultsTable};
use crate::constants::{CSV_DELIMITER, RUN_LABEL_PREFIX};
use crate::errors::{BenchError, ErrorContext, Result};

use std::path::Path;
use tracing::debug;

/// Write `table` to `path`, replacing any existing file
pub fn export(table: &ResultsTable, path: &Path) -> Result<()> {
    std::fs::write(path, render_csv(table))
        .with_io_context(&format!("Cannot write results to '{}'", path.display()))?;
    debug!(
        "Exported {}x{} results table to {}",
        table.run_count(),
        table.column_count(),
        path.display()
    );
    Ok(())
}

/// Read a table previously written by [`export`]
pub fn import(path: &Path) -> Result<ResultsTable> {
    let content = std::fs::read_to_string(path)
        .with_io_context(&format!("Cannot read results from '{}'", path.display()))?;
    parse_csv(&content).map_err(|e| match e {
        BenchError::Table(msg) => BenchError::table(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}

/// Render the table as CSV text
pub fn render_csv(table: &ResultsTable) -> String {
    let mut out = String::new();

    // Column header; the corner cell is the (unnamed) index column
    let mut header = vec![String::new()];
    header.extend(table.urls().iter().map(|url| escape_field(url)));
    push_record(&mut out, &header);

    for run_index in 0..table.run_count() {
        let mut record = vec![format!("{}{}", RUN_LABEL_PREFIX, run_index)];
        record.extend(table.row(run_index).map(|outcome| match outcome {
            FetchOutcome::Success { elapsed_seconds } => elapsed_seconds.to_string(),
            FetchOutcome::Failure => String::new(),
        }));
        push_record(&mut out, &record);
    }

    out
}

fn push_record(out: &mut String, fields: &[String]) {
    let delimiter = CSV_DELIMITER.to_string();
    out.push_str(&fields.join(&delimiter));
    out.push('\n');
}

fn escape_field(field: &str) -> String {
    if field.contains([CSV_DELIMITER, '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Parse CSV text into a table
pub fn parse_csv(content: &str) -> Result<ResultsTable> {
    let mut lines = content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header_line) = lines
        .next()
        .with_table_context("Missing header row")?;
    let header = split_record(header_line, 1)?;
    let urls: Vec<String> = header.into_iter().skip(1).collect();
    if urls.is_empty() {
        return Err(BenchError::table("Header row has no URL columns"));
    }

    let mut columns: Vec<Vec<FetchOutcome>> = vec![Vec::new(); urls.len()];
    for (line_index, line) in lines {
        let line_number = line_index + 1;
        let record = split_record(line, line_number)?;
        if record.len() != urls.len() + 1 {
            return Err(BenchError::table(format!(
                "Line {} has {} cells, expected {}",
                line_number,
                record.len(),
                urls.len() + 1
            )));
        }

        // The first cell is the run label; rows are taken in file order
        for (column, cell) in columns.iter_mut().zip(record.iter().skip(1)) {
            column.push(parse_cell(cell, line_number)?);
        }
    }

    let run_count = columns.first().map_or(0, Vec::len);
    ResultsTable::from_columns(urls, run_count, columns)
}

fn parse_cell(cell: &str, line_number: usize) -> Result<FetchOutcome> {
    let cell = cell.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Ok(FetchOutcome::Failure);
    }
    cell.parse::<f64>()
        .map(FetchOutcome::success)
        .with_table_context(&format!("Line {}: invalid time '{}'", line_number, cell))
}

/// Split one CSV line, honouring double-quoted fields
fn split_record(line: &str, line_number: usize) -> Result<Vec<String>> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            ('"', true) => in_quotes = false,
            ('"', false) if field.is_empty() => in_quotes = true,
            (c, false) if c == CSV_DELIMITER => fields.push(std::mem::take(&mut field)),
            (c, _) => field.push(c),
        }
    }

    if in_quotes {
        return Err(BenchError::table(format!(
            "Line {}: unterminated quoted field",
            line_number
        )));
    }
    fields.push(field);
    Ok(fields)
}
