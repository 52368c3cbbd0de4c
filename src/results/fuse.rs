//! Element-wise averaging of results tables taken under the same setup

use super::{FetchOutcome, ResultsTable};
use crate::errors::{BenchError, Result};

/// Average `tables` cell by cell.
///
/// Columns are matched by URL and keep the order of the first table. A cell
/// that failed in any input is a failure in the output.
pub fn fuse(tables: &[ResultsTable]) -> Result<ResultsTable> {
    let (first, rest) = tables
        .split_first()
        .ok_or_else(|| BenchError::table("Nothing to fuse"))?;
    if rest.is_empty() {
        return Err(BenchError::table("Fusing needs at least two tables"));
    }

    for (offset, table) in rest.iter().enumerate() {
        check_compatible(first, table, offset + 2)?;
    }

    let inputs = tables.len() as f64;
    let columns: Vec<Vec<FetchOutcome>> = first
        .iter()
        .map(|(url, column)| {
            (0..first.run_count())
                .map(|run_index| {
                    let mut sum = column[run_index].elapsed_seconds()?;
                    for table in rest {
                        sum += table.column(url)?[run_index].elapsed_seconds()?;
                    }
                    Some(sum / inputs)
                })
                .map(|mean| mean.map_or(FetchOutcome::Failure, FetchOutcome::success))
                .collect::<Vec<_>>()
        })
        .collect();

    ResultsTable::from_columns(first.urls().to_vec(), first.run_count(), columns)
}

/// `position` is the 1-based index of `other` among the inputs
fn check_compatible(first: &ResultsTable, other: &ResultsTable, position: usize) -> Result<()> {
    if other.run_count() != first.run_count() {
        return Err(BenchError::table(format!(
            "Table {} has {} runs, the first table has {}",
            position,
            other.run_count(),
            first.run_count()
        )));
    }

    let same_urls = other.column_count() == first.column_count()
        && first.urls().iter().all(|url| other.column(url).is_some());
    if !same_urls {
        return Err(BenchError::table(format!(
            "Table {} does not have the same URL columns as the first table",
            position
        )));
    }

    Ok(())
}
