//! `report` and `fuse` commands over exported tables

use crate::config::parser::{FuseArgs, ReportArgs};
use crate::errors::Result;
use crate::results;
use crate::stats::TableSummary;

use tracing::info;

/// Print the statistics of an exported table
pub fn report(args: &ReportArgs) -> Result<()> {
    let table = results::import(&args.input)?;
    info!(
        "Loaded {} URLs x {} runs from {}",
        table.column_count(),
        table.run_count(),
        args.input.display()
    );

    let summary = TableSummary::from_table(&table);
    if args.json {
        println!("{}", summary.to_json_pretty()?);
    } else {
        summary.print_report(None);
    }
    Ok(())
}

/// Average the input tables into one file
pub fn fuse(args: &FuseArgs) -> Result<()> {
    let tables = args
        .inputs
        .iter()
        .map(|path| results::import(path))
        .collect::<Result<Vec<_>>>()?;

    let fused = results::fuse(&tables)?;
    results::export(&fused, &args.output)?;
    info!(
        "Fused {} tables into {}",
        tables.len(),
        args.output.display()
    );
    Ok(())
}
