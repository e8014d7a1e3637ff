//! Info command implementation.
//!
//! This module handles displaying the endpoint, query parameters and output
//! columns of a registered report.

use crate::display::layout_name;
use anyhow::{Context, Result};
use ercot_lib::prelude::*;
use ercot_lib::{FieldKind, ReportLayout};

/// Show detailed information about a report.
pub(crate) fn show_info(report_id: &str) -> Result<()> {
    let registry = ReportRegistry::global();
    let report = registry
        .get(report_id)
        .with_context(|| format!("Unknown report: {report_id}"))?;

    println!("Report:      {}", report.name());
    println!("ID:          {}", report.id());
    println!("Market:      {}", report.market());
    println!("Description: {}", report.description());
    println!("Endpoint:    {}", report.url());
    println!("Layout:      {}", layout_name(report));

    let params = report.params();
    println!("\nQuery Parameters:");
    println!("  {:<14} {}", "from", params.from);
    println!("  {:<14} {}", "to", params.to);
    let optional = [
        ("entity", &params.entity),
        ("posted-from", &params.posted_from),
        ("posted-to", &params.posted_to),
        ("model", &params.model),
    ];
    for (flag, name) in optional {
        if let Some(name) = name {
            println!("  {flag:<14} {name}");
        }
    }
    println!("  {:<14} {}", "size", params.size);

    println!("\nColumns:");
    match report.layout() {
        ReportLayout::Grid(grid) => {
            let index = if grid.interval.is_some() {
                "Date, HE, Interval"
            } else {
                "Date, HE"
            };
            println!("  {index}, one column per entity");
            if let Some(average) = &grid.average {
                println!("  {average} (mean of present values)");
            }
            if let Some(filter) = &grid.filter {
                println!("  Records kept where field {} = {}", filter.field, filter.equals);
            }
        }
        ReportLayout::Flat(flat) => {
            let names: Vec<&str> = flat
                .columns
                .iter()
                .flat_map(|c| match c.kind {
                    FieldKind::ScedTimestamp => vec!["Date", "HE", "Interval"],
                    _ => vec![c.name.as_str()],
                })
                .collect();
            println!("  {}", names.join(", "));
        }
        ReportLayout::Raw => println!("  Fields passed through by position"),
    }

    Ok(())
}
