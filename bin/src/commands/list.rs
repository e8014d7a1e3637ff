//! List command implementation.
//!
//! This module handles listing registered reports with optional filtering.

use crate::display::{layout_name, parse_market};
use anyhow::Result;
use ercot_lib::prelude::*;

/// List registered reports with an optional market filter or search pattern.
pub(crate) fn list_reports(market: Option<&str>, search: Option<&str>) -> Result<()> {
    let registry = ReportRegistry::global();

    let mut reports: Vec<_> = match (market, search) {
        (Some(m), _) => {
            let market = parse_market(m)?;
            registry.by_market(market).collect()
        }
        (_, Some(pattern)) => registry.search(pattern),
        (None, None) => registry.all().collect(),
    };
    reports.sort_by(|a, b| a.id().cmp(b.id()));

    if reports.is_empty() {
        println!("No reports found.");
        return Ok(());
    }

    println!("{:<22} {:<36} {:<9} {:<10}", "ID", "NAME", "MARKET", "LAYOUT");
    println!("{}", "-".repeat(80));

    for report in &reports {
        println!(
            "{:<22} {:<36} {:<9} {:<10}",
            report.id(),
            report.name(),
            report.market(),
            layout_name(report)
        );
    }

    println!("\nTotal: {} reports", reports.len());
    Ok(())
}
