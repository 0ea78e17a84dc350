//! Output rendering for rows and dataset listings.

use crate::models::{Dataset, Row, ServiceHealth};

/// Print one row as JSON (pretty or compact) to stdout.
pub fn print_row(row: &Row, compact: bool) -> anyhow::Result<()> {
    let rendered = if compact {
        serde_json::to_string(row)?
    } else {
        serde_json::to_string_pretty(row)?
    };
    println!("{}", rendered);
    Ok(())
}

pub fn print_rows(rows: &[Row], compact: bool) -> anyhow::Result<()> {
    for row in rows {
        print_row(row, compact)?;
    }
    Ok(())
}

/// Print a fixed-width dataset listing.
pub fn print_dataset_table(datasets: &[Dataset]) {
    if datasets.is_empty() {
        println!("no datasets");
        return;
    }
    println!("{:<26} {:<24} {:<16} {}", "ID", "NAME", "OWNER", "SOURCE");
    for dataset in datasets {
        println!(
            "{:<26} {:<24} {:<16} {}",
            dataset.id, dataset.name, dataset.owner, dataset.source
        );
    }
}

pub fn print_dataset(dataset: &Dataset) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(dataset)?);
    Ok(())
}

pub fn print_health(health: &ServiceHealth) {
    match &health.version {
        Some(version) => println!("{} (version {})", health.status, version),
        None => println!("{}", health.status),
    }
}
