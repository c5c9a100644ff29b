//! Output formatting utilities.

use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::error::Result;
use crate::OutputFormat;

/// A key-value row for report tables.
#[derive(Tabled)]
pub struct InfoRow {
    #[tabled(rename = "Property")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl InfoRow {
    pub fn new(key: &str, value: impl ToString) -> Self {
        Self { key: key.to_string(), value: value.to_string() }
    }
}

/// Format report rows as a table.
pub fn format_info_table(rows: Vec<InfoRow>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

/// Format pairs one per line, tab separated.
pub fn format_pairs(pairs: &[(u32, u32)]) -> String {
    pairs.iter().map(|(a, b)| format!("{a}\t{b}")).collect::<Vec<_>>().join("\n")
}

/// Print a report: the table (and pairs, if any) as text, or `report` as JSON.
pub fn print_report<T: Serialize>(
    format: OutputFormat,
    rows: Vec<InfoRow>,
    pairs: Option<&[(u32, u32)]>,
    report: &T,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!("{}", format_info_table(rows));
            if let Some(pairs) = pairs.filter(|p| !p.is_empty()) {
                println!("{}", format_pairs(pairs));
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
    }
    Ok(())
}
