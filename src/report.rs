//! Report
//!
//! Renders a lifetime value ranking as a table.

use std::io;

use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

use crate::ranking::CustomerValue;

/// Errors that can occur when writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Write the ranking as a table, formatting values in `currency`.
///
/// # Errors
///
/// Returns a [`ReportError`] if writing to `out` fails.
pub fn write_ranking(
    mut out: impl io::Write,
    ranking: &[CustomerValue],
    currency: &'static Currency,
) -> Result<(), ReportError> {
    let mut builder = Builder::default();

    builder.push_record(["#", "Customer", "Lifetime Value"]);

    for (rank, value) in ranking.iter().enumerate() {
        builder.push_record([
            (rank + 1).to_string(),
            value.customer.to_string(),
            Money::from_decimal(value.ltv, currency).to_string(),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.modify(Columns::new(2..3), Alignment::right());

    writeln!(out, "{table}")?;

    Ok(())
}
