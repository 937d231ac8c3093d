// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

//! Display models for the dashboard's table views. Rendering to markup is
//! left to the caller; cells arrive formatted and flagged for emphasis.

use crate::aggregate::{Aggregate, PivotTable, SummaryRow};
use crate::dataset::{cell, Cell, SourceColumn, Table};
use crate::error::EmptyResultWarning;
use crate::schema::{Dimension, Measure, Placement};
use serde::Serialize;

pub const DEFAULT_PREVIEW_ROWS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyledCell {
    pub text: String,
    pub numeric: bool,
    pub highlight: bool,
    /// Position of the value within the table's range, `0.0..=1.0`.
    pub shade: Option<f64>,
}
impl StyledCell {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            numeric: false,
            highlight: false,
            shade: None,
        }
    }
    fn number(text: String) -> Self {
        Self {
            text,
            numeric: true,
            highlight: false,
            shade: None,
        }
    }
}
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyledRow {
    pub label: Option<String>,
    pub cells: Vec<StyledCell>,
}
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyledTable {
    pub index_header: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<StyledRow>,
}

/// Source records in the table's column order. With `highlight`, every cell
/// holding the column maximum is flagged.
pub fn record_table(
    table: &Table,
    records: &[&Placement],
    highlight: Option<Measure>,
) -> Result<StyledTable, EmptyResultWarning> {
    if records.is_empty() {
        return Err(EmptyResultWarning::new("table"));
    }
    let layout = table.layout();
    let highlight_column = highlight.and_then(|m| table.column_of(m.field()));
    let max = highlight.map(|m| {
        records
            .iter()
            .map(|r| r.value(m))
            .fold(f64::NEG_INFINITY, f64::max)
    });
    let rows = records
        .iter()
        .map(|record| {
            let cells = layout
                .iter()
                .enumerate()
                .map(|(i, column)| {
                    let mut styled = format_cell(*column, cell(record, *column));
                    if Some(i) == highlight_column {
                        styled.highlight = highlight
                            .zip(max)
                            .is_some_and(|(m, max)| record.value(m) == max);
                    }
                    styled
                })
                .collect();
            StyledRow { label: None, cells }
        })
        .collect();
    Ok(StyledTable {
        index_header: None,
        headers: table.headers().to_vec(),
        rows,
    })
}

fn format_cell(column: SourceColumn, value: Cell<'_>) -> StyledCell {
    let currency = matches!(column, SourceColumn::Field(f) if f.is_currency());
    match value {
        Cell::Date(d) => StyledCell::text(d.format("%Y-%m-%d").to_string()),
        Cell::Text(t) => StyledCell::text(t),
        Cell::Number(v) if currency => StyledCell::number(format_currency(v)),
        Cell::Number(v) => StyledCell::number(format_decimal(v)),
        Cell::Integer(v) => StyledCell::number(v.to_string()),
        Cell::Empty => StyledCell::text("-"),
    }
}

/// Group summary with one column per requested cost statistic followed by
/// mean rating and mean CPT.
pub fn summary_table(
    rows: &[SummaryRow],
    dimension: Dimension,
    stats: &[Aggregate],
) -> Result<StyledTable, EmptyResultWarning> {
    if rows.is_empty() {
        return Err(EmptyResultWarning::new("summary"));
    }
    let mut headers: Vec<String> = stats
        .iter()
        .map(|a| match a {
            Aggregate::Mean => "Mean cost".to_string(),
            Aggregate::Median => "Median".to_string(),
            Aggregate::Min => "Min".to_string(),
            Aggregate::Max => "Max".to_string(),
            Aggregate::Sum => "Total cost".to_string(),
            Aggregate::Count => "Contracts".to_string(),
        })
        .collect();
    headers.push("Mean rating".to_string());
    headers.push("Mean CPT".to_string());
    let rows = rows
        .iter()
        .map(|row| {
            let mut cells: Vec<StyledCell> = stats
                .iter()
                .map(|a| match row.cost(*a) {
                    Some(v) if *a == Aggregate::Count => StyledCell::number(format!("{v:.0}")),
                    Some(v) => StyledCell::number(format_currency(v)),
                    None => StyledCell::text("-"),
                })
                .collect();
            cells.push(StyledCell::number(format_decimal(row.mean_rating)));
            cells.push(StyledCell::number(format_currency(row.mean_cpt)));
            StyledRow {
                label: Some(row.key.label()),
                cells,
            }
        })
        .collect();
    Ok(StyledTable {
        index_header: Some(dimension.title().to_string()),
        headers,
        rows,
    })
}

/// Pivot grid shaded on a single scale across all cells.
pub fn pivot_table(pivot: &PivotTable) -> Result<StyledTable, EmptyResultWarning> {
    if pivot.is_empty() {
        return Err(EmptyResultWarning::new("pivot table"));
    }
    let (lo, hi) = pivot.value_range().unwrap_or((0.0, 0.0));
    let span = hi - lo;
    let rows = pivot
        .rows
        .iter()
        .zip(&pivot.cells)
        .map(|(key, values)| StyledRow {
            label: Some(key.label()),
            cells: values
                .iter()
                .map(|v| {
                    let mut styled = StyledCell::number(format!("{v:.0}"));
                    styled.shade = Some(if span > 0.0 { (v - lo) / span } else { 0.0 });
                    styled
                })
                .collect(),
        })
        .collect();
    Ok(StyledTable {
        index_header: Some(format!(
            "{} / {}",
            pivot.row_dimension.title(),
            pivot.column_dimension.title()
        )),
        headers: pivot.columns.iter().map(|k| k.label()).collect(),
        rows,
    })
}

/// Whole units with comma thousands separators.
pub fn format_currency(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        grouped.insert(0, '-');
    }
    grouped
}

pub fn format_decimal(value: f64) -> String {
    format!("{value:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(0.0), "0");
        assert_eq!(format_currency(999.4), "999");
        assert_eq!(format_currency(1_000.0), "1,000");
        assert_eq!(format_currency(1_234_567.6), "1,234,568");
        assert_eq!(format_currency(-45_000.0), "-45,000");
    }

    #[test]
    fn decimals_use_two_places() {
        assert_eq!(format_decimal(3.14159), "3.14");
        assert_eq!(format_decimal(2.0), "2.00");
    }
}
