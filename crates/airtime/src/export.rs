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

use crate::dataset::{cell, Cell, Table};
use crate::error::{ExportError, ExportResult};
use crate::filter::FilteredView;
use simple_excel_writer::{Row, Workbook};
use std::path::Path;
use tracing::info;

const SHEET_NAME: &str = "Sheet1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}
impl ExportFormat {
    pub fn from_path(path: &Path) -> ExportResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();
        match extension.as_str() {
            "xlsx" => Ok(ExportFormat::Xlsx),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(ExportError::UnsupportedFormat { extension }),
        }
    }
}

/// Writes the rows of `view` with the source table's header and column
/// order. Returns the number of data rows written.
pub fn export_view<P: AsRef<Path>>(
    table: &Table,
    view: &FilteredView<'_>,
    path: P,
) -> ExportResult<usize> {
    let path = path.as_ref();
    match ExportFormat::from_path(path)? {
        ExportFormat::Xlsx => write_xlsx(table, view, path)?,
        ExportFormat::Csv => write_csv(table, view, path)?,
    }
    info!(path = %path.display(), rows = view.len(), "filtered view exported");
    Ok(view.len())
}

fn write_xlsx(table: &Table, view: &FilteredView<'_>, path: &Path) -> ExportResult<()> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    // An in-memory workbook never writes from Drop, so a failed save stays an Err.
    let mut workbook = Workbook::create_in_memory();
    let mut sheet = workbook.create_sheet(SHEET_NAME);
    workbook
        .write_sheet(&mut sheet, |writer| {
            let mut header = Row::new();
            for label in table.headers() {
                header.add_cell(label.clone());
            }
            writer.append_row(header)?;
            for record in view.iter() {
                let mut row = Row::new();
                for column in table.layout() {
                    match cell(record, *column) {
                        Cell::Date(d) => row.add_cell(d.format("%Y-%m-%d").to_string()),
                        Cell::Text(t) => row.add_cell(t.to_string()),
                        Cell::Number(v) => row.add_cell(v),
                        Cell::Integer(v) => row.add_cell(f64::from(v)),
                        Cell::Empty => row.add_cell(String::new()),
                    }
                }
                writer.append_row(row)?;
            }
            Ok(())
        })
        .map_err(io_err)?;
    let bytes = workbook.close().map_err(io_err)?.unwrap_or_default();
    std::fs::write(path, bytes).map_err(io_err)?;
    Ok(())
}

fn write_csv(table: &Table, view: &FilteredView<'_>, path: &Path) -> ExportResult<()> {
    let csv_err = |source| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer.write_record(table.headers()).map_err(csv_err)?;
    for record in view.iter() {
        let fields: Vec<String> = table
            .layout()
            .iter()
            .map(|column| match cell(record, *column) {
                Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
                Cell::Text(t) => t.to_string(),
                Cell::Number(v) => v.to_string(),
                Cell::Integer(v) => v.to_string(),
                Cell::Empty => String::new(),
            })
            .collect();
        writer.write_record(&fields).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
