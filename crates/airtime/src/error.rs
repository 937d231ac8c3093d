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

use std::path::PathBuf;
use thiserror::Error;
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read data file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to open workbook '{path}': {reason}")]
    Workbook { path: PathBuf, reason: String },
    #[error("Workbook '{path}' contains no worksheets")]
    NoWorksheet { path: PathBuf },
    #[error("Failed to parse CSV file '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("Unsupported data format: '{extension}'")]
    UnsupportedFormat { extension: String },
    #[error("Required column '{column}' not found in dataset")]
    MissingColumn { column: String },
    #[error("Invalid value '{value}' in column '{column}' at row {row}: {reason}")]
    InvalidCell {
        row: usize,
        column: String,
        value: String,
        reason: String,
    },
    #[error("Month {month} at row {row} does not match date {date}")]
    MonthMismatch {
        row: usize,
        month: u32,
        date: chrono::NaiveDate,
    },
}
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write export file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write CSV export '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("Unsupported export format: '{extension}'")]
    UnsupportedFormat { extension: String },
}
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },
    #[error("Unknown dimension '{name}'")]
    UnknownDimension { name: String },
    #[error("Unknown measure '{name}'")]
    UnknownMeasure { name: String },
}
/// Returned in place of a table or chart when the filtered view has no rows.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No data to display for {context}")]
pub struct EmptyResultWarning {
    pub context: String,
}
impl EmptyResultWarning {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
        }
    }
}
pub type LoadResult<T> = std::result::Result<T, LoadError>;
pub type ExportResult<T> = std::result::Result<T, ExportError>;
