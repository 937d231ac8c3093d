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

use crate::dataset::{SourceColumn, Table};
use crate::error::{LoadError, LoadResult};
use crate::schema::{ColumnLabels, Field, Placement};
use calamine::{Data, Reader, Xlsx};
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use once_cell::sync::OnceCell;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d.%m.%Y", "%m/%d/%Y", "%Y%m%d"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%SZ"];

#[derive(Debug, Clone, PartialEq)]
enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}
impl RawCell {
    fn display(&self) -> String {
        match self {
            RawCell::Empty => String::new(),
            RawCell::Text(t) => t.clone(),
            RawCell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            RawCell::Number(n) => n.to_string(),
            RawCell::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}
static EMPTY_CELL: RawCell = RawCell::Empty;
struct RawSheet {
    headers: Vec<String>,
    rows: Vec<Vec<RawCell>>,
}

/// Reads `.xlsx`/`.xlsm` (first worksheet) or `.csv` into a [`Table`].
pub fn load<P: AsRef<Path>>(path: P, labels: &ColumnLabels) -> LoadResult<Table> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase();
    let sheet = match extension.as_str() {
        "xlsx" | "xlsm" => read_workbook(path)?,
        "csv" => read_csv(path)?,
        _ => return Err(LoadError::UnsupportedFormat { extension }),
    };
    let table = build_table(sheet, labels, path)?;
    info!(path = %path.display(), rows = table.len(), "dataset loaded");
    Ok(table)
}

fn read_workbook(path: &Path) -> LoadResult<RawSheet> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut workbook: Xlsx<BufReader<File>> =
        Xlsx::new(BufReader::new(file)).map_err(|e| LoadError::Workbook {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| LoadError::NoWorksheet {
            path: path.to_path_buf(),
        })?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| LoadError::Workbook {
            path: path.to_path_buf(),
            reason: format!("sheet '{sheet_name}': {e}"),
        })?;
    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|row| row.iter().map(|c| c.to_string().trim().to_string()).collect())
        .unwrap_or_default();
    let rows = rows
        .map(|row| row.iter().map(from_excel).collect::<Vec<_>>())
        .collect();
    Ok(RawSheet { headers, rows })
}

fn from_excel(cell: &Data) -> RawCell {
    match cell {
        Data::Empty => RawCell::Empty,
        Data::String(s) if s.trim().is_empty() => RawCell::Empty,
        Data::String(s) => RawCell::Text(s.trim().to_string()),
        Data::Float(f) => RawCell::Number(*f),
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            excel_serial_date(serial).map_or(RawCell::Number(serial), RawCell::Date)
        }
        other => RawCell::Text(other.to_string()),
    }
}

fn read_csv(path: &Path) -> LoadResult<RawSheet> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));
    let headers = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        rows.push(
            record
                .iter()
                .map(|v| {
                    if v.is_empty() {
                        RawCell::Empty
                    } else {
                        RawCell::Text(v.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(RawSheet { headers, rows })
}

fn build_table(sheet: RawSheet, labels: &ColumnLabels, path: &Path) -> LoadResult<Table> {
    let find = |field: Field| {
        let label = labels.label(field);
        sheet.headers.iter().position(|h| h == label)
    };
    let mut positions = Vec::with_capacity(Field::REQUIRED.len());
    for field in Field::REQUIRED {
        let index = find(field).ok_or_else(|| LoadError::MissingColumn {
            column: labels.label(field).to_string(),
        })?;
        positions.push((field, index));
    }
    let month_index = find(Field::Month);

    let mut headers = Vec::with_capacity(sheet.headers.len() + 1);
    let mut layout = Vec::with_capacity(sheet.headers.len() + 1);
    let mut extra_indices = Vec::new();
    for (i, header) in sheet.headers.iter().enumerate() {
        let field = positions
            .iter()
            .find(|(_, idx)| *idx == i)
            .map(|(f, _)| *f)
            .or_else(|| (month_index == Some(i)).then_some(Field::Month));
        match field {
            Some(f) => layout.push(SourceColumn::Field(f)),
            None => {
                layout.push(SourceColumn::Extra(extra_indices.len()));
                extra_indices.push(i);
            }
        }
        headers.push(header.clone());
    }
    if month_index.is_none() {
        debug!("month column absent, deriving from dates");
        headers.push(labels.month.clone());
        layout.push(SourceColumn::Field(Field::Month));
    }

    let column = |field: Field| {
        positions
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, i)| *i)
            .unwrap_or_default()
    };
    let mut records = Vec::with_capacity(sheet.rows.len());
    for (n, row) in sheet.rows.iter().enumerate() {
        if row.iter().all(|c| *c == RawCell::Empty) {
            continue;
        }
        // 1-based, counting the header line
        let row_number = n + 2;
        let get = |index: usize| row.get(index).unwrap_or(&EMPTY_CELL);
        let ctx = RowContext {
            row: row_number,
            labels,
        };
        let date = ctx.date(get(column(Field::Date)))?;
        let mut record = Placement::new(
            date,
            ctx.text(Field::Channel, get(column(Field::Channel)))?,
            ctx.text(Field::TimeSlot, get(column(Field::TimeSlot)))?,
            ctx.text(Field::ProgramType, get(column(Field::ProgramType)))?,
            ctx.text(Field::AdvertiserType, get(column(Field::AdvertiserType)))?,
            ctx.amount(Field::Cost, get(column(Field::Cost)))?,
            ctx.amount(Field::Rating, get(column(Field::Rating)))?,
            ctx.amount(Field::Cpt, get(column(Field::Cpt)))?,
            ctx.seconds(get(column(Field::Duration)))?,
        );
        if let Some(index) = month_index {
            let month = ctx.month(get(index))?;
            if month != date.month() {
                return Err(LoadError::MonthMismatch {
                    row: row_number,
                    month,
                    date,
                });
            }
        }
        record.extras = extra_indices.iter().map(|i| get(*i).display()).collect();
        records.push(record);
    }
    Ok(Table::from_source(records, headers, layout, path))
}

struct RowContext<'a> {
    row: usize,
    labels: &'a ColumnLabels,
}
impl RowContext<'_> {
    fn invalid(&self, field: Field, cell: &RawCell, reason: &str) -> LoadError {
        LoadError::InvalidCell {
            row: self.row,
            column: self.labels.label(field).to_string(),
            value: cell.display(),
            reason: reason.to_string(),
        }
    }
    fn date(&self, cell: &RawCell) -> LoadResult<NaiveDate> {
        let parsed = match cell {
            RawCell::Date(d) => Some(*d),
            RawCell::Number(n) => excel_serial_date(*n),
            RawCell::Text(t) => parse_date(t),
            RawCell::Empty => None,
        };
        parsed.ok_or_else(|| self.invalid(Field::Date, cell, "expected a calendar date"))
    }
    fn text(&self, field: Field, cell: &RawCell) -> LoadResult<String> {
        match cell {
            RawCell::Empty => Err(self.invalid(field, cell, "value is empty")),
            other => Ok(other.display()),
        }
    }
    fn number(&self, field: Field, cell: &RawCell) -> LoadResult<f64> {
        let value = match cell {
            RawCell::Number(n) => Some(*n),
            RawCell::Text(t) => parse_number(t),
            _ => None,
        };
        value
            .filter(|v| v.is_finite())
            .ok_or_else(|| self.invalid(field, cell, "expected a number"))
    }
    fn amount(&self, field: Field, cell: &RawCell) -> LoadResult<f64> {
        let value = self.number(field, cell)?;
        if value < 0.0 {
            return Err(self.invalid(field, cell, "must not be negative"));
        }
        Ok(value)
    }
    fn seconds(&self, cell: &RawCell) -> LoadResult<u32> {
        let value = self.number(Field::Duration, cell)?;
        if value.fract() != 0.0 || value <= 0.0 || value > f64::from(u32::MAX) {
            return Err(self.invalid(Field::Duration, cell, "expected a positive whole number"));
        }
        Ok(value as u32)
    }
    fn month(&self, cell: &RawCell) -> LoadResult<u32> {
        let value = self.number(Field::Month, cell)?;
        if value.fract() != 0.0 || !(1.0..=12.0).contains(&value) {
            return Err(self.invalid(Field::Month, cell, "expected a month number 1-12"));
        }
        Ok(value as u32)
    }
}

/// Excel stores dates as days since 1899-12-30; the time of day is dropped.
pub(crate) fn excel_serial_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial.trunc() as u64))
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(value, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
                .map(|dt| dt.date())
        })
}

fn parse_number(value: &str) -> Option<f64> {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .collect();
    compact
        .parse::<f64>()
        .ok()
        .or_else(|| compact.replace(',', ".").parse::<f64>().ok())
}

/// Loads the dataset on first access and hands out the same table afterwards.
/// A failed load is returned to the caller and retried on the next access.
#[derive(Debug)]
pub struct DatasetCache {
    path: PathBuf,
    labels: ColumnLabels,
    table: OnceCell<Arc<Table>>,
}
impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>, labels: ColumnLabels) -> Self {
        Self {
            path: path.into(),
            labels,
            table: OnceCell::new(),
        }
    }
    pub fn get(&self) -> LoadResult<Arc<Table>> {
        self.table
            .get_or_try_init(|| load(&self.path, &self.labels).map(Arc::new))
            .cloned()
    }
    pub fn is_loaded(&self) -> bool {
        self.table.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_dates_follow_the_1900_epoch() {
        assert_eq!(
            excel_serial_date(45292.0),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(
            excel_serial_date(45292.75),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(excel_serial_date(0.0), None);
    }

    #[test]
    fn text_dates_accept_common_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15);
        assert_eq!(parse_date("2024-03-15"), expected);
        assert_eq!(parse_date("15.03.2024"), expected);
        assert_eq!(parse_date("2024-03-15 00:00:00"), expected);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn numbers_tolerate_grouping_and_decimal_comma() {
        assert_eq!(parse_number("150 000"), Some(150_000.0));
        assert_eq!(parse_number("12,5"), Some(12.5));
        assert_eq!(parse_number("abc"), None);
    }
}
