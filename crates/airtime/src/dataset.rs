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

use crate::schema::{ColumnLabels, Field, Placement};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceColumn {
    Field(Field),
    /// Index into [`Placement::extras`].
    Extra(usize),
}
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Date(NaiveDate),
    Text(&'a str),
    Number(f64),
    Integer(u32),
    Empty,
}
/// The loaded dataset. Immutable once built; shared behind `Arc`.
#[derive(Debug, Clone)]
pub struct Table {
    records: Vec<Placement>,
    headers: Vec<String>,
    layout: Vec<SourceColumn>,
    source_path: Option<PathBuf>,
}
impl Table {
    /// Builds a table with the canonical column layout.
    pub fn new(records: Vec<Placement>, labels: &ColumnLabels) -> Self {
        let layout: Vec<SourceColumn> = Field::REQUIRED
            .iter()
            .chain(std::iter::once(&Field::Month))
            .map(|f| SourceColumn::Field(*f))
            .collect();
        let headers = layout
            .iter()
            .map(|c| match c {
                SourceColumn::Field(f) => labels.label(*f).to_string(),
                SourceColumn::Extra(i) => format!("extra_{i}"),
            })
            .collect();
        Self {
            records,
            headers,
            layout,
            source_path: None,
        }
    }
    pub(crate) fn from_source(
        records: Vec<Placement>,
        headers: Vec<String>,
        layout: Vec<SourceColumn>,
        source_path: &Path,
    ) -> Self {
        debug_assert_eq!(headers.len(), layout.len());
        Self {
            records,
            headers,
            layout,
            source_path: Some(source_path.to_path_buf()),
        }
    }
    pub fn records(&self) -> &[Placement] {
        &self.records
    }
    pub fn len(&self) -> usize {
        self.records.len()
    }
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
    pub fn headers(&self) -> &[String] {
        &self.headers
    }
    pub fn layout(&self) -> &[SourceColumn] {
        &self.layout
    }
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }
    pub fn column_of(&self, field: Field) -> Option<usize> {
        self.layout
            .iter()
            .position(|c| *c == SourceColumn::Field(field))
    }
    pub fn head(&self, limit: usize) -> Vec<&Placement> {
        self.records.iter().take(limit).collect()
    }
}
pub fn cell(record: &Placement, column: SourceColumn) -> Cell<'_> {
    match column {
        SourceColumn::Field(field) => match field {
            Field::Date => Cell::Date(record.date),
            Field::Channel => Cell::Text(&record.channel),
            Field::TimeSlot => Cell::Text(&record.time_slot),
            Field::ProgramType => Cell::Text(&record.program_type),
            Field::AdvertiserType => Cell::Text(&record.advertiser_type),
            Field::Cost => Cell::Number(record.cost),
            Field::Rating => Cell::Number(record.rating),
            Field::Cpt => Cell::Number(record.cpt),
            Field::Duration => Cell::Integer(record.duration_secs),
            Field::Month => Cell::Integer(record.month),
        },
        SourceColumn::Extra(i) => record
            .extras
            .get(i)
            .map_or(Cell::Empty, |v| Cell::Text(v.as_str())),
    }
}
