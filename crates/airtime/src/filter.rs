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

use crate::dataset::Table;
use crate::schema::{Dimension, Placement};
use chrono::NaiveDate;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Inclusive date interval. A range whose start lies after its end matches
/// nothing; bounds are never swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}
impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }
    pub fn unbounded() -> Self {
        Self {
            start: NaiveDate::MIN,
            end: NaiveDate::MAX,
        }
    }
    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Conjunction of the dashboard's filter predicates. An empty category set
/// selects nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub dates: DateRange,
    pub channels: BTreeSet<String>,
    pub time_slots: BTreeSet<String>,
    pub program_types: BTreeSet<String>,
    pub advertiser_types: BTreeSet<String>,
}
impl FilterCriteria {
    pub fn new(dates: DateRange) -> Self {
        Self {
            dates,
            channels: BTreeSet::new(),
            time_slots: BTreeSet::new(),
            program_types: BTreeSet::new(),
            advertiser_types: BTreeSet::new(),
        }
    }
    /// Every observed value selected and the full observed date span.
    pub fn all(options: &FilterOptions) -> Self {
        let mut criteria = Self::new(options.dates.unwrap_or_else(DateRange::unbounded));
        for dimension in Dimension::CATEGORICAL {
            criteria.select(dimension, options.values(dimension).iter().cloned());
        }
        criteria
    }
    pub fn with<I, S>(mut self, dimension: Dimension, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select(dimension, values);
        self
    }
    /// Replaces the selection of a categorical dimension. Month and duration
    /// carry no selection and are ignored.
    pub fn select<I, S>(&mut self, dimension: Dimension, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(set) = self.selection_mut(dimension) {
            *set = values.into_iter().map(Into::into).collect();
        }
    }
    pub fn selection(&self, dimension: Dimension) -> Option<&BTreeSet<String>> {
        match dimension {
            Dimension::Channel => Some(&self.channels),
            Dimension::TimeSlot => Some(&self.time_slots),
            Dimension::ProgramType => Some(&self.program_types),
            Dimension::AdvertiserType => Some(&self.advertiser_types),
            Dimension::Month | Dimension::Duration => None,
        }
    }
    fn selection_mut(&mut self, dimension: Dimension) -> Option<&mut BTreeSet<String>> {
        match dimension {
            Dimension::Channel => Some(&mut self.channels),
            Dimension::TimeSlot => Some(&mut self.time_slots),
            Dimension::ProgramType => Some(&mut self.program_types),
            Dimension::AdvertiserType => Some(&mut self.advertiser_types),
            Dimension::Month | Dimension::Duration => None,
        }
    }
    pub fn matches(&self, record: &Placement) -> bool {
        self.dates.contains(record.date)
            && self.channels.contains(&record.channel)
            && self.time_slots.contains(&record.time_slot)
            && self.program_types.contains(&record.program_type)
            && self.advertiser_types.contains(&record.advertiser_type)
    }
    pub fn apply<'a>(&self, table: &'a Table) -> FilteredView<'a> {
        FilteredView::of(table).refine(self)
    }
}

/// Borrowed subset of a [`Table`], in table order.
#[derive(Debug, Clone, Default)]
pub struct FilteredView<'a> {
    records: Vec<&'a Placement>,
}
impl<'a> FilteredView<'a> {
    pub fn of(table: &'a Table) -> Self {
        Self {
            records: table.records().iter().collect(),
        }
    }
    pub fn from_records(records: Vec<&'a Placement>) -> Self {
        Self { records }
    }
    pub fn refine(&self, criteria: &FilterCriteria) -> FilteredView<'a> {
        if criteria.dates.is_inverted() {
            debug!(
                start = %criteria.dates.start,
                end = %criteria.dates.end,
                "inverted date range selects no rows"
            );
        }
        let records: Vec<&'a Placement> = self
            .records
            .iter()
            .copied()
            .filter(|r| criteria.matches(r))
            .collect();
        debug!(input = self.records.len(), kept = records.len(), "filter applied");
        FilteredView { records }
    }
    pub fn records(&self) -> &[&'a Placement] {
        &self.records
    }
    pub fn iter(&self) -> impl Iterator<Item = &'a Placement> + '_ {
        self.records.iter().copied()
    }
    pub fn len(&self) -> usize {
        self.records.len()
    }
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
    pub fn head(&self, limit: usize) -> &[&'a Placement] {
        &self.records[..limit.min(self.records.len())]
    }
}

/// Values a filter control can offer: categories in order of first
/// appearance and the observed date span.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub dates: Option<DateRange>,
    pub channels: Vec<String>,
    pub time_slots: Vec<String>,
    pub program_types: Vec<String>,
    pub advertiser_types: Vec<String>,
}
impl FilterOptions {
    pub fn observed(table: &Table) -> Self {
        let mut channels = IndexSet::new();
        let mut time_slots = IndexSet::new();
        let mut program_types = IndexSet::new();
        let mut advertiser_types = IndexSet::new();
        let mut dates: Option<DateRange> = None;
        for record in table.records() {
            channels.insert(record.channel.as_str());
            time_slots.insert(record.time_slot.as_str());
            program_types.insert(record.program_type.as_str());
            advertiser_types.insert(record.advertiser_type.as_str());
            dates = Some(match dates {
                None => DateRange::new(record.date, record.date),
                Some(r) => DateRange::new(r.start.min(record.date), r.end.max(record.date)),
            });
        }
        let owned = |set: IndexSet<&str>| -> Vec<String> {
            set.into_iter().map(str::to_string).collect()
        };
        Self {
            dates,
            channels: owned(channels),
            time_slots: owned(time_slots),
            program_types: owned(program_types),
            advertiser_types: owned(advertiser_types),
        }
    }
    pub fn values(&self, dimension: Dimension) -> &[String] {
        match dimension {
            Dimension::Channel => &self.channels,
            Dimension::TimeSlot => &self.time_slots,
            Dimension::ProgramType => &self.program_types,
            Dimension::AdvertiserType => &self.advertiser_types,
            Dimension::Month | Dimension::Duration => &[],
        }
    }
}
