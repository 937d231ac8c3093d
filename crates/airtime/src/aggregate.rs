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

//! Grouped summaries, pivot tables and the monthly series over a
//! [`FilteredView`]. Everything here is a single pass over the view's rows.

use crate::filter::FilteredView;
use crate::schema::{month_label, Dimension, GroupKey, Measure, Placement};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregate {
    Mean,
    Median,
    Sum,
    Min,
    Max,
    Count,
}
impl Aggregate {
    /// Statistics reported for cost in the per-group summary table.
    pub const COST_SUMMARY: [Aggregate; 4] = [
        Aggregate::Mean,
        Aggregate::Median,
        Aggregate::Min,
        Aggregate::Max,
    ];
    pub fn name(self) -> &'static str {
        match self {
            Aggregate::Mean => "mean",
            Aggregate::Median => "median",
            Aggregate::Sum => "sum",
            Aggregate::Min => "min",
            Aggregate::Max => "max",
            Aggregate::Count => "count",
        }
    }
    /// `None` when `values` is empty, except for `Count` which is zero.
    pub fn apply(self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return (self == Aggregate::Count).then_some(0.0);
        }
        let value = match self {
            Aggregate::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Aggregate::Median => median(values),
            Aggregate::Sum => values.iter().sum(),
            Aggregate::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Aggregate::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Aggregate::Count => values.len() as f64,
        };
        Some(value)
    }
}
impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn mean_of<'a>(records: impl IntoIterator<Item = &'a Placement>, measure: Measure) -> Option<f64> {
    let (sum, count) = records
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), r| (sum + r.value(measure), n + 1));
    (count > 0).then(|| sum / count as f64)
}

fn groups<'a>(view: &FilteredView<'a>, dimension: Dimension) -> BTreeMap<GroupKey, Vec<&'a Placement>> {
    let mut groups: BTreeMap<GroupKey, Vec<&'a Placement>> = BTreeMap::new();
    for record in view.iter() {
        groups.entry(record.key(dimension)).or_default().push(record);
    }
    groups
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub key: GroupKey,
    pub count: usize,
    pub cost: Vec<(Aggregate, f64)>,
    pub mean_rating: f64,
    pub mean_cpt: f64,
}
impl SummaryRow {
    pub fn cost(&self, aggregate: Aggregate) -> Option<f64> {
        self.cost
            .iter()
            .find(|(a, _)| *a == aggregate)
            .map(|(_, v)| *v)
    }
}

/// Per-group statistics of cost plus mean rating and mean CPT, one row per
/// key present in the view, sorted by key.
pub fn group_summary(
    view: &FilteredView<'_>,
    dimension: Dimension,
    stats: &[Aggregate],
) -> Vec<SummaryRow> {
    let rows: Vec<SummaryRow> = groups(view, dimension)
        .into_iter()
        .map(|(key, records)| {
            let costs: Vec<f64> = records.iter().map(|r| r.cost).collect();
            let cost = stats
                .iter()
                .filter_map(|a| a.apply(&costs).map(|v| (*a, v)))
                .collect();
            SummaryRow {
                key,
                count: records.len(),
                cost,
                mean_rating: mean_of(records.iter().copied(), Measure::Rating).unwrap_or_default(),
                mean_cpt: mean_of(records.iter().copied(), Measure::Cpt).unwrap_or_default(),
            }
        })
        .collect();
    debug!(%dimension, groups = rows.len(), "group summary computed");
    rows
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub key: GroupKey,
    pub value: f64,
}

pub fn group_mean(view: &FilteredView<'_>, dimension: Dimension, measure: Measure) -> Vec<GroupMean> {
    groups(view, dimension)
        .into_iter()
        .filter_map(|(key, records)| {
            mean_of(records, measure).map(|value| GroupMean { key, value })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotTable {
    pub row_dimension: Dimension,
    pub column_dimension: Dimension,
    pub measure: Measure,
    pub aggregate: Aggregate,
    pub rows: Vec<GroupKey>,
    pub columns: Vec<GroupKey>,
    /// `cells[row][column]`; combinations without rows hold 0.
    pub cells: Vec<Vec<f64>>,
}
impl PivotTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }
    pub fn get(&self, row: &GroupKey, column: &GroupKey) -> Option<f64> {
        let r = self.rows.iter().position(|k| k == row)?;
        let c = self.columns.iter().position(|k| k == column)?;
        Some(self.cells[r][c])
    }
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.cells.iter().flatten().fold(None, |acc, v| match acc {
            None => Some((*v, *v)),
            Some((lo, hi)) => Some((lo.min(*v), hi.max(*v))),
        })
    }
}

/// Cross-tabulates `measure` by two dimensions. Row and column keys are the
/// values present in the view, not the full table.
pub fn pivot(
    view: &FilteredView<'_>,
    row_dimension: Dimension,
    column_dimension: Dimension,
    measure: Measure,
    aggregate: Aggregate,
) -> PivotTable {
    let mut row_keys = BTreeSet::new();
    let mut column_keys = BTreeSet::new();
    let mut buckets: BTreeMap<(GroupKey, GroupKey), Vec<f64>> = BTreeMap::new();
    for record in view.iter() {
        let row = record.key(row_dimension);
        let column = record.key(column_dimension);
        row_keys.insert(row.clone());
        column_keys.insert(column.clone());
        buckets
            .entry((row, column))
            .or_default()
            .push(record.value(measure));
    }
    let rows: Vec<GroupKey> = row_keys.into_iter().collect();
    let columns: Vec<GroupKey> = column_keys.into_iter().collect();
    let cells = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| {
                    buckets
                        .get(&(row.clone(), column.clone()))
                        .and_then(|values| aggregate.apply(values))
                        .unwrap_or(0.0)
                })
                .collect()
        })
        .collect();
    debug!(
        rows = rows.len(),
        columns = columns.len(),
        %aggregate,
        "pivot computed"
    );
    PivotTable {
        row_dimension,
        column_dimension,
        measure,
        aggregate,
        rows,
        columns,
        cells,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimePoint {
    pub month: u32,
    pub label: &'static str,
    pub value: f64,
}

/// Mean of `measure` per calendar month, January first. Months without rows
/// are left out.
pub fn monthly_series(view: &FilteredView<'_>, measure: Measure) -> Vec<TimePoint> {
    let mut buckets: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
    for record in view.iter() {
        let entry = buckets.entry(record.month).or_insert((0.0, 0));
        entry.0 += record.value(measure);
        entry.1 += 1;
    }
    buckets
        .into_iter()
        .map(|(month, (sum, count))| TimePoint {
            month,
            label: month_label(month),
            value: sum / count as f64,
        })
        .collect()
}

/// Figures shown in the dashboard's KPI tiles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Headline {
    pub mean_cost: Option<f64>,
    pub mean_rating: Option<f64>,
    pub mean_cpt: Option<f64>,
    pub contracts: usize,
}

pub fn headline(view: &FilteredView<'_>) -> Headline {
    Headline {
        mean_cost: mean_of(view.iter(), Measure::Cost),
        mean_rating: mean_of(view.iter(), Measure::Rating),
        mean_cpt: mean_of(view.iter(), Measure::Cpt),
        contracts: view.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_handles_even_and_odd_lengths() {
        assert_eq!(Aggregate::Median.apply(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(Aggregate::Median.apply(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn empty_input_has_no_statistic_but_a_zero_count() {
        assert_eq!(Aggregate::Mean.apply(&[]), None);
        assert_eq!(Aggregate::Max.apply(&[]), None);
        assert_eq!(Aggregate::Count.apply(&[]), Some(0.0));
    }
}
