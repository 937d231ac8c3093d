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

mod common;

use airtime::{
    group_mean, group_summary, headline, monthly_series, pivot, Aggregate, ColumnLabels,
    Dimension, FilteredView, GroupKey, Measure, Table,
};
use common::{placement, sample_table};

fn worked_example() -> Table {
    Table::new(
        vec![
            placement("2024-01-05", "A", "Prime", "News", "Retail", 100.0, 2.0, 10.0, 30),
            placement("2024-01-18", "B", "Prime", "News", "Retail", 200.0, 4.0, 20.0, 30),
            placement("2024-02-02", "A", "Day", "News", "Retail", 300.0, 6.0, 30.0, 15),
        ],
        &ColumnLabels::default(),
    )
}

fn text(value: &str) -> GroupKey {
    GroupKey::Text(value.to_string())
}

#[test]
fn monthly_summary_matches_worked_example() {
    let table = worked_example();
    let view = FilteredView::of(&table);
    let rows = group_summary(&view, Dimension::Month, &[Aggregate::Mean]);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].key, GroupKey::Month(1));
    assert_eq!(rows[0].cost(Aggregate::Mean), Some(150.0));
    assert_eq!(rows[0].count, 2);
    assert_eq!(rows[1].key, GroupKey::Month(2));
    assert_eq!(rows[1].cost(Aggregate::Mean), Some(300.0));
    assert_eq!(rows[1].mean_rating, 6.0);
}

#[test]
fn pivot_fills_missing_combinations_with_zero() {
    let table = worked_example();
    let view = FilteredView::of(&table);
    let grid = pivot(&view, Dimension::Month, Dimension::Channel, Measure::Cost, Aggregate::Mean);
    assert_eq!(grid.rows, vec![GroupKey::Month(1), GroupKey::Month(2)]);
    assert_eq!(grid.columns, vec![text("A"), text("B")]);
    assert_eq!(grid.get(&GroupKey::Month(1), &text("A")), Some(100.0));
    assert_eq!(grid.get(&GroupKey::Month(1), &text("B")), Some(200.0));
    assert_eq!(grid.get(&GroupKey::Month(2), &text("A")), Some(300.0));
    assert_eq!(grid.get(&GroupKey::Month(2), &text("B")), Some(0.0));
    assert_eq!(grid.get(&GroupKey::Month(3), &text("A")), None);
    assert_eq!(grid.value_range(), Some((0.0, 300.0)));
}

#[test]
fn pivot_cells_are_the_mean_of_matching_rows() {
    let table = sample_table();
    let view = FilteredView::of(&table);
    let grid = pivot(&view, Dimension::TimeSlot, Dimension::ProgramType, Measure::Cost, Aggregate::Mean);
    let prime_news = grid.get(&text("Prime"), &text("News"));
    assert_eq!(prime_news, Some(200.0));
    let day_series = grid.get(&text("Day"), &text("Series"));
    assert_eq!(day_series, Some(300.0));
    assert_eq!(grid.get(&text("Night"), &text("Series")), Some(0.0));
}

#[test]
fn pivot_supports_other_aggregates() {
    let table = worked_example();
    let view = FilteredView::of(&table);
    let counts = pivot(&view, Dimension::Channel, Dimension::TimeSlot, Measure::Cost, Aggregate::Count);
    assert_eq!(counts.get(&text("A"), &text("Prime")), Some(1.0));
    assert_eq!(counts.get(&text("B"), &text("Day")), Some(0.0));
    let totals = pivot(&view, Dimension::Channel, Dimension::Month, Measure::Cost, Aggregate::Sum);
    assert_eq!(totals.get(&text("A"), &GroupKey::Month(1)), Some(100.0));
}

#[test]
fn summary_never_emits_phantom_groups() {
    let table = sample_table();
    let view = FilteredView::of(&table);
    for dimension in Dimension::CATEGORICAL {
        let rows = group_summary(&view, dimension, &Aggregate::COST_SUMMARY);
        assert!(rows.iter().all(|row| row.count > 0));
        let total: usize = rows.iter().map(|row| row.count).sum();
        assert_eq!(total, view.len());
    }
}

#[test]
fn channel_summary_reports_cost_statistics() {
    let table = sample_table();
    let view = FilteredView::of(&table);
    let rows = group_summary(&view, Dimension::Channel, &Aggregate::COST_SUMMARY);
    let keys: Vec<String> = rows.iter().map(|row| row.key.label()).collect();
    assert_eq!(keys, vec!["Channel One", "NTV", "Russia 1"]);
    let russia = &rows[2];
    assert_eq!(russia.cost(Aggregate::Mean), Some(175.0));
    assert_eq!(russia.cost(Aggregate::Median), Some(175.0));
    assert_eq!(russia.cost(Aggregate::Min), Some(150.0));
    assert_eq!(russia.cost(Aggregate::Max), Some(200.0));
    assert_eq!(russia.mean_cpt, 50.0);
    assert_eq!(russia.cost(Aggregate::Sum), None);
}

#[test]
fn empty_view_produces_empty_aggregates() {
    let view = FilteredView::from_records(Vec::new());
    assert!(group_summary(&view, Dimension::Channel, &Aggregate::COST_SUMMARY).is_empty());
    assert!(group_mean(&view, Dimension::TimeSlot, Measure::Cost).is_empty());
    assert!(pivot(&view, Dimension::Channel, Dimension::TimeSlot, Measure::Cost, Aggregate::Mean).is_empty());
    assert!(monthly_series(&view, Measure::Cost).is_empty());
    let kpis = headline(&view);
    assert_eq!(kpis.mean_cost, None);
    assert_eq!(kpis.contracts, 0);
}

#[test]
fn monthly_series_is_chronological_regardless_of_input_order() {
    let table = Table::new(
        vec![
            placement("2024-11-02", "A", "Prime", "News", "Retail", 500.0, 1.0, 1.0, 10),
            placement("2024-02-14", "A", "Prime", "News", "Retail", 100.0, 1.0, 1.0, 10),
            placement("2024-07-01", "B", "Day", "News", "Retail", 300.0, 1.0, 1.0, 10),
            placement("2024-02-20", "B", "Day", "News", "Retail", 200.0, 1.0, 1.0, 10),
        ],
        &ColumnLabels::default(),
    );
    let view = FilteredView::of(&table);
    let series = monthly_series(&view, Measure::Cost);
    let months: Vec<u32> = series.iter().map(|p| p.month).collect();
    assert_eq!(months, vec![2, 7, 11]);
    let labels: Vec<&str> = series.iter().map(|p| p.label).collect();
    assert_eq!(labels, vec!["Фев", "Июл", "Ноя"]);
    assert_eq!(series[0].value, 150.0);
}

#[test]
fn duration_groups_sort_numerically() {
    let table = Table::new(
        vec![
            placement("2024-01-01", "A", "Prime", "News", "Retail", 90.0, 1.0, 1.0, 120),
            placement("2024-01-01", "A", "Prime", "News", "Retail", 30.0, 1.0, 1.0, 15),
            placement("2024-01-01", "A", "Prime", "News", "Retail", 60.0, 1.0, 1.0, 45),
        ],
        &ColumnLabels::default(),
    );
    let view = FilteredView::of(&table);
    let labels: Vec<String> = group_mean(&view, Dimension::Duration, Measure::Cost)
        .iter()
        .map(|m| m.key.label())
        .collect();
    assert_eq!(labels, vec!["15", "45", "120"]);
}

#[test]
fn headline_averages_the_view() {
    let table = worked_example();
    let view = FilteredView::of(&table);
    let kpis = headline(&view);
    assert_eq!(kpis.mean_cost, Some(200.0));
    assert_eq!(kpis.mean_rating, Some(4.0));
    assert_eq!(kpis.mean_cpt, Some(20.0));
    assert_eq!(kpis.contracts, 3);
}
