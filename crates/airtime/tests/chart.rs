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

use airtime::chart::{build, build_all, sample};
use airtime::{ChartData, ChartKind, ChartOptions, ColumnLabels, FilteredView, Table};
use common::{placement, sample_table};
use std::collections::HashSet;

fn large_table(rows: usize) -> Table {
    let slots = ["Morning", "Day", "Prime", "Night"];
    let records = (0..rows)
        .map(|i| {
            placement(
                "2024-04-01",
                "Channel One",
                slots[i % slots.len()],
                "News",
                "Retail",
                (i * 10) as f64,
                (i % 7) as f64,
                5.0,
                (i % 4 + 1) as u32 * 15,
            )
        })
        .collect();
    Table::new(records, &ColumnLabels::default())
}

#[test]
fn empty_view_yields_warnings_for_every_chart() {
    let view = FilteredView::from_records(Vec::new());
    let charts = build_all(&view, &ChartOptions::default());
    assert_eq!(charts.len(), 7);
    for (kind, chart) in charts {
        let warning = chart.unwrap_err();
        assert_eq!(warning.context, kind.heading());
    }
}

#[test]
fn charts_follow_dashboard_order() {
    let table = sample_table();
    let view = FilteredView::of(&table);
    let kinds: Vec<ChartKind> = build_all(&view, &ChartOptions::default())
        .into_iter()
        .map(|(kind, chart)| {
            assert!(chart.is_ok());
            kind
        })
        .collect();
    assert_eq!(kinds, ChartKind::ALL.to_vec());
}

#[test]
fn cost_by_channel_is_sorted_descending() {
    let table = sample_table();
    let view = FilteredView::of(&table);
    let chart = build(ChartKind::CostByChannel, &view, &ChartOptions::default()).unwrap();
    match chart.data {
        ChartData::Bar {
            categories,
            values,
            horizontal,
        } => {
            assert_eq!(categories, vec!["Channel One", "Russia 1", "NTV"]);
            assert_eq!(values, vec![200.0, 175.0, 50.0]);
            assert!(!horizontal);
        }
        other => panic!("expected bar chart, got {other:?}"),
    }
}

#[test]
fn cpt_by_advertiser_is_horizontal_and_ascending() {
    let table = sample_table();
    let view = FilteredView::of(&table);
    let chart = build(ChartKind::CptByAdvertiser, &view, &ChartOptions::default()).unwrap();
    match chart.data {
        ChartData::Bar {
            categories,
            values,
            horizontal,
        } => {
            assert_eq!(categories, vec!["Auto", "Retail", "Pharma"]);
            assert_eq!(values, vec![40.0, 40.0, 50.0]);
            assert!(horizontal);
        }
        other => panic!("expected bar chart, got {other:?}"),
    }
}

#[test]
fn seasonality_line_uses_month_labels() {
    let table = sample_table();
    let view = FilteredView::of(&table);
    let chart = build(ChartKind::CostByMonth, &view, &ChartOptions::default()).unwrap();
    match chart.data {
        ChartData::Line { labels, values } => {
            assert_eq!(labels, vec!["Янв", "Фев", "Мар"]);
            assert_eq!(values, vec![150.0, 300.0, 100.0]);
        }
        other => panic!("expected line chart, got {other:?}"),
    }
}

#[test]
fn heatmap_rows_are_channels() {
    let table = sample_table();
    let view = FilteredView::of(&table);
    let chart = build(ChartKind::ChannelSlotHeatmap, &view, &ChartOptions::default()).unwrap();
    match chart.data {
        ChartData::Heatmap { x, y, z } => {
            assert_eq!(x, vec!["Day", "Night", "Prime"]);
            assert_eq!(y, vec!["Channel One", "NTV", "Russia 1"]);
            assert_eq!(z[0], vec![300.0, 0.0, 100.0]);
        }
        other => panic!("expected heatmap, got {other:?}"),
    }
}

#[test]
fn scatter_is_capped_at_the_sample_limit() {
    let table = large_table(2500);
    let view = FilteredView::of(&table);
    let options = ChartOptions {
        scatter_sample_limit: 1000,
        scatter_seed: Some(7),
    };
    let chart = build(ChartKind::RatingVsCost, &view, &options).unwrap();
    match chart.data {
        ChartData::Scatter { points } => {
            assert_eq!(points.len(), 1000);
            let distinct: HashSet<u64> = points.iter().map(|p| p.cost.to_bits()).collect();
            assert_eq!(distinct.len(), 1000);
        }
        other => panic!("expected scatter, got {other:?}"),
    }
}

#[test]
fn seeded_sampling_is_repeatable() {
    let table = large_table(1500);
    let view = FilteredView::of(&table);
    let first = sample(view.records(), 100, Some(42));
    let second = sample(view.records(), 100, Some(42));
    assert_eq!(first.len(), 100);
    assert_eq!(first, second);
}

#[test]
fn small_views_are_not_sampled() {
    let table = sample_table();
    let view = FilteredView::of(&table);
    let kept = sample(view.records(), 1000, None);
    assert_eq!(kept, view.records().to_vec());
}

#[test]
fn plotly_figure_has_one_scatter_trace_per_slot() {
    let table = large_table(40);
    let view = FilteredView::of(&table);
    let chart = build(ChartKind::RatingVsCost, &view, &ChartOptions::default()).unwrap();
    let figure = chart.to_plotly();
    let traces = figure["data"].as_array().unwrap();
    assert_eq!(traces.len(), 4);
    assert_eq!(traces[0]["name"], "Morning");
    assert_eq!(traces[0]["marker"]["sizemode"], "area");
    assert_eq!(figure["layout"]["title"]["text"], chart.title.as_str());
}

#[test]
fn plotly_bar_orientation_follows_chart() {
    let table = sample_table();
    let view = FilteredView::of(&table);
    let chart = build(ChartKind::CptByAdvertiser, &view, &ChartOptions::default()).unwrap();
    let figure = chart.to_plotly();
    assert_eq!(figure["data"][0]["orientation"], "h");
    assert_eq!(figure["data"][0]["y"][0], "Auto");
}
