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

use airtime::{ColumnLabels, Dimension, Measure, Placement, Table};
use airtime::{FilterError, FilterOptions};
use airtime_dashboard::cli::{Cli, Command, ExportArgs};
use airtime_dashboard::query::DashboardQuery;
use airtime_dashboard::DashboardConfig;
use chrono::NaiveDate;
use clap::Parser;

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

fn table() -> Table {
    let record = |day: &str, channel: &str, slot: &str| {
        Placement::new(date(day), channel, slot, "News", "Retail", 100.0, 2.0, 10.0, 30)
    };
    Table::new(
        vec![
            record("2024-01-10", "Channel One", "Prime"),
            record("2024-02-14", "NTV", "Day"),
            record("2024-03-01", "Russia 1", "Prime"),
        ],
        &ColumnLabels::default(),
    )
}

#[test]
fn missing_marker_selects_everything_observed() {
    let options = FilterOptions::observed(&table());
    let criteria = DashboardQuery::parse(None).criteria(&options).unwrap();
    assert_eq!(criteria.channels.len(), 3);
    assert_eq!(criteria.dates.start, date("2024-01-10"));
    assert_eq!(criteria.dates.end, date("2024-03-01"));
}

#[test]
fn applied_form_without_a_category_selects_nothing() {
    let options = FilterOptions::observed(&table());
    let query = DashboardQuery::parse(Some("applied=1&channel=NTV&time_slot=Day"));
    let criteria = query.criteria(&options).unwrap();
    assert_eq!(criteria.channels.len(), 1);
    assert!(criteria.channels.contains("NTV"));
    assert!(criteria.program_types.is_empty());
    assert!(criteria.advertiser_types.is_empty());
}

#[test]
fn repeated_keys_and_encoded_values_are_collected() {
    let options = FilterOptions::observed(&table());
    let query = DashboardQuery::parse(Some("channel=Channel+One&channel=Russia%201&start=2024-02-01"));
    let criteria = query.criteria(&options).unwrap();
    let channels: Vec<&str> = criteria.channels.iter().map(String::as_str).collect();
    assert_eq!(channels, vec!["Channel One", "Russia 1"]);
    assert_eq!(criteria.dates.start, date("2024-02-01"));
    assert_eq!(criteria.time_slots.len(), 2);
}

#[test]
fn malformed_date_is_rejected() {
    let options = FilterOptions::observed(&table());
    let query = DashboardQuery::parse(Some("start=01/02/2024"));
    match query.criteria(&options) {
        Err(FilterError::InvalidDate { value }) => assert_eq!(value, "01/02/2024"),
        other => panic!("expected invalid date, got {other:?}"),
    }
}

#[test]
fn blank_dates_fall_back_to_observed_bounds() {
    let options = FilterOptions::observed(&table());
    let query = DashboardQuery::parse(Some("start=&end=&applied=1&channel=NTV"));
    let criteria = query.criteria(&options).unwrap();
    assert_eq!(criteria.dates.start, date("2024-01-10"));
    assert_eq!(criteria.dates.end, date("2024-03-01"));
}

#[test]
fn view_selectors_have_defaults_and_validate() {
    let query = DashboardQuery::parse(None);
    assert_eq!(query.highlight().unwrap(), Measure::Cost);
    assert_eq!(
        query.pivot_axes().unwrap(),
        (Dimension::Channel, Dimension::TimeSlot)
    );
    let query = DashboardQuery::parse(Some("highlight=cpt&rows=month&cols=advertiser_type"));
    assert_eq!(query.highlight().unwrap(), Measure::Cpt);
    assert_eq!(
        query.pivot_axes().unwrap(),
        (Dimension::Month, Dimension::AdvertiserType)
    );
    assert!(matches!(
        DashboardQuery::parse(Some("rows=weekday")).pivot_axes(),
        Err(FilterError::UnknownDimension { .. })
    ));
    assert!(matches!(
        DashboardQuery::parse(Some("highlight=profit")).highlight(),
        Err(FilterError::UnknownMeasure { .. })
    ));
}

#[test]
fn encode_replaces_selected_keys() {
    let query = DashboardQuery::parse(Some("channel=NTV&rows=month"));
    assert_eq!(query.encode(&[("rows", "channel")]), "channel=NTV&rows=channel");
    assert_eq!(query.encode(&[]), "channel=NTV&rows=month");
}

#[test]
fn export_args_default_to_every_observed_value() {
    let options = FilterOptions::observed(&table());
    let args = ExportArgs {
        channels: vec!["NTV".to_string()],
        end: Some(date("2024-02-28")),
        ..ExportArgs::default()
    };
    let criteria = args.criteria(&options);
    assert_eq!(criteria.channels.len(), 1);
    assert_eq!(criteria.time_slots.len(), 2);
    assert_eq!(criteria.dates.start, date("2024-01-10"));
    assert_eq!(criteria.dates.end, date("2024-02-28"));
}

#[test]
fn cli_parses_export_and_overrides() {
    let cli = Cli::try_parse_from([
        "airtime-dashboard",
        "--data",
        "placements.csv",
        "export",
        "--output",
        "out.csv",
        "--channel",
        "NTV",
        "--channel",
        "Russia 1",
        "--start",
        "2024-01-01",
    ])
    .unwrap();
    let mut config = DashboardConfig::default();
    cli.apply_overrides(&mut config);
    assert_eq!(config.data_path, std::path::PathBuf::from("placements.csv"));
    match cli.cmd {
        Some(Command::Export(args)) => {
            assert_eq!(args.channels, vec!["NTV", "Russia 1"]);
            assert_eq!(args.start, Some(date("2024-01-01")));
            assert_eq!(args.output, Some(std::path::PathBuf::from("out.csv")));
        }
        other => panic!("expected export command, got {other:?}"),
    }
}

#[test]
fn config_file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("airtime.toml");
    std::fs::write(
        &path,
        "data_path = \"placements.csv\"\npreview_rows = 25\nscatter_seed = 7\n\n[columns]\ncost = \"cost\"\n",
    )
    .unwrap();
    let config = DashboardConfig::load(Some(path.as_path())).unwrap();
    assert_eq!(config.data_path, std::path::PathBuf::from("placements.csv"));
    assert_eq!(config.preview_rows, 25);
    assert_eq!(config.scatter_seed, Some(7));
    assert_eq!(config.scatter_sample_limit, 1000);
    assert_eq!(config.columns.cost, "cost");
    assert_eq!(config.columns.channel, "Канал");
}
