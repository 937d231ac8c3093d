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

#![allow(dead_code)]

use airtime::{ColumnLabels, Placement, Table};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("fixture date")
}

pub fn placement(
    day: &str,
    channel: &str,
    time_slot: &str,
    program_type: &str,
    advertiser_type: &str,
    cost: f64,
    rating: f64,
    cpt: f64,
    duration_secs: u32,
) -> Placement {
    Placement::new(
        date(day),
        channel,
        time_slot,
        program_type,
        advertiser_type,
        cost,
        rating,
        cpt,
        duration_secs,
    )
}

pub fn sample_records() -> Vec<Placement> {
    vec![
        placement("2024-01-10", "Channel One", "Prime", "Series", "Retail", 100.0, 5.0, 20.0, 30),
        placement("2024-01-20", "Russia 1", "Prime", "News", "Pharma", 200.0, 4.0, 50.0, 15),
        placement("2024-02-05", "Channel One", "Day", "Series", "Retail", 300.0, 6.0, 50.0, 30),
        placement("2024-03-15", "NTV", "Night", "Sport", "Auto", 50.0, 1.0, 40.0, 10),
        placement("2024-03-31", "Russia 1", "Day", "News", "Retail", 150.0, 3.0, 50.0, 20),
    ]
}

pub fn sample_table() -> Table {
    Table::new(sample_records(), &ColumnLabels::english())
}

pub const ENGLISH_HEADER: &str =
    "date,channel,time_slot,program_type,advertiser_type,cost,rating,cpt,duration_sec";

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write fixture");
    path
}

pub fn sample_csv() -> String {
    [
        ENGLISH_HEADER,
        "2024-01-10,Channel One,Prime,Series,Retail,100,5,20,30",
        "2024-01-20,Russia 1,Prime,News,Pharma,200,4,50,15",
        "2024-02-05,Channel One,Day,Series,Retail,300,6,50,30",
        "2024-03-15,NTV,Night,Sport,Auto,50,1,40,10",
        "2024-03-31,Russia 1,Day,News,Retail,150,3,50,20",
    ]
    .join("\n")
}
