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

use crate::settings::DashboardConfig;
use airtime::{DateRange, Dimension, FilterCriteria, FilterOptions};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "airtime-dashboard", about = "TV advertising placement analytics dashboard")]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Dataset to load, `.xlsx` or `.csv`.
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,
    /// Address the dashboard listens on.
    #[arg(long, global = true)]
    pub bind: Option<String>,
    #[command(subcommand)]
    pub cmd: Option<Command>,
}
impl Cli {
    pub fn apply_overrides(&self, config: &mut DashboardConfig) {
        if let Some(data) = &self.data {
            config.data_path = data.clone();
        }
        if let Some(bind) = &self.bind {
            config.bind = bind.clone();
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Serve the dashboard over HTTP.
    Serve,
    /// Write the filtered rows to a file and exit.
    Export(ExportArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ExportArgs {
    /// Target file; `.xlsx` or `.csv`. Defaults to the configured export path.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
    #[arg(long)]
    pub start: Option<NaiveDate>,
    #[arg(long)]
    pub end: Option<NaiveDate>,
    #[arg(long = "channel")]
    pub channels: Vec<String>,
    #[arg(long = "time-slot")]
    pub time_slots: Vec<String>,
    #[arg(long = "program-type")]
    pub program_types: Vec<String>,
    #[arg(long = "advertiser-type")]
    pub advertiser_types: Vec<String>,
}
impl ExportArgs {
    /// Omitted bounds fall back to the observed dates and omitted categories
    /// to every observed value.
    pub fn criteria(&self, options: &FilterOptions) -> FilterCriteria {
        let observed = options.dates.unwrap_or_else(DateRange::unbounded);
        let mut criteria = FilterCriteria::all(options);
        criteria.dates = DateRange::new(
            self.start.unwrap_or(observed.start),
            self.end.unwrap_or(observed.end),
        );
        let chosen = [
            (Dimension::Channel, &self.channels),
            (Dimension::TimeSlot, &self.time_slots),
            (Dimension::ProgramType, &self.program_types),
            (Dimension::AdvertiserType, &self.advertiser_types),
        ];
        for (dimension, values) in chosen {
            if !values.is_empty() {
                criteria.select(dimension, values.iter().cloned());
            }
        }
        criteria
    }
}
