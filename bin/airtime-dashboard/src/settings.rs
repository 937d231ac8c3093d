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

use airtime::{ChartOptions, ColumnLabels};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Base name of the optional configuration file in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "airtime";
/// Prefix for environment overrides, e.g. `AIRTIME__DATA_PATH`.
pub const ENV_PREFIX: &str = "AIRTIME";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub export_path: PathBuf,
    pub bind: String,
    pub preview_rows: usize,
    pub scatter_sample_limit: usize,
    pub scatter_seed: Option<u64>,
    pub columns: ColumnLabels,
}
impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("tv_advertising_data.xlsx"),
            export_path: PathBuf::from("filtered_tv_advertising_data.xlsx"),
            bind: "127.0.0.1:8501".to_string(),
            preview_rows: airtime::DEFAULT_PREVIEW_ROWS,
            scatter_sample_limit: 1000,
            scatter_seed: None,
            columns: ColumnLabels::default(),
        }
    }
}
impl DashboardConfig {
    /// Layers, lowest first: built-in defaults, the config file, then
    /// `AIRTIME__*` variables. An explicit `file` must exist; the default
    /// `airtime.{toml,yaml,json}` is optional.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let source = match file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        Config::builder()
            .add_source(source)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
    pub fn chart_options(&self) -> ChartOptions {
        ChartOptions {
            scatter_sample_limit: self.scatter_sample_limit,
            scatter_seed: self.scatter_seed,
        }
    }
}
