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
use airtime::{DatasetCache, LoadError, Table};
use std::sync::Arc;
use tracing::debug;

/// Shared by every handler. The dataset is read on first use and kept for
/// the life of the process.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<DashboardConfig>,
    cache: Arc<DatasetCache>,
}
impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let cache = DatasetCache::new(config.data_path.clone(), config.columns.clone());
        Self {
            config: Arc::new(config),
            cache: Arc::new(cache),
        }
    }
    pub fn table(&self) -> Result<Arc<Table>, LoadError> {
        if !self.cache.is_loaded() {
            debug!(path = %self.config.data_path.display(), "dataset not cached yet");
        }
        self.cache.get()
    }
}
