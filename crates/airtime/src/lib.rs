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

pub mod aggregate;
pub mod chart;
pub mod dataset;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod schema;
pub mod table;

pub use aggregate::{
    group_mean, group_summary, headline, monthly_series, pivot, Aggregate, GroupMean, Headline,
    PivotTable, SummaryRow, TimePoint,
};
pub use chart::{ChartData, ChartKind, ChartOptions, ChartSpec};
pub use dataset::{Cell, SourceColumn, Table};
pub use error::{EmptyResultWarning, ExportError, FilterError, LoadError};
pub use export::{export_view, ExportFormat};
pub use filter::{DateRange, FilterCriteria, FilterOptions, FilteredView};
pub use loader::{load, DatasetCache};
pub use schema::{ColumnLabels, Dimension, Field, GroupKey, Measure, Placement};
pub use table::{StyledTable, DEFAULT_PREVIEW_ROWS};
