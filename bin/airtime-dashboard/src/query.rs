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

//! Dashboard state carried in the query string.

use airtime::{DateRange, Dimension, FilterCriteria, FilterError, FilterOptions, Measure};
use chrono::NaiveDate;
use url::form_urlencoded;

/// Present when the sidebar form was submitted. Without it every category
/// that is absent from the query selects all observed values.
pub const APPLIED: &str = "applied";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardQuery {
    pairs: Vec<(String, String)>,
}
impl DashboardQuery {
    pub fn parse(raw: Option<&str>) -> Self {
        let pairs = raw
            .map(|q| {
                form_urlencoded::parse(q.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();
        Self { pairs }
    }
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
    pub fn first(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, v)| k == key && !v.trim().is_empty())
            .map(|(_, v)| v.trim())
    }
    pub fn all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
    fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }
    pub fn is_applied(&self) -> bool {
        self.contains(APPLIED)
    }

    pub fn criteria(&self, options: &FilterOptions) -> Result<FilterCriteria, FilterError> {
        let observed = options.dates.unwrap_or_else(DateRange::unbounded);
        let start = self.date("start")?.unwrap_or(observed.start);
        let end = self.date("end")?.unwrap_or(observed.end);
        let mut criteria = FilterCriteria::new(DateRange::new(start, end));
        let applied = self.is_applied();
        for dimension in Dimension::CATEGORICAL {
            if self.contains(dimension.name()) {
                criteria.select(dimension, self.all(dimension.name()));
            } else if !applied {
                criteria.select(dimension, options.values(dimension).iter().cloned());
            }
        }
        Ok(criteria)
    }
    fn date(&self, key: &str) -> Result<Option<NaiveDate>, FilterError> {
        self.first(key)
            .map(|value| {
                NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| FilterError::InvalidDate {
                    value: value.to_string(),
                })
            })
            .transpose()
    }

    /// Column whose maximum the styled table marks; cost unless chosen.
    pub fn highlight(&self) -> Result<Measure, FilterError> {
        self.first("highlight").map_or(Ok(Measure::Cost), str::parse)
    }
    /// Pivot row and column dimensions, channel by time slot by default.
    pub fn pivot_axes(&self) -> Result<(Dimension, Dimension), FilterError> {
        let rows = self.first("rows").map_or(Ok(Dimension::Channel), str::parse)?;
        let columns = self.first("cols").map_or(Ok(Dimension::TimeSlot), str::parse)?;
        Ok((rows, columns))
    }

    /// Query string for links that keep the current state. Keys in
    /// `replace` are dropped and re-added with the given value.
    pub fn encode(&self, replace: &[(&str, &str)]) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (k, v) in &self.pairs {
            if !replace.iter().any(|(key, _)| key == k) {
                serializer.append_pair(k, v);
            }
        }
        for (k, v) in replace {
            serializer.append_pair(k, v);
        }
        serializer.finish()
    }
}
