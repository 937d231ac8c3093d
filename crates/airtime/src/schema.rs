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

//! Record type and the vocabulary used to address its columns.

use crate::error::FilterError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display names of the calendar months, as the broadcaster's reports print them.
pub const MONTH_LABELS: [&str; 12] = [
    "Янв", "Фев", "Мар", "Апр", "Май", "Июн", "Июл", "Авг", "Сен", "Окт", "Ноя", "Дек",
];

pub fn month_label(month: u32) -> &'static str {
    (month as usize)
        .checked_sub(1)
        .and_then(|i| MONTH_LABELS.get(i))
        .copied()
        .unwrap_or("?")
}

/// Header labels of the source file.
///
/// Defaults match the labels of the broadcaster's export this dashboard was
/// built around; override them through configuration for other sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLabels {
    pub date: String,
    pub channel: String,
    pub time_slot: String,
    pub program_type: String,
    pub advertiser_type: String,
    pub cost: String,
    pub rating: String,
    pub cpt: String,
    pub duration: String,
    pub month: String,
}
impl Default for ColumnLabels {
    fn default() -> Self {
        Self {
            date: "Дата".to_string(),
            channel: "Канал".to_string(),
            time_slot: "Временной_слот".to_string(),
            program_type: "Тип_программы".to_string(),
            advertiser_type: "Тип_рекламодателя".to_string(),
            cost: "Стоимость_руб".to_string(),
            rating: "Рейтинг".to_string(),
            cpt: "CPT_руб".to_string(),
            duration: "Длительность_сек".to_string(),
            month: "Месяц".to_string(),
        }
    }
}
impl ColumnLabels {
    pub fn english() -> Self {
        Self {
            date: "date".to_string(),
            channel: "channel".to_string(),
            time_slot: "time_slot".to_string(),
            program_type: "program_type".to_string(),
            advertiser_type: "advertiser_type".to_string(),
            cost: "cost".to_string(),
            rating: "rating".to_string(),
            cpt: "cpt".to_string(),
            duration: "duration_sec".to_string(),
            month: "month".to_string(),
        }
    }
    pub fn label(&self, field: Field) -> &str {
        match field {
            Field::Date => &self.date,
            Field::Channel => &self.channel,
            Field::TimeSlot => &self.time_slot,
            Field::ProgramType => &self.program_type,
            Field::AdvertiserType => &self.advertiser_type,
            Field::Cost => &self.cost,
            Field::Rating => &self.rating,
            Field::Cpt => &self.cpt,
            Field::Duration => &self.duration,
            Field::Month => &self.month,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Date,
    Channel,
    TimeSlot,
    ProgramType,
    AdvertiserType,
    Cost,
    Rating,
    Cpt,
    Duration,
    Month,
}
impl Field {
    /// Columns a source file must carry. Month is derived when absent.
    pub const REQUIRED: [Field; 9] = [
        Field::Date,
        Field::Channel,
        Field::TimeSlot,
        Field::ProgramType,
        Field::AdvertiserType,
        Field::Cost,
        Field::Rating,
        Field::Cpt,
        Field::Duration,
    ];
    /// Currency columns are shown without decimals.
    pub fn is_currency(self) -> bool {
        matches!(self, Field::Cost | Field::Cpt)
    }
}

/// Grouping keys available to summaries, pivots and charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Channel,
    TimeSlot,
    ProgramType,
    AdvertiserType,
    Month,
    Duration,
}
impl Dimension {
    pub const CATEGORICAL: [Dimension; 4] = [
        Dimension::Channel,
        Dimension::TimeSlot,
        Dimension::ProgramType,
        Dimension::AdvertiserType,
    ];
    pub fn name(self) -> &'static str {
        match self {
            Dimension::Channel => "channel",
            Dimension::TimeSlot => "time_slot",
            Dimension::ProgramType => "program_type",
            Dimension::AdvertiserType => "advertiser_type",
            Dimension::Month => "month",
            Dimension::Duration => "duration",
        }
    }
    pub fn title(self) -> &'static str {
        match self {
            Dimension::Channel => "Channel",
            Dimension::TimeSlot => "Time slot",
            Dimension::ProgramType => "Program type",
            Dimension::AdvertiserType => "Advertiser type",
            Dimension::Month => "Month",
            Dimension::Duration => "Duration (sec)",
        }
    }
    pub fn field(self) -> Field {
        match self {
            Dimension::Channel => Field::Channel,
            Dimension::TimeSlot => Field::TimeSlot,
            Dimension::ProgramType => Field::ProgramType,
            Dimension::AdvertiserType => Field::AdvertiserType,
            Dimension::Month => Field::Month,
            Dimension::Duration => Field::Duration,
        }
    }
}
impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
impl FromStr for Dimension {
    type Err = FilterError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "channel" => Ok(Dimension::Channel),
            "time_slot" | "timeslot" | "slot" => Ok(Dimension::TimeSlot),
            "program_type" | "program" => Ok(Dimension::ProgramType),
            "advertiser_type" | "advertiser" => Ok(Dimension::AdvertiserType),
            "month" => Ok(Dimension::Month),
            "duration" => Ok(Dimension::Duration),
            _ => Err(FilterError::UnknownDimension {
                name: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    Cost,
    Rating,
    Cpt,
    Duration,
}
impl Measure {
    pub const ALL: [Measure; 4] = [Measure::Cost, Measure::Rating, Measure::Cpt, Measure::Duration];
    pub fn name(self) -> &'static str {
        match self {
            Measure::Cost => "cost",
            Measure::Rating => "rating",
            Measure::Cpt => "cpt",
            Measure::Duration => "duration",
        }
    }
    pub fn title(self) -> &'static str {
        match self {
            Measure::Cost => "Cost (RUB)",
            Measure::Rating => "Rating",
            Measure::Cpt => "CPT (RUB)",
            Measure::Duration => "Duration (sec)",
        }
    }
    pub fn field(self) -> Field {
        match self {
            Measure::Cost => Field::Cost,
            Measure::Rating => Field::Rating,
            Measure::Cpt => Field::Cpt,
            Measure::Duration => Field::Duration,
        }
    }
}
impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
impl FromStr for Measure {
    type Err = FilterError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cost" => Ok(Measure::Cost),
            "rating" => Ok(Measure::Rating),
            "cpt" => Ok(Measure::Cpt),
            "duration" => Ok(Measure::Duration),
            _ => Err(FilterError::UnknownMeasure {
                name: s.to_string(),
            }),
        }
    }
}

/// Value of a [`Dimension`] for one record. Keys of one dimension always
/// share a variant, so the derived ordering sorts text lexicographically and
/// months/durations numerically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum GroupKey {
    Month(u32),
    Seconds(u32),
    Text(String),
}
impl GroupKey {
    pub fn label(&self) -> String {
        match self {
            GroupKey::Month(m) => month_label(*m).to_string(),
            GroupKey::Seconds(s) => s.to_string(),
            GroupKey::Text(t) => t.clone(),
        }
    }
}
impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Month(m) => f.write_str(month_label(*m)),
            GroupKey::Seconds(s) => write!(f, "{s}"),
            GroupKey::Text(t) => f.write_str(t),
        }
    }
}

/// One advertising airing or contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub date: NaiveDate,
    pub channel: String,
    pub time_slot: String,
    pub program_type: String,
    pub advertiser_type: String,
    pub cost: f64,
    pub rating: f64,
    pub cpt: f64,
    pub duration_secs: u32,
    pub month: u32,
    #[serde(skip)]
    pub extras: Vec<String>,
}
impl Placement {
    pub fn new(
        date: NaiveDate,
        channel: impl Into<String>,
        time_slot: impl Into<String>,
        program_type: impl Into<String>,
        advertiser_type: impl Into<String>,
        cost: f64,
        rating: f64,
        cpt: f64,
        duration_secs: u32,
    ) -> Self {
        Self {
            date,
            channel: channel.into(),
            time_slot: time_slot.into(),
            program_type: program_type.into(),
            advertiser_type: advertiser_type.into(),
            cost,
            rating,
            cpt,
            duration_secs,
            month: date.month(),
            extras: Vec::new(),
        }
    }
    pub fn value(&self, measure: Measure) -> f64 {
        match measure {
            Measure::Cost => self.cost,
            Measure::Rating => self.rating,
            Measure::Cpt => self.cpt,
            Measure::Duration => f64::from(self.duration_secs),
        }
    }
    pub fn category(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::Channel => Some(&self.channel),
            Dimension::TimeSlot => Some(&self.time_slot),
            Dimension::ProgramType => Some(&self.program_type),
            Dimension::AdvertiserType => Some(&self.advertiser_type),
            Dimension::Month | Dimension::Duration => None,
        }
    }
    pub fn key(&self, dimension: Dimension) -> GroupKey {
        match dimension {
            Dimension::Month => GroupKey::Month(self.month),
            Dimension::Duration => GroupKey::Seconds(self.duration_secs),
            _ => GroupKey::Text(self.category(dimension).unwrap_or_default().to_string()),
        }
    }
}
