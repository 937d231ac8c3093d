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

use crate::aggregate::{self, Aggregate, GroupMean};
use crate::error::EmptyResultWarning;
use crate::filter::FilteredView;
use crate::schema::{Dimension, Measure, Placement};
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use serde_json::{json, Value};

const COLOUR_SCALE: &str = "Blues";
const MAX_MARKER_PX: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    CostByTimeSlot,
    CostByChannel,
    RatingVsCost,
    CostByMonth,
    ChannelSlotHeatmap,
    CostByDuration,
    CptByAdvertiser,
}
impl ChartKind {
    pub const ALL: [ChartKind; 7] = [
        ChartKind::CostByTimeSlot,
        ChartKind::CostByChannel,
        ChartKind::RatingVsCost,
        ChartKind::CostByMonth,
        ChartKind::ChannelSlotHeatmap,
        ChartKind::CostByDuration,
        ChartKind::CptByAdvertiser,
    ];
    pub fn heading(self) -> &'static str {
        match self {
            ChartKind::CostByTimeSlot => "Cost by time slot",
            ChartKind::CostByChannel => "Cost by channel",
            ChartKind::RatingVsCost => "Rating and cost",
            ChartKind::CostByMonth => "Seasonality",
            ChartKind::ChannelSlotHeatmap => "Heatmap: channel vs time slot",
            ChartKind::CostByDuration => "Spot duration and cost",
            ChartKind::CptByAdvertiser => "Efficiency (CPT) by advertiser type",
        }
    }
    pub fn slug(self) -> &'static str {
        match self {
            ChartKind::CostByTimeSlot => "cost-by-time-slot",
            ChartKind::CostByChannel => "cost-by-channel",
            ChartKind::RatingVsCost => "rating-vs-cost",
            ChartKind::CostByMonth => "cost-by-month",
            ChartKind::ChannelSlotHeatmap => "channel-slot-heatmap",
            ChartKind::CostByDuration => "cost-by-duration",
            ChartKind::CptByAdvertiser => "cpt-by-advertiser",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub rating: f64,
    pub cost: f64,
    pub duration_secs: u32,
    pub time_slot: String,
    pub channel: String,
    pub program_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartData {
    Bar {
        categories: Vec<String>,
        values: Vec<f64>,
        horizontal: bool,
    },
    Line {
        labels: Vec<String>,
        values: Vec<f64>,
    },
    Scatter {
        points: Vec<ScatterPoint>,
    },
    Heatmap {
        x: Vec<String>,
        y: Vec<String>,
        z: Vec<Vec<f64>>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub data: ChartData,
}

#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub scatter_sample_limit: usize,
    /// Fixed seed for the scatter sample; fresh entropy when `None`.
    pub scatter_seed: Option<u64>,
}
impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            scatter_sample_limit: 1000,
            scatter_seed: None,
        }
    }
}

pub fn build(
    kind: ChartKind,
    view: &FilteredView<'_>,
    options: &ChartOptions,
) -> Result<ChartSpec, EmptyResultWarning> {
    if view.is_empty() {
        return Err(EmptyResultWarning::new(kind.heading()));
    }
    let chart = match kind {
        ChartKind::CostByTimeSlot => bar(
            kind,
            "Average ad cost by time slot",
            Dimension::TimeSlot,
            Measure::Cost,
            aggregate::group_mean(view, Dimension::TimeSlot, Measure::Cost),
            false,
        ),
        ChartKind::CostByChannel => {
            let mut means = aggregate::group_mean(view, Dimension::Channel, Measure::Cost);
            means.sort_by(|a, b| b.value.total_cmp(&a.value));
            bar(
                kind,
                "Average ad cost by channel",
                Dimension::Channel,
                Measure::Cost,
                means,
                false,
            )
        }
        ChartKind::RatingVsCost => ChartSpec {
            kind,
            title: "Cost against program rating".to_string(),
            x_label: "Program rating".to_string(),
            y_label: Measure::Cost.title().to_string(),
            data: ChartData::Scatter {
                points: sample(view.records(), options.scatter_sample_limit, options.scatter_seed)
                    .into_iter()
                    .map(|r| ScatterPoint {
                        rating: r.rating,
                        cost: r.cost,
                        duration_secs: r.duration_secs,
                        time_slot: r.time_slot.clone(),
                        channel: r.channel.clone(),
                        program_type: r.program_type.clone(),
                    })
                    .collect(),
            },
        },
        ChartKind::CostByMonth => {
            let series = aggregate::monthly_series(view, Measure::Cost);
            ChartSpec {
                kind,
                title: "Ad cost seasonality by month".to_string(),
                x_label: Dimension::Month.title().to_string(),
                y_label: "Average cost (RUB)".to_string(),
                data: ChartData::Line {
                    labels: series.iter().map(|p| p.label.to_string()).collect(),
                    values: series.iter().map(|p| p.value).collect(),
                },
            }
        }
        ChartKind::ChannelSlotHeatmap => {
            let pivot = aggregate::pivot(
                view,
                Dimension::Channel,
                Dimension::TimeSlot,
                Measure::Cost,
                Aggregate::Mean,
            );
            ChartSpec {
                kind,
                title: "Average ad cost: channel × time slot".to_string(),
                x_label: Dimension::TimeSlot.title().to_string(),
                y_label: Dimension::Channel.title().to_string(),
                data: ChartData::Heatmap {
                    x: pivot.columns.iter().map(|k| k.label()).collect(),
                    y: pivot.rows.iter().map(|k| k.label()).collect(),
                    z: pivot.cells,
                },
            }
        }
        ChartKind::CostByDuration => bar(
            kind,
            "Ad cost by spot duration",
            Dimension::Duration,
            Measure::Cost,
            aggregate::group_mean(view, Dimension::Duration, Measure::Cost),
            false,
        ),
        ChartKind::CptByAdvertiser => {
            let mut means = aggregate::group_mean(view, Dimension::AdvertiserType, Measure::Cpt);
            means.sort_by(|a, b| a.value.total_cmp(&b.value));
            bar(
                kind,
                "Average CPT by advertiser type",
                Dimension::AdvertiserType,
                Measure::Cpt,
                means,
                true,
            )
        }
    };
    Ok(chart)
}

pub fn build_all(
    view: &FilteredView<'_>,
    options: &ChartOptions,
) -> Vec<(ChartKind, Result<ChartSpec, EmptyResultWarning>)> {
    ChartKind::ALL
        .iter()
        .map(|kind| (*kind, build(*kind, view, options)))
        .collect()
}

fn bar(
    kind: ChartKind,
    title: &str,
    dimension: Dimension,
    measure: Measure,
    means: Vec<GroupMean>,
    horizontal: bool,
) -> ChartSpec {
    let value_label = match measure {
        Measure::Cost => "Average cost (RUB)".to_string(),
        other => other.title().to_string(),
    };
    let (x_label, y_label) = if horizontal {
        (value_label, dimension.title().to_string())
    } else {
        (dimension.title().to_string(), value_label)
    };
    ChartSpec {
        kind,
        title: title.to_string(),
        x_label,
        y_label,
        data: ChartData::Bar {
            categories: means.iter().map(|m| m.key.label()).collect(),
            values: means.iter().map(|m| m.value).collect(),
            horizontal,
        },
    }
}

/// At most `limit` records. Views within the limit come back whole and in
/// order; larger ones are sampled without replacement.
pub fn sample<'a>(records: &[&'a Placement], limit: usize, seed: Option<u64>) -> Vec<&'a Placement> {
    if records.len() <= limit {
        return records.to_vec();
    }
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    records.choose_multiple(&mut rng, limit).copied().collect()
}

impl ChartSpec {
    /// Plotly figure (`data` + `layout`) for this chart.
    pub fn to_plotly(&self) -> Value {
        let data = match &self.data {
            ChartData::Bar {
                categories,
                values,
                horizontal,
            } => {
                let (x, y, orientation) = if *horizontal {
                    (json!(values), json!(categories), "h")
                } else {
                    (json!(categories), json!(values), "v")
                };
                json!([{
                    "type": "bar",
                    "x": x,
                    "y": y,
                    "orientation": orientation,
                    "marker": { "color": values, "colorscale": COLOUR_SCALE, "showscale": true },
                }])
            }
            ChartData::Line { labels, values } => json!([{
                "type": "scatter",
                "mode": "lines+markers",
                "x": labels,
                "y": values,
            }]),
            ChartData::Scatter { points } => {
                let largest = points
                    .iter()
                    .map(|p| f64::from(p.duration_secs))
                    .fold(1.0, f64::max);
                let sizeref = 2.0 * largest / (MAX_MARKER_PX * MAX_MARKER_PX);
                let mut by_slot: IndexMap<&str, Vec<&ScatterPoint>> = IndexMap::new();
                for point in points {
                    by_slot.entry(point.time_slot.as_str()).or_default().push(point);
                }
                let traces: Vec<Value> = by_slot
                    .into_iter()
                    .map(|(slot, group)| {
                        let x: Vec<f64> = group.iter().map(|p| p.rating).collect();
                        let y: Vec<f64> = group.iter().map(|p| p.cost).collect();
                        let sizes: Vec<u32> = group.iter().map(|p| p.duration_secs).collect();
                        let hover: Vec<String> = group
                            .iter()
                            .map(|p| format!("{} / {}", p.channel, p.program_type))
                            .collect();
                        json!({
                            "type": "scatter",
                            "mode": "markers",
                            "name": slot,
                            "x": x,
                            "y": y,
                            "text": hover,
                            "marker": {
                                "size": sizes,
                                "sizemode": "area",
                                "sizeref": sizeref,
                            },
                        })
                    })
                    .collect();
                Value::Array(traces)
            }
            ChartData::Heatmap { x, y, z } => {
                let text: Vec<Vec<f64>> = z
                    .iter()
                    .map(|row| row.iter().map(|v| v.round()).collect())
                    .collect();
                json!([{
                    "type": "heatmap",
                    "x": x,
                    "y": y,
                    "z": z,
                    "colorscale": COLOUR_SCALE,
                    "text": text,
                    "texttemplate": "%{text:,.0f}",
                    "textfont": { "size": 10 },
                }])
            }
        };
        json!({
            "data": data,
            "layout": {
                "title": { "text": self.title },
                "xaxis": { "title": { "text": self.x_label } },
                "yaxis": { "title": { "text": self.y_label } },
                "margin": { "t": 48 },
            },
        })
    }
}
