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

use crate::page::{self, Choice, Layout, Notice, Tab};
use crate::query::DashboardQuery;
use crate::state::AppState;
use airtime::chart::build_all;
use airtime::table::{pivot_table, record_table, summary_table};
use airtime::{
    export_view, group_summary, headline, pivot, Aggregate, ChartKind, Dimension, FilterCriteria,
    FilterError, FilterOptions, FilteredView, LoadError, Measure, Table,
};
use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Load(#[from] LoadError),
}
impl DashboardError {
    fn status(&self) -> StatusCode {
        match self {
            DashboardError::Filter(_) => StatusCode::BAD_REQUEST,
            DashboardError::Load(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
    fn code(&self) -> &'static str {
        match self {
            DashboardError::Filter(_) => "INVALID_QUERY",
            DashboardError::Load(_) => "DATASET_UNAVAILABLE",
        }
    }
}
impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            warn!(error = %self, "rejected query");
        }
        let heading = if status.is_server_error() {
            "Dataset unavailable"
        } else {
            "Invalid filter"
        };
        (status, Html(page::error_page(heading, &self.to_string()))).into_response()
    }
}

/// JSON form of [`DashboardError`] for the `/api` routes.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip)]
    status: StatusCode,
}
impl From<DashboardError> for ApiError {
    fn from(e: DashboardError) -> Self {
        Self {
            code: e.code().to_string(),
            message: e.to_string(),
            status: e.status(),
        }
    }
}
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        let body = Json(self);
        (status, body).into_response()
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(raw_table))
        .route("/raw", get(raw_table))
        .route("/filtered", get(filtered_table))
        .route("/styled", get(styled_table))
        .route("/pivot", get(pivot_view))
        .route("/charts", get(charts))
        .route("/export", post(export))
        .route("/api/summary", get(api_summary))
        .route("/api/charts", get(api_charts))
        .with_state(state)
}

/// Everything a handler needs after the query has been resolved against the
/// loaded table.
struct RequestContext {
    table: Arc<Table>,
    options: FilterOptions,
    query: DashboardQuery,
    criteria: FilterCriteria,
}
impl RequestContext {
    fn resolve(state: &AppState, raw: Option<String>) -> Result<Self, DashboardError> {
        let table = state.table()?;
        let options = FilterOptions::observed(&table);
        let query = DashboardQuery::parse(raw.as_deref());
        let criteria = query.criteria(&options)?;
        Ok(Self {
            table,
            options,
            query,
            criteria,
        })
    }
    fn view(&self) -> FilteredView<'_> {
        self.criteria.apply(&self.table)
    }
    fn layout(&self, tab: Tab) -> Layout<'_> {
        Layout {
            tab,
            query: &self.query,
            options: &self.options,
            criteria: &self.criteria,
        }
    }
}

async fn raw_table(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Html<String>, DashboardError> {
    let ctx = RequestContext::resolve(&state, raw)?;
    let head = ctx.table.head(state.config.preview_rows);
    let body = page::table_or_notice(&record_table(&ctx.table, &head, None));
    Ok(Html(ctx.layout(Tab::Raw).render(&[], &body)))
}

async fn filtered_table(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Html<String>, DashboardError> {
    let ctx = RequestContext::resolve(&state, raw)?;
    Ok(Html(render_filtered(&state, &ctx, &[])))
}

fn render_filtered(state: &AppState, ctx: &RequestContext, notices: &[Notice]) -> String {
    let view = ctx.view();
    let mut body = page::table_or_notice(&record_table(
        &ctx.table,
        view.head(state.config.preview_rows),
        None,
    ));
    body.push_str(&Notice::info(format!("Records after filtering: {}", view.len())).render());
    ctx.layout(Tab::Filtered).render(notices, &body)
}

async fn styled_table(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Html<String>, DashboardError> {
    let ctx = RequestContext::resolve(&state, raw)?;
    let measure = ctx.query.highlight()?;
    let view = ctx.view();
    let options: Vec<(&str, &str)> = Measure::ALL.iter().map(|m| (m.name(), m.title())).collect();
    let mut body = page::choice_form(
        Tab::Styled.path(),
        &ctx.query,
        &[Choice {
            name: "highlight",
            label: "Highlight maximum of",
            selected: measure.name(),
            options,
        }],
    );
    body.push_str(&page::table_or_notice(&record_table(
        &ctx.table,
        view.head(state.config.preview_rows),
        Some(measure),
    )));
    Ok(Html(ctx.layout(Tab::Styled).render(&[], &body)))
}

async fn pivot_view(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Html<String>, DashboardError> {
    let ctx = RequestContext::resolve(&state, raw)?;
    let (rows, columns) = ctx.query.pivot_axes()?;
    let view = ctx.view();
    let dimensions = |selected: Dimension| -> Vec<(&'static str, &'static str)> {
        Dimension::CATEGORICAL
            .iter()
            .chain([Dimension::Month, Dimension::Duration].iter())
            .filter(|d| **d != selected)
            .map(|d| (d.name(), d.title()))
            .collect()
    };
    let mut body = page::choice_form(
        Tab::Pivot.path(),
        &ctx.query,
        &[
            Choice {
                name: "rows",
                label: "Rows",
                selected: rows.name(),
                options: prepend(rows, dimensions(rows)),
            },
            Choice {
                name: "cols",
                label: "Columns",
                selected: columns.name(),
                options: prepend(columns, dimensions(columns)),
            },
        ],
    );
    let grid = pivot(&view, rows, columns, Measure::Cost, Aggregate::Mean);
    body.push_str(&page::table_or_notice(&pivot_table(&grid)));
    body.push_str("<h3>Cost statistics by channel</h3>");
    let summary = group_summary(&view, Dimension::Channel, &Aggregate::COST_SUMMARY);
    body.push_str(&page::table_or_notice(&summary_table(
        &summary,
        Dimension::Channel,
        &Aggregate::COST_SUMMARY,
    )));
    Ok(Html(ctx.layout(Tab::Pivot).render(&[], &body)))
}

fn prepend(
    first: Dimension,
    mut rest: Vec<(&'static str, &'static str)>,
) -> Vec<(&'static str, &'static str)> {
    rest.insert(0, (first.name(), first.title()));
    rest
}

async fn charts(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Html<String>, DashboardError> {
    let ctx = RequestContext::resolve(&state, raw)?;
    let view = ctx.view();
    let mut body = page::kpi_tiles(&headline(&view));
    for (position, (kind, result)) in build_all(&view, &state.config.chart_options())
        .iter()
        .enumerate()
    {
        body.push_str(&page::chart(position + 1, *kind, result));
    }
    Ok(Html(ctx.layout(Tab::Charts).render(&[], &body)))
}

async fn export(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Html<String>, DashboardError> {
    let ctx = RequestContext::resolve(&state, raw)?;
    let view = ctx.view();
    let target = &state.config.export_path;
    let notice = match export_view(&ctx.table, &view, target) {
        Ok(rows) => Notice::success(format!("Exported {rows} rows to {}", target.display())),
        Err(e) => {
            error!(error = %e, "export failed");
            Notice::error(format!("Export failed: {e}"))
        }
    };
    Ok(Html(render_filtered(&state, &ctx, &[notice])))
}

async fn api_summary(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Value>, ApiError> {
    let ctx = RequestContext::resolve(&state, raw)?;
    let (rows, columns) = ctx.query.pivot_axes().map_err(DashboardError::from)?;
    let view = ctx.view();
    info!(records = view.len(), "summary requested");
    Ok(Json(json!({
        "records": view.len(),
        "headline": headline(&view),
        "by_channel": group_summary(&view, Dimension::Channel, &Aggregate::COST_SUMMARY),
        "pivot": pivot(&view, rows, columns, Measure::Cost, Aggregate::Mean),
    })))
}

#[derive(Debug, Serialize)]
struct ChartEntry {
    kind: ChartKind,
    heading: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    figure: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

async fn api_charts(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Vec<ChartEntry>>, ApiError> {
    let ctx = RequestContext::resolve(&state, raw)?;
    let view = ctx.view();
    let entries = build_all(&view, &state.config.chart_options())
        .into_iter()
        .map(|(kind, result)| match result {
            Ok(chart) => ChartEntry {
                kind,
                heading: kind.heading(),
                figure: Some(chart.to_plotly()),
                warning: None,
            },
            Err(warning) => ChartEntry {
                kind,
                heading: kind.heading(),
                figure: None,
                warning: Some(warning.to_string()),
            },
        })
        .collect();
    Ok(Json(entries))
}
