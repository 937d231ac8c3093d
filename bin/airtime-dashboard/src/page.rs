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

//! Server-rendered HTML for the dashboard. Charts are drawn client-side by
//! Plotly from figure JSON embedded in the page.

use crate::query::{DashboardQuery, APPLIED};
use airtime::table::{format_currency, format_decimal};
use airtime::{
    ChartKind, ChartSpec, Dimension, EmptyResultWarning, FilterCriteria, FilterOptions, Headline,
    StyledTable,
};
use serde_json::Value;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";
const TITLE: &str = "TV sponsorship advertising cost analysis";

const STYLE: &str = r#"
body { margin: 0; font-family: system-ui, sans-serif; color: #111827;
  background-color: #fafafa; background-image: radial-gradient(#e0e0e0 1px, transparent 1px);
  background-size: 24px 24px; }
.layout { display: flex; min-height: 100vh; }
aside { width: 280px; padding: 1rem; background: #f8fafc; border-right: 1px solid #e2e8f0; }
aside h2 { color: #1e40af; margin-top: 0; }
aside label { display: block; margin-top: .8rem; font-weight: 600; color: #1e40af; }
aside select, aside input { width: 100%; }
main { flex: 1; padding: 1rem 2rem; overflow-x: auto; }
h1 { color: #1d4ed8; font-weight: 800; letter-spacing: -0.5px; margin-bottom: .5rem; }
h2, h3 { color: #1e40af; font-weight: 600; margin-top: 1.2rem; }
nav a { display: inline-block; padding: .5rem 1rem; margin-right: .3rem; border-radius: 8px 8px 0 0;
  color: #1e40af; text-decoration: none; background: #e2e8f0; }
nav a.active { background: #2563eb; color: white; }
button { background: linear-gradient(135deg, #2563eb, #1d4ed8); color: white; border: none;
  border-radius: 8px; padding: .5rem 1rem; font-weight: 600; margin-top: 1rem; cursor: pointer; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; font-size: .95em;
  box-shadow: 0 2px 6px rgba(0,0,0,.05); }
thead tr { background-color: #2563eb; color: white; font-weight: 600; }
th, td { padding: 10px 12px; text-align: right; }
th:first-child, td:first-child { text-align: left; }
tbody tr:nth-of-type(even) { background-color: #f8fafc; }
tbody tr:hover { background-color: #edf2ff; }
td.highlight { background-color: #dbeafe; font-weight: 700; }
td.shaded { text-align: center; }
.notice { padding: .75rem 1rem; border-radius: 8px; margin: 1rem 0; }
.notice.info { background: #e0f2fe; color: #075985; }
.notice.success { background: #dcfce7; color: #166534; }
.notice.warning { background: #fef9c3; color: #854d0e; }
.notice.error { background: #fee2e2; color: #991b1b; }
.tiles { display: flex; gap: 1rem; }
.tile { flex: 1; background: white; padding: 1rem; border-radius: 12px; border-left: 4px solid #2563eb;
  box-shadow: 0 2px 8px rgba(0,0,0,.06); }
.tile span { display: block; color: #3b82f6; font-weight: 500; }
.tile strong { font-size: 1.3rem; }
.chart { min-height: 420px; }
"#;

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Raw,
    Filtered,
    Styled,
    Pivot,
    Charts,
}
impl Tab {
    pub const ALL: [Tab; 5] = [Tab::Raw, Tab::Filtered, Tab::Styled, Tab::Pivot, Tab::Charts];
    pub fn path(self) -> &'static str {
        match self {
            Tab::Raw => "/raw",
            Tab::Filtered => "/filtered",
            Tab::Styled => "/styled",
            Tab::Pivot => "/pivot",
            Tab::Charts => "/charts",
        }
    }
    pub fn title(self) -> &'static str {
        match self {
            Tab::Raw => "Raw table",
            Tab::Filtered => "Filtered table",
            Tab::Styled => "Styled table",
            Tab::Pivot => "Pivot table",
            Tab::Charts => "Charts and analysis",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}
impl NoticeLevel {
    fn class(self) -> &'static str {
        match self {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "success",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}
impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, text: text.into() }
    }
    pub fn success(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, text: text.into() }
    }
    pub fn warning(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, text: text.into() }
    }
    pub fn error(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, text: text.into() }
    }
    pub fn render(&self) -> String {
        format!(
            r#"<div class="notice {}">{}</div>"#,
            self.level.class(),
            escape_html(&self.text)
        )
    }
}
impl From<&EmptyResultWarning> for Notice {
    fn from(warning: &EmptyResultWarning) -> Self {
        Notice::warning(warning.to_string())
    }
}

/// Frame shared by every tab: title, filter sidebar, tab strip, notices.
pub struct Layout<'a> {
    pub tab: Tab,
    pub query: &'a DashboardQuery,
    pub options: &'a FilterOptions,
    pub criteria: &'a FilterCriteria,
}
impl Layout<'_> {
    pub fn render(&self, notices: &[Notice], body: &str) -> String {
        let mut html = String::with_capacity(body.len() + 8 * 1024);
        html.push_str("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">");
        html.push_str(&format!("<title>{}</title>", escape_html(TITLE)));
        html.push_str(&format!("<script src=\"{PLOTLY_CDN}\"></script>"));
        html.push_str(&format!("<style>{STYLE}</style></head><body><div class=\"layout\">"));
        html.push_str(&self.sidebar());
        html.push_str("<main>");
        html.push_str(&format!("<h1>{}</h1>", escape_html(TITLE)));
        html.push_str("<p>Interactive dashboard of the factors that shape advertising cost.</p>");
        html.push_str(&self.tabs());
        html.push_str(&format!("<h2>{}</h2>", escape_html(self.tab.title())));
        for notice in notices {
            html.push_str(&notice.render());
        }
        html.push_str(body);
        html.push_str("</main></div></body></html>");
        html
    }

    fn tabs(&self) -> String {
        let query = escape_html(&self.query.encode(&[]));
        let mut html = String::from("<nav>");
        for tab in Tab::ALL {
            let class = if tab == self.tab { " class=\"active\"" } else { "" };
            html.push_str(&format!(
                "<a href=\"{}?{query}\"{class}>{}</a>",
                tab.path(),
                escape_html(tab.title())
            ));
        }
        html.push_str("</nav>");
        html
    }

    fn sidebar(&self) -> String {
        let mut html = String::from("<aside><h2>Filters</h2>");
        html.push_str(&format!("<form method=\"get\" action=\"{}\">", self.tab.path()));
        html.push_str(&format!("<input type=\"hidden\" name=\"{APPLIED}\" value=\"1\">"));
        for key in ["rows", "cols", "highlight"] {
            if let Some(value) = self.query.first(key) {
                html.push_str(&hidden(key, value));
            }
        }
        let (min, max) = self
            .options
            .dates
            .map(|r| (r.start.to_string(), r.end.to_string()))
            .unwrap_or_default();
        let dates = self.criteria.dates;
        let bounded = self.options.dates.is_some();
        for (name, label, value) in [
            ("start", "From", dates.start),
            ("end", "To", dates.end),
        ] {
            let value = if bounded { value.to_string() } else { String::new() };
            html.push_str(&format!(
                "<label for=\"{name}\">{label}</label><input type=\"date\" id=\"{name}\" name=\"{name}\" value=\"{value}\" min=\"{min}\" max=\"{max}\">"
            ));
        }
        for dimension in Dimension::CATEGORICAL {
            let values = self.options.values(dimension);
            let selected = self.criteria.selection(dimension);
            html.push_str(&format!(
                "<label for=\"{0}\">{1}</label><select id=\"{0}\" name=\"{0}\" multiple size=\"{2}\">",
                dimension.name(),
                escape_html(dimension.title()),
                values.len().clamp(2, 8)
            ));
            for value in values {
                let mark = if selected.is_some_and(|s| s.contains(value)) {
                    " selected"
                } else {
                    ""
                };
                let value = escape_html(value);
                html.push_str(&format!("<option value=\"{value}\"{mark}>{value}</option>"));
            }
            html.push_str("</select>");
        }
        html.push_str("<button type=\"submit\">Apply filters</button></form>");
        html.push_str(&format!(
            "<form method=\"post\" action=\"/export?{}\"><button type=\"submit\">Export filtered data</button></form>",
            escape_html(&self.query.encode(&[]))
        ));
        html.push_str("</aside>");
        html
    }
}

fn hidden(name: &str, value: &str) -> String {
    format!(
        "<input type=\"hidden\" name=\"{}\" value=\"{}\">",
        escape_html(name),
        escape_html(value)
    )
}

/// Small GET form that re-submits the current query with some keys chosen
/// from drop-downs.
pub fn choice_form(action: &str, query: &DashboardQuery, choices: &[Choice<'_>]) -> String {
    let mut html = format!("<form method=\"get\" action=\"{action}\" class=\"choices\">");
    for (key, value) in query.pairs() {
        if !choices.iter().any(|c| c.name == key) {
            html.push_str(&hidden(key, value));
        }
    }
    for choice in choices {
        html.push_str(&format!(
            "<label>{} <select name=\"{}\">",
            escape_html(choice.label),
            escape_html(choice.name)
        ));
        for (value, label) in &choice.options {
            let mark = if *value == choice.selected { " selected" } else { "" };
            html.push_str(&format!(
                "<option value=\"{}\"{mark}>{}</option>",
                escape_html(value),
                escape_html(label)
            ));
        }
        html.push_str("</select></label> ");
    }
    html.push_str("<button type=\"submit\">Show</button></form>");
    html
}

pub struct Choice<'a> {
    pub name: &'a str,
    pub label: &'a str,
    pub selected: &'a str,
    /// `(value, label)` pairs.
    pub options: Vec<(&'a str, &'a str)>,
}

pub fn table(styled: &StyledTable) -> String {
    let mut html = String::from("<table><thead><tr>");
    if let Some(index) = &styled.index_header {
        html.push_str(&format!("<th>{}</th>", escape_html(index)));
    }
    for header in &styled.headers {
        html.push_str(&format!("<th>{}</th>", escape_html(header)));
    }
    html.push_str("</tr></thead><tbody>");
    for row in &styled.rows {
        html.push_str("<tr>");
        if let Some(label) = &row.label {
            html.push_str(&format!("<th>{}</th>", escape_html(label)));
        }
        for cell in &row.cells {
            let text = escape_html(&cell.text);
            match (cell.highlight, cell.shade) {
                (true, _) => html.push_str(&format!("<td class=\"highlight\">{text}</td>")),
                (false, Some(shade)) => html.push_str(&format!(
                    "<td class=\"shaded\" style=\"{}\">{text}</td>",
                    shade_style(shade)
                )),
                (false, None) => html.push_str(&format!("<td>{text}</td>")),
            }
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}

/// Linear blend across the ends of the "Blues" scale.
fn shade_style(shade: f64) -> String {
    const LIGHT: [f64; 3] = [247.0, 251.0, 255.0];
    const DARK: [f64; 3] = [8.0, 48.0, 107.0];
    let t = shade.clamp(0.0, 1.0);
    let [r, g, b] = [0, 1, 2].map(|i| (LIGHT[i] + (DARK[i] - LIGHT[i]) * t).round() as u8);
    let text = if t > 0.6 { "#ffffff" } else { "#111827" };
    format!("background-color: rgb({r}, {g}, {b}); color: {text}")
}

pub fn table_or_notice(result: &Result<StyledTable, EmptyResultWarning>) -> String {
    match result {
        Ok(styled) => table(styled),
        Err(warning) => Notice::from(warning).render(),
    }
}

pub fn kpi_tiles(headline: &Headline) -> String {
    let money = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{} ₽", format_currency(v)));
    let tiles = [
        ("Mean cost", money(headline.mean_cost)),
        (
            "Mean rating",
            headline.mean_rating.map_or_else(|| "-".to_string(), format_decimal),
        ),
        (
            "Mean CPT",
            headline
                .mean_cpt
                .map_or_else(|| "-".to_string(), |v| format!("{} ₽", format_decimal(v))),
        ),
        ("Total contracts", format_currency(headline.contracts as f64)),
    ];
    let mut html = String::from("<div class=\"tiles\">");
    for (label, value) in tiles {
        html.push_str(&format!(
            "<div class=\"tile\"><span>{}</span><strong>{}</strong></div>",
            escape_html(label),
            escape_html(&value)
        ));
    }
    html.push_str("</div>");
    html
}

pub fn chart(position: usize, kind: ChartKind, result: &Result<ChartSpec, EmptyResultWarning>) -> String {
    let mut html = format!(
        "<section><h3>{position}. {}</h3>",
        escape_html(kind.heading())
    );
    match result {
        Ok(figure) => {
            let id = format!("chart-{}", kind.slug());
            html.push_str(&format!("<div id=\"{id}\" class=\"chart\"></div>"));
            html.push_str(&format!(
                "<script>(function(){{var f={};Plotly.newPlot(\"{id}\",f.data,f.layout,{{responsive:true}});}})();</script>",
                script_json(&figure.to_plotly())
            ));
        }
        Err(warning) => html.push_str(&Notice::from(warning).render()),
    }
    html.push_str("</section>");
    html
}

/// JSON safe to inline inside a `<script>` element.
fn script_json(value: &Value) -> String {
    value.to_string().replace("</", "<\\/")
}

pub fn error_page(heading: &str, message: &str) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>{0}</title><style>{STYLE}</style></head><body><main><h1>{0}</h1>{1}<p><a href=\"/\">Back to the dashboard</a></p></main></body></html>",
        escape_html(heading),
        Notice::error(message).render()
    )
}
