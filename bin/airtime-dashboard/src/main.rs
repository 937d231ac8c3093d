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
// Bootstrap only; handlers and rendering live in the library.
use airtime::{export_view, FilterOptions};
use airtime_dashboard::cli::{Cli, Command, ExportArgs};
use airtime_dashboard::{build_router, AppState, DashboardConfig};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();
    let cli = Cli::parse();
    let mut config = DashboardConfig::load(cli.config.as_deref()).context("loading configuration")?;
    cli.apply_overrides(&mut config);

    let state = AppState::new(config);
    if let Err(e) = state.table() {
        error!(error = %e, "failed to load dataset");
        return Err(e.into());
    }
    match cli.cmd.unwrap_or(Command::Serve) {
        Command::Serve => serve(state).await,
        Command::Export(args) => export(&state, &args),
    }
}

async fn serve(state: AppState) -> Result<()> {
    let bind = state.config.bind.clone();
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("binding {bind}"))?;
    info!(address = %listener.local_addr()?, "airtime dashboard listening");
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

fn export(state: &AppState, args: &ExportArgs) -> Result<()> {
    let table = state.table()?;
    let criteria = args.criteria(&FilterOptions::observed(&table));
    let view = criteria.apply(&table);
    let target = args
        .output
        .clone()
        .unwrap_or_else(|| state.config.export_path.clone());
    let rows = export_view(&table, &view, &target)?;
    println!("Exported {rows} rows to {}", target.display());
    Ok(())
}
