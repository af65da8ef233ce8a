//! Superstore Sales Dashboard - interactive sales KPIs and charts
//!
//! Opens the desktop dashboard, or with `--export` writes the aggregates of
//! one filter selection as JSON and exits.

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;
use std::path::PathBuf;
use std::sync::Arc;
use superstore_dashboard::config::Config;
use superstore_dashboard::data::{DatasetLoader, FilterSelection, Selection};
use superstore_dashboard::document::HelpDocument;
use superstore_dashboard::export;
use superstore_dashboard::gui::DashboardApp;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Superstore Sales Dashboard.
#[derive(Parser, Debug)]
#[command(name = "superstore-dashboard", about = "Superstore sales KPIs and charts")]
struct Args {
    /// Configuration file (defaults to config.toml in the working directory
    /// or next to the executable).
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Write the aggregates as JSON to this file and exit instead of
    /// opening the window.
    #[arg(long = "export")]
    export: Option<PathBuf>,

    /// Region to export ("All" for every region).
    #[arg(long = "region", requires = "export")]
    region: Option<String>,

    /// Category to export ("All" for every category).
    #[arg(long = "category", requires = "export")]
    category: Option<String>,
}

impl Args {
    fn selection(&self) -> FilterSelection {
        let pick = |value: &Option<String>| {
            value
                .as_deref()
                .map(Selection::parse)
                .unwrap_or_default()
        };
        FilterSelection::new(pick(&self.region), pick(&self.category))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;

    // The dataset is required: no dashboard without it.
    let loader = DatasetLoader::new(config.dataset.clone());
    let dataset = loader.load().context("Failed to load dataset")?;

    if let Some(path) = &args.export {
        export::export_to_file(&dataset, &args.selection(), path)
            .with_context(|| format!("Failed to export to {}", path.display()))?;
        return Ok(());
    }

    let document = HelpDocument::load(&config.help_document);
    if let Err(e) = &document {
        tracing::warn!("Download disabled: {}", e);
    }

    let app = DashboardApp::new(Arc::clone(&dataset), config.display.clone(), document)
        .context("Failed to compute dashboard")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("Superstore Sales Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "Superstore Sales Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("GUI error: {e}"))
}
