//! Superstore Dashboard Main Application
//! Main window with the filter panel and the tabbed chart viewer.

use crate::config::DisplayConfig;
use crate::data::{columns, Dataset, FilterOptions, FilterSelection, FilteredView};
use crate::document::{DocumentError, HelpDocument};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::stats::{AggregateError, Aggregates};
use egui::SidePanel;
use polars::prelude::PolarsError;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Filter failed: {0}")]
    Filter(#[from] PolarsError),
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

/// Main application window.
pub struct DashboardApp {
    dataset: Arc<Dataset>,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
    aggregates: Aggregates,
    document: Option<HelpDocument>,
}

impl DashboardApp {
    /// Build the window state and compute the unfiltered aggregates.
    /// A missing help document only disables the download button.
    pub fn new(
        dataset: Arc<Dataset>,
        display: DisplayConfig,
        document: Result<HelpDocument, DocumentError>,
    ) -> Result<Self, DashboardError> {
        let aggregates = Self::compute(&dataset, &FilterSelection::default())?;

        let (document, download) = match document {
            Ok(doc) => {
                let label = format!("{} ({})", doc.label, doc.file_name);
                (Some(doc), Ok(label))
            }
            Err(e) => (None, Err(e.to_string())),
        };

        let control_panel = ControlPanel::new(
            FilterOptions::from_dataset(&dataset),
            display.contact_email.clone(),
            download,
        );
        let chart_viewer = ChartViewer::new(
            display.currency_symbol,
            dataset.distinct_values(columns::CATEGORY),
        );

        Ok(Self {
            dataset,
            control_panel,
            chart_viewer,
            aggregates,
            document,
        })
    }

    fn compute(dataset: &Dataset, selection: &FilterSelection) -> Result<Aggregates, DashboardError> {
        let view = FilteredView::apply(dataset, selection)?;
        Ok(Aggregates::compute(&view)?)
    }

    pub fn aggregates(&self) -> &Aggregates {
        &self.aggregates
    }

    /// Recompute the aggregates once for a new selection.
    /// On failure the previous charts stay on screen.
    pub fn apply_selection(&mut self, selection: FilterSelection) {
        tracing::info!(
            region = %selection.region,
            category = %selection.category,
            "Filter changed"
        );
        self.control_panel.selection = selection.clone();

        match Self::compute(&self.dataset, &selection) {
            Ok(aggregates) => {
                self.control_panel
                    .set_status(format!("Showing {} rows", aggregates.row_count));
                self.aggregates = aggregates;
            }
            Err(e) => {
                tracing::error!("Failed to recompute dashboard: {}", e);
                self.control_panel.set_status(format!("Error: {}", e));
            }
        }
    }

    /// Save the help document via a native dialog and open it.
    fn handle_download(&mut self) {
        let Some(doc) = &self.document else {
            return;
        };

        let dest = match rfd::FileDialog::new()
            .add_filter("Word Document", &["docx"])
            .set_file_name(&doc.file_name)
            .save_file()
        {
            Some(path) => path,
            None => return, // User cancelled
        };

        match doc.save_to(&dest) {
            Ok(()) => {
                self.control_panel
                    .set_status(format!("Saved {}", dest.display()));
                if let Err(e) = open::that(&dest) {
                    tracing::warn!("Could not open {}: {}", dest.display(), e);
                }
            }
            Err(e) => {
                tracing::error!("{}", e);
                self.control_panel.set_status(format!("Error: {}", e));
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::SelectionChanged => {
                            let selection = self.control_panel.selection.clone();
                            self.apply_selection(selection);
                        }
                        ControlPanelAction::DownloadDocument => self.handle_download(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Dashboard
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui, &self.aggregates);
        });
    }
}
