//! Control Panel Widget
//! Left side panel with the filter dropdowns, help box and document download.

use crate::data::{FilterOptions, FilterSelection, Selection};
use egui::{Color32, ComboBox, RichText};

/// Left side control panel.
pub struct ControlPanel {
    pub options: FilterOptions,
    pub selection: FilterSelection,
    pub contact_email: Option<String>,
    /// Label of the help document, or why it cannot be downloaded.
    pub download: Result<String, String>,
    pub status: String,
}

impl ControlPanel {
    pub fn new(
        options: FilterOptions,
        contact_email: Option<String>,
        download: Result<String, String>,
    ) -> Self {
        Self {
            options,
            selection: FilterSelection::default(),
            contact_email,
            download,
            status: "Ready".to_string(),
        }
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 Filter Options")
                    .size(20.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        let label_width = 80.0;
        let combo_width = 170.0;

        if Self::dropdown(
            ui,
            "region_filter",
            "Region:",
            [label_width, combo_width],
            &self.options.regions,
            &mut self.selection.region,
        ) {
            action = ControlPanelAction::SelectionChanged;
        }

        ui.add_space(5.0);

        if Self::dropdown(
            ui,
            "category_filter",
            "Category:",
            [label_width, combo_width],
            &self.options.categories,
            &mut self.selection.category,
        ) {
            action = ControlPanelAction::SelectionChanged;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Help Section =====
        ui.label(RichText::new("❓ Need Help?").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.label(
                    RichText::new(
                        "Use the dropdowns above to focus every chart on one region \
                         or product category.",
                    )
                    .size(12.0),
                );
                if let Some(email) = &self.contact_email {
                    ui.add_space(4.0);
                    ui.horizontal_wrapped(|ui| {
                        ui.label(RichText::new("Questions:").size(12.0));
                        ui.hyperlink_to(email, format!("mailto:{email}"));
                    });
                }
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Download Section =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.download.is_ok(), |ui| {
                let button =
                    egui::Button::new(RichText::new("📄 Download Documentation").size(14.0))
                        .min_size(egui::vec2(200.0, 32.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::DownloadDocument;
                }
            });

            ui.add_space(5.0);
            match &self.download {
                Ok(label) => {
                    ui.label(RichText::new(label).size(11.0).color(Color32::GRAY));
                }
                Err(reason) => {
                    ui.label(
                        RichText::new(format!("Unavailable: {reason}"))
                            .size(11.0)
                            .color(Color32::from_rgb(220, 53, 69)),
                    );
                }
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(5.0);

        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Labelled combo box; returns true when the value changed.
    fn dropdown(
        ui: &mut egui::Ui,
        id: &str,
        label: &str,
        [label_width, combo_width]: [f32; 2],
        options: &[Selection],
        current: &mut Selection,
    ) -> bool {
        let mut changed = false;
        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new(label));
            ComboBox::from_id_salt(id)
                .width(combo_width)
                .selected_text(current.label())
                .show_ui(ui, |ui| {
                    for option in options {
                        if ui
                            .selectable_value(current, option.clone(), option.label())
                            .changed()
                        {
                            changed = true;
                        }
                    }
                });
        });
        changed
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    SelectionChanged,
    DownloadDocument,
}
