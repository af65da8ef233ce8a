//! Chart Viewer Widget
//! Central panel: title banner, tab bar and the charts of the active tab.

use crate::charts::format::{format_count, format_currency, format_percent};
use crate::charts::{ChartPlotter, PROFIT_COLOR, SALES_COLOR};
use crate::stats::{Aggregates, Kpis, TOP_PRODUCT_COUNT, TOP_SUB_CATEGORY_COUNT};
use egui::{Color32, RichText, ScrollArea};

const CARD_SPACING: f32 = 15.0;
const KPI_CARD_WIDTH: f32 = 190.0;
const ACCENT: Color32 = Color32::from_rgb(100, 149, 237);

/// Dashboard tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    Trends,
    Regional,
    Products,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Overview, Tab::Trends, Tab::Regional, Tab::Products];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Overview => "📈 Overview",
            Tab::Trends => "📉 Trends",
            Tab::Regional => "🗺 Regional Insights",
            Tab::Products => "📦 Product Insights",
        }
    }
}

/// One headline number on the Overview tab.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiCard {
    pub title: &'static str,
    pub value: String,
}

/// Format the five KPIs for display.
pub fn kpi_cards(kpis: &Kpis, currency: &str) -> Vec<KpiCard> {
    vec![
        KpiCard {
            title: "Total Sales",
            value: format_currency(kpis.total_sales, currency),
        },
        KpiCard {
            title: "Total Profit",
            value: format_currency(kpis.total_profit, currency),
        },
        KpiCard {
            title: "Total Orders",
            value: format_count(kpis.total_orders),
        },
        KpiCard {
            title: "Avg. Discount",
            value: format_percent(kpis.avg_discount),
        },
        KpiCard {
            title: "Avg. Sales/Order",
            value: format_currency(kpis.avg_sales_per_order, currency),
        },
    ]
}

/// Card titles of the most and least profitable product rankings.
pub fn product_ranking_titles() -> (String, String) {
    (
        format!("Top {TOP_PRODUCT_COUNT} Most Profitable Products"),
        format!("Bottom {TOP_PRODUCT_COUNT} Least Profitable Products"),
    )
}

/// Scrollable dashboard area.
pub struct ChartViewer {
    pub active_tab: Tab,
    currency: String,
    /// Category names in dataset order, for stable scatter colors.
    categories: Vec<String>,
}

impl ChartViewer {
    pub fn new(currency: String, categories: Vec<String>) -> Self {
        Self {
            active_tab: Tab::default(),
            currency,
            categories,
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, aggregates: &Aggregates) {
        Self::draw_banner(ui, aggregates);
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            for tab in Tab::ALL {
                ui.selectable_value(&mut self.active_tab, tab, RichText::new(tab.title()).size(15.0));
                ui.add_space(6.0);
            }
        });
        ui.separator();

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| match self.active_tab {
                Tab::Overview => self.show_overview(ui, aggregates),
                Tab::Trends => self.show_trends(ui, aggregates),
                Tab::Regional => self.show_regional(ui, aggregates),
                Tab::Products => self.show_products(ui, aggregates),
            });
    }

    fn draw_banner(ui: &mut egui::Ui, aggregates: &Aggregates) {
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("Superstore Sales Dashboard")
                    .size(26.0)
                    .strong()
                    .color(ACCENT),
            );
            ui.label(
                RichText::new(
                    "Welcome! Explore sales, profit and discount patterns across regions, \
                     categories and products.",
                )
                .size(13.0)
                .color(Color32::GRAY),
            );
            ui.label(
                RichText::new(format!(
                    "Region: {}   Category: {}   Rows: {}",
                    aggregates.selection.region,
                    aggregates.selection.category,
                    format_count(aggregates.row_count)
                ))
                .size(11.0)
                .color(Color32::GRAY),
            );
        });
    }

    /// Bordered card with a title.
    fn card(ui: &mut egui::Ui, title: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(2.0, ACCENT))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new(title).size(16.0).strong());
                ui.add_space(6.0);
                add_contents(ui);
            });
        ui.add_space(CARD_SPACING);
    }

    fn show_overview(&self, ui: &mut egui::Ui, aggregates: &Aggregates) {
        ui.add_space(10.0);
        ui.horizontal_wrapped(|ui| {
            for card in kpi_cards(&aggregates.kpis, &self.currency) {
                egui::Frame::none()
                    .rounding(8.0)
                    .stroke(egui::Stroke::new(2.0, ACCENT))
                    .fill(ui.visuals().widgets.noninteractive.bg_fill)
                    .inner_margin(12.0)
                    .show(ui, |ui| {
                        ui.set_width(KPI_CARD_WIDTH);
                        ui.vertical_centered(|ui| {
                            ui.label(RichText::new(card.title).size(13.0).color(Color32::GRAY));
                            ui.label(RichText::new(card.value).size(22.0).strong());
                        });
                    });
                ui.add_space(CARD_SPACING);
            }
        });

        if aggregates.row_count == 0 {
            ui.add_space(10.0);
            ui.label(
                RichText::new("No rows match the current filters.")
                    .italics()
                    .color(Color32::GRAY),
            );
        }
    }

    fn show_trends(&self, ui: &mut egui::Ui, aggregates: &Aggregates) {
        Self::card(ui, "Sales Trend Over Time", |ui| {
            ChartPlotter::draw_sales_trend(ui, &aggregates.sales_trend, &self.currency);
        });
        Self::card(ui, "Discount vs Profit", |ui| {
            ChartPlotter::draw_discount_scatter(ui, &aggregates.discount_vs_profit, &self.categories);
        });
    }

    fn show_regional(&self, ui: &mut egui::Ui, aggregates: &Aggregates) {
        Self::card(ui, "Sales and Profit by Region", |ui| {
            ChartPlotter::draw_region_bars(ui, &aggregates.region_totals, &self.currency);
        });
        Self::card(ui, "Sales by State", |ui| {
            ChartPlotter::draw_state_table(ui, &aggregates.state_sales, &self.currency);
        });
    }

    fn show_products(&self, ui: &mut egui::Ui, aggregates: &Aggregates) {
        Self::card(ui, "Sales by Category", |ui| {
            ChartPlotter::draw_pie(ui, &aggregates.category_sales, &self.currency);
        });
        Self::card(
            ui,
            &product_ranking_titles().0,
            |ui| {
                ChartPlotter::draw_ranked_bars(
                    ui,
                    "top_products",
                    &aggregates.top_products,
                    "Profit",
                    PROFIT_COLOR,
                );
            },
        );
        Self::card(
            ui,
            &product_ranking_titles().1,
            |ui| {
                ChartPlotter::draw_ranked_bars(
                    ui,
                    "bottom_products",
                    &aggregates.bottom_products,
                    "Profit",
                    PROFIT_COLOR,
                );
            },
        );
        Self::card(ui, "Sales by Ship Mode", |ui| {
            ChartPlotter::draw_pie(ui, &aggregates.ship_mode_sales, &self.currency);
        });
        Self::card(
            ui,
            &format!("Top {TOP_SUB_CATEGORY_COUNT} Sub-Categories by Sales"),
            |ui| {
                ChartPlotter::draw_ranked_bars(
                    ui,
                    "top_sub_categories",
                    &aggregates.top_sub_categories,
                    "Sales",
                    SALES_COLOR,
                );
            },
        );
        Self::card(ui, "Sales vs Profit Margin", |ui| {
            ui.label(
                RichText::new(format!(
                    "Average margin: {}",
                    format_percent(aggregates.average_margin())
                ))
                .size(12.0)
                .color(Color32::GRAY),
            );
            ChartPlotter::draw_margin_scatter(ui, &aggregates.profit_margins, &self.categories);
        });
    }
}
