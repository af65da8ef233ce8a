//! Chart Plotter Module
//! Draws the dashboard charts with egui_plot and the egui painter.

use crate::charts::format::{format_compact, format_currency, format_percent, truncate_label};
use crate::data::loader::{date_to_epoch_days, epoch_days_to_date};
use crate::stats::{DiscountPoint, GroupTotal, MarginPoint, RegionTotals, StateSales, TrendPoint};
use egui::{Color32, RichText, Stroke, Vec2};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};
use std::f32::consts::{FRAC_PI_2, TAU};

pub const SALES_COLOR: Color32 = Color32::from_rgb(31, 119, 180); // Blue
pub const PROFIT_COLOR: Color32 = Color32::from_rgb(44, 160, 44); // Green
pub const LOSS_COLOR: Color32 = Color32::from_rgb(214, 39, 40); // Red

pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(99, 110, 250),  // Indigo
    Color32::from_rgb(239, 85, 59),   // Vermilion
    Color32::from_rgb(0, 204, 150),   // Teal
    Color32::from_rgb(171, 99, 250),  // Purple
    Color32::from_rgb(255, 161, 90),  // Orange
    Color32::from_rgb(25, 211, 243),  // Cyan
    Color32::from_rgb(255, 102, 146), // Pink
    Color32::from_rgb(182, 232, 128), // Lime
    Color32::from_rgb(255, 151, 255), // Magenta
    Color32::from_rgb(254, 203, 82),  // Yellow
];

/// Viridis stops, dark to bright.
const VIRIDIS: [(u8, u8, u8); 5] = [
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

const PLOT_HEIGHT: f32 = 320.0;
const PIE_DIAMETER: f32 = 240.0;
const BAR_LABEL_CHARS: usize = 28;

/// Creates the dashboard charts.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Stable color for a category, by its position in `categories`.
    pub fn category_color(category: &str, categories: &[String]) -> Color32 {
        let idx = categories
            .iter()
            .position(|c| c == category)
            .unwrap_or(0);
        PALETTE[idx % PALETTE.len()]
    }

    /// Interpolate the viridis scale at `t` in [0, 1].
    pub fn viridis(t: f64) -> Color32 {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let scaled = t * (VIRIDIS.len() - 1) as f64;
        let lower = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
        let frac = scaled - lower as f64;
        let (r0, g0, b0) = VIRIDIS[lower];
        let (r1, g1, b1) = VIRIDIS[lower + 1];
        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
        Color32::from_rgb(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
    }

    fn no_data(ui: &mut egui::Ui) {
        ui.label(
            RichText::new("No data for the current filters")
                .italics()
                .color(Color32::GRAY),
        );
    }

    /// Sales summed per Order Date as a line over time.
    pub fn draw_sales_trend(ui: &mut egui::Ui, trend: &[TrendPoint], currency: &str) {
        let points: Vec<[f64; 2]> = trend
            .iter()
            .map(|p| {
                let days = date_to_epoch_days(p.date);
                [days as f64, p.sales]
            })
            .collect();
        let currency = currency.to_string();

        Plot::new("sales_trend")
            .height(PLOT_HEIGHT)
            .allow_scroll(false)
            .x_axis_label("Date")
            .y_axis_label(format!("Sales ({currency})"))
            .x_axis_formatter(|mark, _range| {
                epoch_days_to_date(mark.value.round() as i32)
                    .map(|d| d.format("%Y-%m").to_string())
                    .unwrap_or_default()
            })
            .y_axis_formatter(|mark, _range| format_compact(mark.value))
            .label_formatter(move |_name, value| {
                let date = epoch_days_to_date(value.x.round() as i32)
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                format!("{date}\n{}", format_currency(value.y, &currency))
            })
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(PlotPoints::from(points))
                        .color(SALES_COLOR)
                        .width(1.5)
                        .name("Sales"),
                );
            });
    }

    /// Row-level discount against profit, one series per category.
    pub fn draw_discount_scatter(
        ui: &mut egui::Ui,
        points: &[DiscountPoint],
        categories: &[String],
    ) {
        Plot::new("discount_scatter")
            .height(PLOT_HEIGHT)
            .allow_scroll(false)
            .legend(Legend::default())
            .x_axis_label("Discount (%)")
            .y_axis_label("Profit")
            .x_axis_formatter(|mark, _range| format!("{:.0}%", mark.value * 100.0))
            .show(ui, |plot_ui| {
                for category in categories {
                    let series: Vec<[f64; 2]> = points
                        .iter()
                        .filter(|p| &p.category == category)
                        .map(|p| [p.discount, p.profit])
                        .collect();
                    if series.is_empty() {
                        continue;
                    }
                    plot_ui.points(
                        Points::new(series)
                            .radius(3.0)
                            .color(Self::category_color(category, categories).gamma_multiply(0.8))
                            .name(category),
                    );
                }
            });
    }

    /// Grouped Sales/Profit bars per region.
    pub fn draw_region_bars(ui: &mut egui::Ui, regions: &[RegionTotals], currency: &str) {
        let labels: Vec<String> = regions.iter().map(|r| r.region.clone()).collect();

        let sales_bars: Vec<Bar> = regions
            .iter()
            .enumerate()
            .map(|(i, r)| {
                Bar::new(i as f64 - 0.2, r.sales)
                    .width(0.38)
                    .name(format!("{} sales", r.region))
            })
            .collect();
        let profit_bars: Vec<Bar> = regions
            .iter()
            .enumerate()
            .map(|(i, r)| {
                Bar::new(i as f64 + 0.2, r.profit)
                    .width(0.38)
                    .name(format!("{} profit", r.region))
            })
            .collect();

        Plot::new("region_bars")
            .height(PLOT_HEIGHT)
            .allow_scroll(false)
            .allow_drag(false)
            .legend(Legend::default())
            .x_axis_label("Region")
            .y_axis_label(format!("Amount ({currency})"))
            .x_axis_formatter(move |mark, _range| Self::category_tick(&labels, mark.value))
            .y_axis_formatter(|mark, _range| format_compact(mark.value))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(sales_bars).color(SALES_COLOR).name("Sales"));
                plot_ui.bar_chart(
                    BarChart::new(profit_bars)
                        .color(PROFIT_COLOR)
                        .name("Profit"),
                );
            });
    }

    /// Label for a categorical axis tick: only whole positions carry a name.
    fn category_tick(labels: &[String], value: f64) -> String {
        let rounded = value.round();
        if (value - rounded).abs() > 1e-6 || rounded < 0.0 {
            return String::new();
        }
        labels
            .get(rounded as usize)
            .map(|l| truncate_label(l, BAR_LABEL_CHARS))
            .unwrap_or_default()
    }

    /// Horizontal ranking bars, first entry on top.
    pub fn draw_ranked_bars(
        ui: &mut egui::Ui,
        id: &str,
        totals: &[GroupTotal],
        value_label: &str,
        color: Color32,
    ) {
        if totals.is_empty() {
            Self::no_data(ui);
            return;
        }

        let n = totals.len();
        // Row 0 is drawn at the top of the axis.
        let labels: Vec<String> = totals.iter().rev().map(|t| t.key.clone()).collect();
        let bars: Vec<Bar> = totals
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let fill = if t.value < 0.0 { LOSS_COLOR } else { color };
                Bar::new((n - 1 - i) as f64, t.value)
                    .width(0.7)
                    .name(&t.key)
                    .fill(fill)
            })
            .collect();

        Plot::new(id)
            .height((n as f32 * 28.0).max(140.0))
            .allow_scroll(false)
            .allow_drag(false)
            .allow_zoom(false)
            .x_axis_label(value_label)
            .x_axis_formatter(|mark, _range| format_compact(mark.value))
            .y_axis_formatter(move |mark, _range| Self::category_tick(&labels, mark.value))
            .y_axis_min_width(180.0)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).horizontal());
            });
    }

    /// Sales vs profit margin; point size follows |Profit|.
    /// Rows with an undefined margin are not plotted.
    pub fn draw_margin_scatter(ui: &mut egui::Ui, points: &[MarginPoint], categories: &[String]) {
        let max_abs_profit = points
            .iter()
            .filter(|p| p.is_defined())
            .map(|p| p.profit.abs())
            .fold(0.0_f64, f64::max);

        Plot::new("margin_scatter")
            .height(PLOT_HEIGHT)
            .allow_scroll(false)
            .legend(Legend::default())
            .x_axis_label("Sales")
            .y_axis_label("Profit Margin (%)")
            .x_axis_formatter(|mark, _range| format_compact(mark.value))
            .y_axis_formatter(|mark, _range| format!("{:.0}%", mark.value * 100.0))
            .show(ui, |plot_ui| {
                for category in categories {
                    let color = Self::category_color(category, categories).gamma_multiply(0.7);
                    // Three size classes keep one legend entry per category.
                    let mut buckets: [Vec<[f64; 2]>; 3] = Default::default();
                    for p in points
                        .iter()
                        .filter(|p| p.is_defined() && &p.category == category)
                    {
                        let share = if max_abs_profit > 0.0 {
                            p.profit.abs() / max_abs_profit
                        } else {
                            0.0
                        };
                        let bucket = ((share * 3.0) as usize).min(2);
                        buckets[bucket].push([p.sales, p.margin]);
                    }
                    for (size, series) in buckets.into_iter().enumerate() {
                        if series.is_empty() {
                            continue;
                        }
                        plot_ui.points(
                            Points::new(series)
                                .radius(2.5 + size as f32 * 2.5)
                                .color(color)
                                .name(category),
                        );
                    }
                }
            });
    }

    /// Pie chart with a legend of shares.
    pub fn draw_pie(ui: &mut egui::Ui, slices: &[GroupTotal], currency: &str) {
        let total: f64 = slices.iter().map(|s| s.value.max(0.0)).sum();
        if slices.is_empty() || total <= 0.0 {
            Self::no_data(ui);
            return;
        }

        ui.horizontal(|ui| {
            let (rect, _) =
                ui.allocate_exact_size(Vec2::splat(PIE_DIAMETER), egui::Sense::hover());
            let painter = ui.painter_at(rect);
            let center = rect.center();
            let radius = PIE_DIAMETER / 2.0 - 4.0;

            let mut start = -FRAC_PI_2;
            for (i, slice) in slices.iter().enumerate() {
                let sweep = (slice.value.max(0.0) / total) as f32 * TAU;
                let color = PALETTE[i % PALETTE.len()];
                let steps = ((sweep / TAU) * 120.0).ceil().max(1.0) as usize;
                for s in 0..steps {
                    let a0 = start + sweep * s as f32 / steps as f32;
                    let a1 = start + sweep * (s + 1) as f32 / steps as f32;
                    painter.add(egui::Shape::convex_polygon(
                        vec![
                            center,
                            center + radius * Vec2::angled(a0),
                            center + radius * Vec2::angled(a1),
                        ],
                        color,
                        Stroke::NONE,
                    ));
                }
                start += sweep;
            }

            ui.add_space(12.0);
            ui.vertical(|ui| {
                for (i, slice) in slices.iter().enumerate() {
                    ui.horizontal(|ui| {
                        let (swatch, _) =
                            ui.allocate_exact_size(Vec2::splat(14.0), egui::Sense::hover());
                        ui.painter()
                            .rect_filled(swatch, 3.0, PALETTE[i % PALETTE.len()]);
                        ui.label(RichText::new(&slice.key).size(13.0));
                        ui.label(
                            RichText::new(format!(
                                "{} ({})",
                                format_percent(slice.value.max(0.0) / total),
                                format_currency(slice.value, currency)
                            ))
                            .size(12.0)
                            .color(Color32::GRAY),
                        );
                    });
                }
            });
        });
    }

    /// State sales as a shaded table, highest sales first.
    pub fn draw_state_table(ui: &mut egui::Ui, states: &[StateSales], currency: &str) {
        if states.is_empty() {
            Self::no_data(ui);
            return;
        }

        let (min, max) = states.iter().fold((f64::MAX, f64::MIN), |(lo, hi), s| {
            (lo.min(s.sales), hi.max(s.sales))
        });
        let span = max - min;

        let mut ordered: Vec<&StateSales> = states.iter().collect();
        ordered.sort_by(|a, b| b.sales.total_cmp(&a.sales));

        egui::ScrollArea::vertical()
            .max_height(360.0)
            .id_salt("state_table_scroll")
            .show(ui, |ui| {
                egui::Grid::new("state_table")
                    .striped(true)
                    .min_col_width(60.0)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        ui.label(RichText::new("").strong());
                        ui.label(RichText::new("Code").strong());
                        ui.label(RichText::new("State").strong());
                        ui.label(RichText::new("Sales").strong());
                        ui.end_row();

                        for s in ordered {
                            let t = if span > 0.0 { (s.sales - min) / span } else { 1.0 };
                            let (swatch, _) = ui
                                .allocate_exact_size(Vec2::new(40.0, 14.0), egui::Sense::hover());
                            ui.painter().rect_filled(swatch, 2.0, Self::viridis(t));
                            ui.label(RichText::new(s.code).monospace());
                            ui.label(&s.state);
                            ui.label(format_currency(s.sales, currency));
                            ui.end_row();
                        }
                    });
            });
    }
}
