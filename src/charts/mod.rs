//! Charts module - Chart rendering

pub mod format;
mod plotter;

pub use plotter::{ChartPlotter, LOSS_COLOR, PALETTE, PROFIT_COLOR, SALES_COLOR};
