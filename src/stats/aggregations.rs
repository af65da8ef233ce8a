//! Aggregation Module
//! Derives every KPI and chart table of the dashboard from a filtered view.
//!
//! All functions are pure: they read the filtered rows and return owned,
//! serializable tables. Nothing is cached between calls.

use crate::data::columns::*;
use crate::data::loader::epoch_days_to_date;
use crate::data::{FilterSelection, FilteredView};
use crate::stats::states::state_code;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use thiserror::Error;

/// Rows in each product ranking.
pub const TOP_PRODUCT_COUNT: usize = 10;
/// Rows in the sub-category ranking.
pub const TOP_SUB_CATEGORY_COUNT: usize = 5;

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// The five headline metrics of the Overview tab.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Kpis {
    pub total_sales: f64,
    pub total_profit: f64,
    pub total_orders: usize,
    pub avg_discount: f64,
    /// Mean Sales per row, not per distinct order.
    pub avg_sales_per_order: f64,
}

/// One (key, summed value) row of a grouped table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub key: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscountPoint {
    pub discount: f64,
    pub profit: f64,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionTotals {
    pub region: String,
    pub sales: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSales {
    pub state: String,
    pub code: &'static str,
    pub sales: f64,
}

/// Row-level profit margin; `margin` is NaN when the row has zero sales.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarginPoint {
    pub sales: f64,
    pub profit: f64,
    pub margin: f64,
    pub category: String,
}

impl MarginPoint {
    pub fn is_defined(&self) -> bool {
        !self.margin.is_nan()
    }
}

/// Everything the dashboard shows for one filter selection.
#[derive(Debug, Clone, Serialize)]
pub struct Aggregates {
    pub selection: FilterSelection,
    pub row_count: usize,
    pub kpis: Kpis,
    pub sales_trend: Vec<TrendPoint>,
    pub discount_vs_profit: Vec<DiscountPoint>,
    pub region_totals: Vec<RegionTotals>,
    pub state_sales: Vec<StateSales>,
    pub category_sales: Vec<GroupTotal>,
    pub top_products: Vec<GroupTotal>,
    pub bottom_products: Vec<GroupTotal>,
    pub ship_mode_sales: Vec<GroupTotal>,
    pub top_sub_categories: Vec<GroupTotal>,
    pub profit_margins: Vec<MarginPoint>,
}

impl Aggregates {
    /// Run every aggregation over the view.
    pub fn compute(view: &FilteredView) -> Result<Self, AggregateError> {
        let aggregates = Self {
            selection: view.selection().clone(),
            row_count: view.row_count(),
            kpis: SalesAggregator::kpis(view)?,
            sales_trend: SalesAggregator::sales_trend(view)?,
            discount_vs_profit: SalesAggregator::discount_vs_profit(view)?,
            region_totals: SalesAggregator::region_totals(view)?,
            state_sales: SalesAggregator::state_sales(view)?,
            category_sales: SalesAggregator::category_sales(view)?,
            top_products: SalesAggregator::top_products(view)?,
            bottom_products: SalesAggregator::bottom_products(view)?,
            ship_mode_sales: SalesAggregator::ship_mode_sales(view)?,
            top_sub_categories: SalesAggregator::top_sub_categories(view)?,
            profit_margins: SalesAggregator::profit_margins(view)?,
        };

        tracing::debug!(
            rows = aggregates.row_count,
            trend_points = aggregates.sales_trend.len(),
            states = aggregates.state_sales.len(),
            "Computed aggregates"
        );

        Ok(aggregates)
    }

    /// Mean margin over rows with a defined margin.
    pub fn average_margin(&self) -> f64 {
        average_margin(&self.profit_margins)
    }
}

/// Profit / Sales, or NaN when there were no sales.
pub fn profit_margin(profit: f64, sales: f64) -> f64 {
    if sales == 0.0 {
        f64::NAN
    } else {
        profit / sales
    }
}

/// Mean of the defined margins; 0 when none are defined.
pub fn average_margin(points: &[MarginPoint]) -> f64 {
    let defined: Vec<f64> = points
        .iter()
        .filter(|p| p.is_defined())
        .map(|p| p.margin)
        .collect();
    if defined.is_empty() {
        0.0
    } else {
        defined.iter().sum::<f64>() / defined.len() as f64
    }
}

/// Computes the dashboard tables from a filtered view.
pub struct SalesAggregator;

impl SalesAggregator {
    pub fn kpis(view: &FilteredView) -> Result<Kpis, AggregateError> {
        let df = view.dataframe();
        let sales = df.column(SALES)?.f64()?;
        let profit = df.column(PROFIT)?.f64()?;
        let discount = df.column(DISCOUNT)?.f64()?;

        let total_orders = if df.height() == 0 {
            0
        } else {
            df.column(ORDER_ID)?
                .as_materialized_series()
                .drop_nulls()
                .n_unique()?
        };

        Ok(Kpis {
            total_sales: sales.sum().unwrap_or(0.0),
            total_profit: profit.sum().unwrap_or(0.0),
            total_orders,
            avg_discount: discount.mean().unwrap_or(0.0),
            avg_sales_per_order: sales.mean().unwrap_or(0.0),
        })
    }

    /// Daily sales, oldest date first.
    pub fn sales_trend(view: &FilteredView) -> Result<Vec<TrendPoint>, AggregateError> {
        let daily = view
            .dataframe()
            .clone()
            .lazy()
            .group_by([col(ORDER_DATE)])
            .agg([col(SALES).sum()])
            .sort([ORDER_DATE], SortMultipleOptions::default())
            .collect()?;

        let days = daily.column(ORDER_DATE)?.cast(&DataType::Int32)?;
        let sales = daily.column(SALES)?.f64()?;

        Ok(days
            .i32()?
            .into_iter()
            .zip(sales.into_iter())
            .filter_map(|(day, sales)| {
                Some(TrendPoint {
                    date: epoch_days_to_date(day?)?,
                    sales: sales.unwrap_or(0.0),
                })
            })
            .collect())
    }

    /// Unaggregated (Discount, Profit, Category) triples.
    pub fn discount_vs_profit(view: &FilteredView) -> Result<Vec<DiscountPoint>, AggregateError> {
        let df = view.dataframe();
        let discount = df.column(DISCOUNT)?.f64()?;
        let profit = df.column(PROFIT)?.f64()?;
        let category = df.column(CATEGORY)?.str()?;

        Ok(discount
            .into_iter()
            .zip(profit.into_iter())
            .zip(category.into_iter())
            .filter_map(|((d, p), c)| {
                Some(DiscountPoint {
                    discount: d?,
                    profit: p?,
                    category: c?.to_string(),
                })
            })
            .collect())
    }

    pub fn region_totals(view: &FilteredView) -> Result<Vec<RegionTotals>, AggregateError> {
        let grouped = view
            .dataframe()
            .clone()
            .lazy()
            .group_by([col(REGION)])
            .agg([col(SALES).sum(), col(PROFIT).sum()])
            .sort([REGION], SortMultipleOptions::default())
            .collect()?;

        let region = grouped.column(REGION)?.str()?;
        let sales = grouped.column(SALES)?.f64()?;
        let profit = grouped.column(PROFIT)?.f64()?;

        Ok(region
            .into_iter()
            .zip(sales.into_iter())
            .zip(profit.into_iter())
            .filter_map(|((r, s), p)| {
                Some(RegionTotals {
                    region: r?.to_string(),
                    sales: s.unwrap_or(0.0),
                    profit: p.unwrap_or(0.0),
                })
            })
            .collect())
    }

    /// Sales per state code; states without a code are dropped.
    pub fn state_sales(view: &FilteredView) -> Result<Vec<StateSales>, AggregateError> {
        let mut states: Vec<StateSales> = Self::grouped_sum(view, STATE, SALES)?
            .into_iter()
            .filter_map(|total| {
                let code = state_code(&total.key)?;
                Some(StateSales {
                    state: total.key,
                    code,
                    sales: total.value,
                })
            })
            .collect();
        states.sort_by(|a, b| a.code.cmp(b.code));
        Ok(states)
    }

    pub fn category_sales(view: &FilteredView) -> Result<Vec<GroupTotal>, AggregateError> {
        Self::grouped_sum(view, CATEGORY, SALES)
    }

    pub fn ship_mode_sales(view: &FilteredView) -> Result<Vec<GroupTotal>, AggregateError> {
        Self::grouped_sum(view, SHIP_MODE, SALES)
    }

    /// The ten products with the highest summed profit.
    pub fn top_products(view: &FilteredView) -> Result<Vec<GroupTotal>, AggregateError> {
        Self::ranked_sum(view, PRODUCT_NAME, PROFIT, true, TOP_PRODUCT_COUNT)
    }

    /// The ten products with the lowest summed profit.
    pub fn bottom_products(view: &FilteredView) -> Result<Vec<GroupTotal>, AggregateError> {
        Self::ranked_sum(view, PRODUCT_NAME, PROFIT, false, TOP_PRODUCT_COUNT)
    }

    pub fn top_sub_categories(view: &FilteredView) -> Result<Vec<GroupTotal>, AggregateError> {
        Self::ranked_sum(view, SUB_CATEGORY, SALES, true, TOP_SUB_CATEGORY_COUNT)
    }

    pub fn profit_margins(view: &FilteredView) -> Result<Vec<MarginPoint>, AggregateError> {
        let df = view.dataframe();
        let sales = df.column(SALES)?.f64()?;
        let profit = df.column(PROFIT)?.f64()?;
        let category = df.column(CATEGORY)?.str()?;

        Ok(sales
            .into_iter()
            .zip(profit.into_iter())
            .zip(category.into_iter())
            .filter_map(|((s, p), c)| {
                let (sales, profit) = (s?, p?);
                Some(MarginPoint {
                    sales,
                    profit,
                    margin: profit_margin(profit, sales),
                    category: c?.to_string(),
                })
            })
            .collect())
    }

    /// Sum of `value` per distinct `key`, ordered by key.
    pub fn grouped_sum(
        view: &FilteredView,
        key: &str,
        value: &str,
    ) -> Result<Vec<GroupTotal>, AggregateError> {
        let grouped = view
            .dataframe()
            .clone()
            .lazy()
            .group_by([col(key)])
            .agg([col(value).sum()])
            .sort([key], SortMultipleOptions::default())
            .collect()?;

        Self::collect_totals(&grouped, key, value)
    }

    /// Sum of `value` per `key`, sorted by the sum and cut to `limit` rows.
    ///
    /// Groups are formed in first-appearance order and the sort is stable, so
    /// equal sums keep the order in which their keys first appear.
    pub fn ranked_sum(
        view: &FilteredView,
        key: &str,
        value: &str,
        descending: bool,
        limit: usize,
    ) -> Result<Vec<GroupTotal>, AggregateError> {
        let ranked = view
            .dataframe()
            .clone()
            .lazy()
            .group_by_stable([col(key)])
            .agg([col(value).sum()])
            .sort(
                [value],
                SortMultipleOptions::default()
                    .with_order_descending(descending)
                    .with_maintain_order(true),
            )
            .limit(limit as IdxSize)
            .collect()?;

        Self::collect_totals(&ranked, key, value)
    }

    fn collect_totals(
        df: &DataFrame,
        key: &str,
        value: &str,
    ) -> Result<Vec<GroupTotal>, AggregateError> {
        let keys = df.column(key)?.str()?;
        let values = df.column(value)?.f64()?;

        Ok(keys
            .into_iter()
            .zip(values.into_iter())
            .filter_map(|(k, v)| {
                Some(GroupTotal {
                    key: k?.to_string(),
                    value: v.unwrap_or(0.0),
                })
            })
            .collect())
    }
}
