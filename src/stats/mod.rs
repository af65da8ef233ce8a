//! Stats module - Dashboard aggregations

mod aggregations;
pub mod states;

pub use aggregations::{
    average_margin, profit_margin, AggregateError, Aggregates, DiscountPoint, GroupTotal, Kpis,
    MarginPoint, RegionTotals, SalesAggregator, StateSales, TrendPoint, TOP_PRODUCT_COUNT,
    TOP_SUB_CATEGORY_COUNT,
};
