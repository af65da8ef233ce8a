//! Superstore Sales Dashboard
//!
//! Loads the Superstore sales CSV once, filters it by Region and Category
//! and derives the KPIs and chart tables shown by the desktop dashboard.

pub mod charts;
pub mod config;
pub mod data;
pub mod document;
pub mod export;
pub mod gui;
pub mod stats;
