//! Data module - CSV loading and filtering

mod filter;
pub mod loader;

#[cfg(test)]
pub(crate) mod fixtures;

pub use filter::{FilterOptions, FilterSelection, FilteredView, Selection, ALL_LABEL};
pub use loader::{columns, Dataset, DatasetLoader, LoaderError, ParseError};
