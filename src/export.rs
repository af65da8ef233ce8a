//! JSON export of the dashboard aggregates for one filter selection.

use crate::data::{Dataset, FilterSelection, FilteredView};
use crate::stats::{AggregateError, Aggregates};
use polars::prelude::PolarsError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Filter failed: {0}")]
    Filter(#[from] PolarsError),
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Filter, aggregate and return the pretty-printed JSON document.
pub fn aggregates_json(
    dataset: &Dataset,
    selection: &FilterSelection,
) -> Result<String, ExportError> {
    let view = FilteredView::apply(dataset, selection)?;
    let aggregates = Aggregates::compute(&view)?;
    Ok(serde_json::to_string_pretty(&aggregates)?)
}

/// Write the aggregates of `selection` to `path`.
pub fn export_to_file(
    dataset: &Dataset,
    selection: &FilterSelection,
    path: &Path,
) -> Result<(), ExportError> {
    let json = aggregates_json(dataset, selection)?;
    let io_err = |source: std::io::Error| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(json.as_bytes()).map_err(io_err)?;
    writer.flush().map_err(io_err)?;

    tracing::info!(
        region = %selection.region,
        category = %selection.category,
        "Exported aggregates to {}",
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::sample_dataset;
    use crate::data::Selection;

    #[test]
    fn test_export_writes_named_tables() {
        let ds = sample_dataset();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("west.json");
        let selection = FilterSelection::new(Selection::Only("West".into()), Selection::All);

        export_to_file(&ds, &selection, &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["selection"]["region"], "West");
        assert_eq!(value["row_count"], 3);
        for table in [
            "sales_trend",
            "discount_vs_profit",
            "region_totals",
            "state_sales",
            "category_sales",
            "top_products",
            "bottom_products",
            "ship_mode_sales",
            "top_sub_categories",
            "profit_margins",
        ] {
            assert!(value[table].is_array(), "{table} missing");
        }
        assert_eq!(value["state_sales"][0]["code"], "CA");
    }

    #[test]
    fn test_export_to_bad_path_is_io_error() {
        let ds = sample_dataset();
        let err = export_to_file(
            &ds,
            &FilterSelection::default(),
            Path::new("/no/such/dir/out.json"),
        )
        .unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }
}
