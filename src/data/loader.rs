//! Dataset Loader Module
//! Reads the sales CSV into a typed Polars DataFrame and caches it.

use crate::config::{ConfigError, DatasetConfig};
use chrono::{Datelike, NaiveDate};
use once_cell::sync::OnceCell;
use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Column names of the sales file.
pub mod columns {
    pub const ORDER_ID: &str = "Order ID";
    pub const ORDER_DATE: &str = "Order Date";
    pub const SHIP_MODE: &str = "Ship Mode";
    pub const STATE: &str = "State";
    pub const REGION: &str = "Region";
    pub const CATEGORY: &str = "Category";
    pub const SUB_CATEGORY: &str = "Sub-Category";
    pub const PRODUCT_NAME: &str = "Product Name";
    pub const SALES: &str = "Sales";
    pub const PROFIT: &str = "Profit";
    pub const DISCOUNT: &str = "Discount";
}

use columns::*;

/// Columns every dataset must carry.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    REGION,
    CATEGORY,
    ORDER_DATE,
    SALES,
    PROFIT,
    DISCOUNT,
    ORDER_ID,
    PRODUCT_NAME,
    STATE,
    SHIP_MODE,
    SUB_CATEGORY,
];

const NUMERIC_COLUMNS: [&str; 3] = [SALES, PROFIT, DISCOUNT];

/// Days between 0001-01-01 and 1970-01-01 (chrono's CE day count of the Unix epoch).
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Dataset file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to parse dataset: {0}")]
    Parse(#[from] ParseError),
}

/// Schema violations found while reading the file.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("CSV error: {0}")]
    Csv(#[from] PolarsError),
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("column '{column}' has {count} empty values")]
    MissingValues { column: &'static str, count: usize },
    #[error("row {row}: invalid Order Date '{value}' (expected format {format})")]
    InvalidDate {
        row: usize,
        value: String,
        format: String,
    },
    #[error("row {row}: {column} value {value} is out of range")]
    OutOfRange {
        row: usize,
        column: &'static str,
        value: f64,
    },
}

/// The immutable, fully validated sales table.
#[derive(Debug, Clone)]
pub struct Dataset {
    df: DataFrame,
    source: PathBuf,
}

impl Dataset {
    /// Parse already-decoded CSV text.
    ///
    /// Every column is read as text first, then the required columns are
    /// checked and converted: Sales/Profit/Discount to `Float64`, Order Date
    /// to `Date` using `date_format`.
    pub fn from_csv_text(
        text: &str,
        source: impl Into<PathBuf>,
        date_format: &str,
    ) -> Result<Self, ParseError> {
        let mut df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .map_parse_options(|opts| opts.with_truncate_ragged_lines(false))
            .into_reader_with_file_handle(Cursor::new(text.as_bytes().to_vec()))
            .finish()?;

        let present: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| !present.iter().any(|p| p == *name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ParseError::MissingColumns(missing));
        }

        for name in REQUIRED_COLUMNS {
            let count = df.column(name)?.null_count();
            if count > 0 {
                return Err(ParseError::MissingValues {
                    column: name,
                    count,
                });
            }
        }

        for name in NUMERIC_COLUMNS {
            let typed = df
                .column(name)?
                .as_materialized_series()
                .strict_cast(&DataType::Float64)?;
            df.with_column(typed)?;
        }

        let dates = Self::parse_order_dates(&df, date_format)?;
        df.with_column(dates)?;

        Self::check_ranges(&df)?;

        Ok(Self {
            df,
            source: source.into(),
        })
    }

    fn parse_order_dates(df: &DataFrame, date_format: &str) -> Result<Series, ParseError> {
        let raw = df.column(ORDER_DATE)?.str()?;
        let mut days: Vec<i32> = Vec::with_capacity(raw.len());

        for (i, value) in raw.into_iter().enumerate() {
            let value = value.unwrap_or_default();
            let date = NaiveDate::parse_from_str(value.trim(), date_format).map_err(|_| {
                ParseError::InvalidDate {
                    row: i + 1,
                    value: value.to_string(),
                    format: date_format.to_string(),
                }
            })?;
            days.push(date_to_epoch_days(date));
        }

        Ok(Series::new(ORDER_DATE.into(), days).cast(&DataType::Date)?)
    }

    fn check_ranges(df: &DataFrame) -> Result<(), ParseError> {
        for (i, sales) in df.column(SALES)?.f64()?.into_iter().enumerate() {
            let sales = sales.unwrap_or_default();
            if sales < 0.0 || !sales.is_finite() {
                return Err(ParseError::OutOfRange {
                    row: i + 1,
                    column: SALES,
                    value: sales,
                });
            }
        }

        for (i, discount) in df.column(DISCOUNT)?.f64()?.into_iter().enumerate() {
            let discount = discount.unwrap_or_default();
            if !(0.0..1.0).contains(&discount) {
                return Err(ParseError::OutOfRange {
                    row: i + 1,
                    column: DISCOUNT,
                    value: discount,
                });
            }
        }

        Ok(())
    }

    /// Get a reference to the underlying DataFrame.
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    /// Path the dataset was read from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Distinct values of a column in first-appearance order.
    pub fn distinct_values(&self, column: &str) -> Vec<String> {
        self.df
            .column(column)
            .ok()
            .and_then(|col| col.as_materialized_series().unique_stable().ok())
            .and_then(|unique| {
                unique.str().ok().map(|ca| {
                    ca.into_iter()
                        .flatten()
                        .map(|v| v.to_string())
                        .collect::<Vec<_>>()
                })
            })
            .unwrap_or_default()
    }
}

/// Reads the configured file once and hands out the cached dataset.
pub struct DatasetLoader {
    config: DatasetConfig,
    cache: OnceCell<Arc<Dataset>>,
}

impl DatasetLoader {
    pub fn new(config: DatasetConfig) -> Self {
        Self {
            config,
            cache: OnceCell::new(),
        }
    }

    /// Load the dataset, reading the file only on the first call.
    pub fn load(&self) -> Result<Arc<Dataset>, LoaderError> {
        self.cache
            .get_or_try_init(|| self.read_from_disk().map(Arc::new))
            .cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.get().is_some()
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    fn read_from_disk(&self) -> Result<Dataset, LoaderError> {
        let path = &self.config.path;
        let encoding = self.config.text_encoding()?;

        let bytes = std::fs::read(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                LoaderError::FileNotFound(path.clone())
            } else {
                LoaderError::Io {
                    path: path.clone(),
                    source,
                }
            }
        })?;

        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes);
        if had_errors {
            tracing::warn!(
                "{} contains bytes not valid in {}; replaced with U+FFFD",
                path.display(),
                encoding.name()
            );
        }

        let dataset = Dataset::from_csv_text(&text, path.clone(), &self.config.date_format)?;
        tracing::info!(
            "Loaded {} rows, {} columns from {}",
            dataset.row_count(),
            dataset.df.width(),
            path.display()
        );
        Ok(dataset)
    }
}

pub(crate) fn date_to_epoch_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

pub(crate) fn epoch_days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{sample_csv, HEADER};
    use std::io::Write;

    fn config_for(path: &Path) -> DatasetConfig {
        DatasetConfig {
            path: path.to_path_buf(),
            encoding: "ISO-8859-1".to_string(),
            date_format: "%m/%d/%Y".to_string(),
        }
    }

    #[test]
    fn test_parses_typed_columns() {
        let ds = Dataset::from_csv_text(&sample_csv(), "sample.csv", "%m/%d/%Y").unwrap();
        let df = ds.dataframe();

        assert_eq!(ds.row_count(), 9);
        assert_eq!(df.column(SALES).unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column(PROFIT).unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column(DISCOUNT).unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column(ORDER_DATE).unwrap().dtype(), &DataType::Date);
        assert_eq!(df.column(REGION).unwrap().dtype(), &DataType::String);
        // Extra columns are carried along untouched.
        assert!(df.column("Row ID").is_ok());
    }

    #[test]
    fn test_quoted_product_names_survive() {
        let ds = Dataset::from_csv_text(&sample_csv(), "sample.csv", "%m/%d/%Y").unwrap();
        let names = ds.distinct_values(PRODUCT_NAME);
        assert!(names
            .iter()
            .any(|n| n == "Hon Deluxe Fabric Upholstered Stacking Chairs, Rounded Back"));
    }

    #[test]
    fn test_distinct_values_first_appearance_order() {
        let ds = Dataset::from_csv_text(&sample_csv(), "sample.csv", "%m/%d/%Y").unwrap();
        assert_eq!(ds.distinct_values(REGION), vec!["South", "West", "East"]);
        assert_eq!(
            ds.distinct_values(CATEGORY),
            vec!["Furniture", "Office Supplies", "Technology"]
        );
        assert!(ds.distinct_values("No Such Column").is_empty());
    }

    #[test]
    fn test_missing_column_is_parse_error() {
        let text = "Order ID,Region,Sales\nA-1,East,10\n";
        let err = Dataset::from_csv_text(text, "bad.csv", "%m/%d/%Y").unwrap_err();
        match err {
            ParseError::MissingColumns(missing) => {
                assert!(missing.contains(&"Profit".to_string()));
                assert!(missing.contains(&"Order Date".to_string()));
                assert!(!missing.contains(&"Sales".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_numeric_sales_is_parse_error() {
        let text = format!(
            "{HEADER}\n1,A-1,1/2/2017,First Class,Ohio,East,Technology,Phones,Phone,lots,1,0,5\n"
        );
        let err = Dataset::from_csv_text(&text, "bad.csv", "%m/%d/%Y").unwrap_err();
        assert!(matches!(err, ParseError::Csv(_)));
    }

    #[test]
    fn test_empty_required_cell_is_parse_error() {
        let text = format!(
            "{HEADER}\n1,A-1,1/2/2017,First Class,Ohio,,Technology,Phones,Phone,10,1,0,5\n"
        );
        let err = Dataset::from_csv_text(&text, "bad.csv", "%m/%d/%Y").unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingValues { column: "Region", count: 1 }
        ));
    }

    #[test]
    fn test_row_with_extra_field_is_parse_error() {
        let text = format!(
            "{HEADER}\n1,A-1,1/2/2017,First Class,Ohio,East,Technology,Phones,Phone,10,1,0,5,extra\n"
        );
        let err = Dataset::from_csv_text(&text, "bad.csv", "%m/%d/%Y").unwrap_err();
        assert!(matches!(err, ParseError::Csv(_)));
    }

    #[test]
    fn test_truncated_row_is_missing_profit() {
        let text = format!(
            "{HEADER}\n1,A-1,1/2/2017,First Class,Ohio,East,Technology,Phones,Phone,10,1,0,5\n\
             2,A-2,1/3/2017,First Class,Ohio,East,Technology,Phones,Phone,10,1,0\n"
        );
        let err = Dataset::from_csv_text(&text, "bad.csv", "%m/%d/%Y").unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingValues { column: "Profit", count: 1 }
        ));
    }

    #[test]
    fn test_bad_date_reports_row() {
        let text = format!(
            "{HEADER}\n1,A-1,1/2/2017,First Class,Ohio,East,Technology,Phones,Phone,10,1,0,5\n\
             2,A-2,2017-13-45,First Class,Ohio,East,Technology,Phones,Phone,10,1,0,5\n"
        );
        let err = Dataset::from_csv_text(&text, "bad.csv", "%m/%d/%Y").unwrap_err();
        match err {
            ParseError::InvalidDate { row, value, .. } => {
                assert_eq!(row, 2);
                assert_eq!(value, "2017-13-45");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_discount_out_of_range_rejected() {
        let text = format!(
            "{HEADER}\n1,A-1,1/2/2017,First Class,Ohio,East,Technology,Phones,Phone,10,1,1.5,5\n"
        );
        let err = Dataset::from_csv_text(&text, "bad.csv", "%m/%d/%Y").unwrap_err();
        assert!(matches!(
            err,
            ParseError::OutOfRange { row: 1, column: "Discount", .. }
        ));
    }

    #[test]
    fn test_negative_sales_rejected() {
        let text = format!(
            "{HEADER}\n1,A-1,1/2/2017,First Class,Ohio,East,Technology,Phones,Phone,-3,1,0,5\n"
        );
        let err = Dataset::from_csv_text(&text, "bad.csv", "%m/%d/%Y").unwrap_err();
        assert!(matches!(
            err,
            ParseError::OutOfRange { column: "Sales", .. }
        ));
    }

    #[test]
    fn test_epoch_day_conversion() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(date_to_epoch_days(epoch), 0);

        let date = NaiveDate::from_ymd_opt(2016, 11, 8).unwrap();
        let days = date_to_epoch_days(date);
        assert_eq!(epoch_days_to_date(days), Some(date));
    }

    #[test]
    fn test_loader_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let loader = DatasetLoader::new(config_for(&dir.path().join("nope.csv")));
        let err = loader.load().unwrap_err();
        assert!(matches!(err, LoaderError::FileNotFound(_)));
        assert!(!loader.is_loaded());
    }

    #[test]
    fn test_loader_decodes_latin1() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.csv");
        let mut bytes = format!("{HEADER}\n1,A-1,1/2/2017,First Class,Ohio,East,Technology,Phones,Caf")
            .into_bytes();
        bytes.push(0xE9); // 'é' in ISO-8859-1
        bytes.extend_from_slice(b" Phone,10,1,0,5\n");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(&bytes)
            .unwrap();

        let loader = DatasetLoader::new(config_for(&path));
        let ds = loader.load().unwrap();
        assert_eq!(ds.distinct_values(PRODUCT_NAME), vec!["Café Phone"]);
        assert_eq!(ds.source(), path.as_path());
    }

    #[test]
    fn test_loader_caches_first_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        std::fs::write(&path, sample_csv()).unwrap();

        let loader = DatasetLoader::new(config_for(&path));
        let first = loader.load().unwrap();
        assert!(loader.is_loaded());

        // The file is gone, yet the cached dataset is still served.
        std::fs::remove_file(&path).unwrap();
        let second = loader.load().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.row_count(), 9);
    }
}
