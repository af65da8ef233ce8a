//! Filter Module
//! Region/Category equality filters over the loaded dataset.

use super::loader::columns::{CATEGORY, REGION};
use super::Dataset;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label of the match-everything choice in both dropdowns.
pub const ALL_LABEL: &str = "All";

/// One dropdown value: everything, or a single exact categorical value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// `"All"` maps to [`Selection::All`]; anything else is an exact value.
    pub fn parse(value: &str) -> Self {
        if value == ALL_LABEL {
            Selection::All
        } else {
            Selection::Only(value.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Selection::All => ALL_LABEL,
            Selection::Only(value) => value,
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => wanted == value,
        }
    }

    fn predicate(&self, column: &str) -> Option<Expr> {
        match self {
            Selection::All => None,
            Selection::Only(value) => Some(col(column).eq(lit(value.as_str()))),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for Selection {
    fn from(value: String) -> Self {
        Selection::parse(&value)
    }
}

impl From<Selection> for String {
    fn from(value: Selection) -> Self {
        value.label().to_string()
    }
}

/// The pair of dropdown values chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterSelection {
    pub region: Selection,
    pub category: Selection,
}

impl FilterSelection {
    pub fn new(region: Selection, category: Selection) -> Self {
        Self { region, category }
    }
}

/// The closed dropdown enumerations: `All` then observed values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterOptions {
    pub regions: Vec<Selection>,
    pub categories: Vec<Selection>,
}

impl FilterOptions {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        Self {
            regions: Self::options_for(dataset, REGION),
            categories: Self::options_for(dataset, CATEGORY),
        }
    }

    fn options_for(dataset: &Dataset, column: &str) -> Vec<Selection> {
        std::iter::once(Selection::All)
            .chain(
                dataset
                    .distinct_values(column)
                    .into_iter()
                    .map(Selection::Only),
            )
            .collect()
    }
}

/// Rows of the dataset that match a [`FilterSelection`], in dataset order.
#[derive(Debug, Clone)]
pub struct FilteredView {
    df: DataFrame,
    selection: FilterSelection,
}

impl FilteredView {
    /// Apply both equality predicates; `All` matches every row.
    pub fn apply(dataset: &Dataset, selection: &FilterSelection) -> PolarsResult<Self> {
        let predicates: Vec<Expr> = [
            selection.region.predicate(REGION),
            selection.category.predicate(CATEGORY),
        ]
        .into_iter()
        .flatten()
        .collect();

        let df = match predicates.into_iter().reduce(|acc, p| acc.and(p)) {
            Some(predicate) => dataset
                .dataframe()
                .clone()
                .lazy()
                .filter(predicate)
                .collect()?,
            None => dataset.dataframe().clone(),
        };

        tracing::debug!(
            region = %selection.region,
            category = %selection.category,
            rows = df.height(),
            "Applied filter"
        );

        Ok(Self {
            df,
            selection: selection.clone(),
        })
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{dataset_from, sample_dataset, TestRow};

    fn strings(view: &FilteredView, column: &str) -> Vec<String> {
        view.dataframe()
            .column(column)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap().to_string())
            .collect()
    }

    fn only(value: &str) -> Selection {
        Selection::Only(value.to_string())
    }

    #[test]
    fn test_selection_parse_and_label() {
        assert_eq!(Selection::parse("All"), Selection::All);
        assert_eq!(Selection::parse("West"), only("West"));
        // Exact matching only: a lowercase "all" is a literal value.
        assert_eq!(Selection::parse("all"), only("all"));
        assert_eq!(only("West").to_string(), "West");
        assert_eq!(Selection::All.label(), "All");
        assert!(Selection::All.matches("anything"));
        assert!(!only("West").matches("west"));
    }

    #[test]
    fn test_default_selection_keeps_everything() {
        let ds = sample_dataset();
        let view = FilteredView::apply(&ds, &FilterSelection::default()).unwrap();
        assert_eq!(view.row_count(), ds.row_count());
        assert_eq!(
            strings(&view, "Row ID"),
            (1..=9).map(|i| i.to_string()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_region_filter_subset_in_order() {
        let ds = sample_dataset();
        let selection = FilterSelection::new(only("West"), Selection::All);
        let view = FilteredView::apply(&ds, &selection).unwrap();

        assert_eq!(view.row_count(), 3);
        assert!(strings(&view, "Region").iter().all(|r| r == "West"));
        assert_eq!(strings(&view, "Row ID"), vec!["3", "6", "7"]);
        assert_eq!(view.selection(), &selection);
    }

    #[test]
    fn test_both_filters_combine() {
        let ds = sample_dataset();
        let selection = FilterSelection::new(only("South"), only("Furniture"));
        let view = FilteredView::apply(&ds, &selection).unwrap();

        assert_eq!(strings(&view, "Row ID"), vec!["1", "2", "4"]);
        assert!(strings(&view, "Category").iter().all(|c| c == "Furniture"));
        assert!(strings(&view, "Region").iter().all(|r| r == "South"));
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let ds = sample_dataset();
        let selection = FilterSelection::new(only("Central"), Selection::All);
        let view = FilteredView::apply(&ds, &selection).unwrap();
        assert!(view.is_empty());
        // Columns are still present for downstream aggregation.
        assert!(view.dataframe().column("Sales").is_ok());
    }

    #[test]
    fn test_every_selection_is_subset() {
        let ds = sample_dataset();
        let options = FilterOptions::from_dataset(&ds);
        for region in &options.regions {
            for category in &options.categories {
                let selection = FilterSelection::new(region.clone(), category.clone());
                let view = FilteredView::apply(&ds, &selection).unwrap();
                assert!(view.row_count() <= ds.row_count());
                assert!(strings(&view, "Region").iter().all(|r| region.matches(r)));
                assert!(strings(&view, "Category")
                    .iter()
                    .all(|c| category.matches(c)));

                // Row IDs are strictly increasing: order preserved.
                let ids: Vec<u32> = strings(&view, "Row ID")
                    .iter()
                    .map(|id| id.parse().unwrap())
                    .collect();
                assert!(ids.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }

    #[test]
    fn test_filter_options_start_with_all() {
        let ds = dataset_from(&[
            TestRow::new("West", "a", 1.0, 1.0).category("Furniture"),
            TestRow::new("East", "b", 1.0, 1.0),
            TestRow::new("West", "c", 1.0, 1.0),
        ]);
        let options = FilterOptions::from_dataset(&ds);
        assert_eq!(
            options.regions,
            vec![Selection::All, only("West"), only("East")]
        );
        assert_eq!(
            options.categories,
            vec![Selection::All, only("Furniture"), only("Technology")]
        );
    }

    #[test]
    fn test_selection_serializes_as_label() {
        let selection = FilterSelection::new(only("East"), Selection::All);
        let json = serde_json::to_string(&selection).unwrap();
        assert_eq!(json, r#"{"region":"East","category":"All"}"#);
        let back: FilterSelection = serde_json::from_str(&json).unwrap();
        assert_eq!(back, selection);
    }
}
