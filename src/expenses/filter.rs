//! Narrowing a ledger down to the facets the user selected.
//!
//! A [FilterCriteria] is a conjunction of facet-membership checks evaluated
//! directly against typed records. Within one facet the accepted values form
//! a disjunction, e.g. year 2023 or 2024.

use std::collections::BTreeSet;

use crate::expenses::calendar::{CalendarMonth, IndexedRecord};

/// The facets to keep, `None` meaning "any value" for that facet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    years: Option<BTreeSet<i32>>,
    months: Option<BTreeSet<CalendarMonth>>,
    descriptions: Option<BTreeSet<String>>,
    categories: Option<BTreeSet<String>>,
}

impl FilterCriteria {
    /// Criteria that match every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only records dated in one of `years`.
    pub fn years(mut self, years: impl IntoIterator<Item = i32>) -> Self {
        self.years = Some(years.into_iter().collect());
        self
    }

    /// Keep only records dated in one of `months`, in any year.
    pub fn months(mut self, months: impl IntoIterator<Item = CalendarMonth>) -> Self {
        self.months = Some(months.into_iter().collect());
        self
    }

    /// Keep only records whose description is exactly one of `descriptions`.
    pub fn descriptions<S: Into<String>>(mut self, descriptions: impl IntoIterator<Item = S>) -> Self {
        self.descriptions = Some(descriptions.into_iter().map(Into::into).collect());
        self
    }

    /// Keep only records whose category is exactly one of `categories`.
    pub fn categories<S: Into<String>>(mut self, categories: impl IntoIterator<Item = S>) -> Self {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    /// The selected years, if the year facet is constrained.
    pub fn selected_years(&self) -> Option<&BTreeSet<i32>> {
        self.years.as_ref()
    }

    /// The selected months, if the month facet is constrained.
    pub fn selected_months(&self) -> Option<&BTreeSet<CalendarMonth>> {
        self.months.as_ref()
    }

    /// The selected descriptions, if the description facet is constrained.
    pub fn selected_descriptions(&self) -> Option<&BTreeSet<String>> {
        self.descriptions.as_ref()
    }

    /// The selected categories, if the category facet is constrained.
    pub fn selected_categories(&self) -> Option<&BTreeSet<String>> {
        self.categories.as_ref()
    }

    /// Whether no facet is constrained.
    pub fn is_unconstrained(&self) -> bool {
        self.years.is_none()
            && self.months.is_none()
            && self.descriptions.is_none()
            && self.categories.is_none()
    }

    /// Whether `record` satisfies every constrained facet.
    pub fn matches(&self, record: &IndexedRecord) -> bool {
        facet_allows(&self.years, &record.bucket.year)
            && facet_allows(&self.months, &record.bucket.month)
            && facet_allows(&self.descriptions, &record.record.description)
            && facet_allows(&self.categories, &record.record.category)
    }

    /// Returns copies of the records that match, in their original order.
    pub fn apply(&self, records: &[IndexedRecord]) -> Vec<IndexedRecord> {
        records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }
}

fn facet_allows<T: Ord>(facet: &Option<BTreeSet<T>>, value: &T) -> bool {
    facet.as_ref().is_none_or(|accepted| accepted.contains(value))
}

/// The distinct values of each facet found in a ledger, used to populate
/// the filter controls.
///
/// These are recomputed for every upload since categories and descriptions
/// are whatever the user wrote in their spreadsheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetOptions {
    /// Years in ascending order.
    pub years: Vec<i32>,
    /// Months in calendar order.
    pub months: Vec<CalendarMonth>,
    /// Descriptions in alphabetical order.
    pub descriptions: Vec<String>,
    /// Categories in alphabetical order.
    pub categories: Vec<String>,
}

impl FacetOptions {
    /// Collects the distinct facet values of `records`.
    pub fn from_records(records: &[IndexedRecord]) -> Self {
        let mut years = BTreeSet::new();
        let mut months = BTreeSet::new();
        let mut descriptions = BTreeSet::new();
        let mut categories = BTreeSet::new();

        for record in records {
            years.insert(record.bucket.year);
            months.insert(record.bucket.month);
            descriptions.insert(record.record.description.as_str());
            categories.insert(record.record.category.as_str());
        }

        Self {
            years: years.into_iter().collect(),
            months: months.into_iter().collect(),
            descriptions: descriptions.into_iter().map(str::to_owned).collect(),
            categories: categories.into_iter().map(str::to_owned).collect(),
        }
    }
}
