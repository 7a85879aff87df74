//! The query string of the analysis page, shared with the export endpoint.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    expenses::{CalendarMonth, FilterCriteria, parse_amount},
};

/// The filter selections and thresholds chosen on the analysis page.
///
/// Each facet is a repeated parameter, e.g. `?year=2023&year=2024`. A facet
/// with no values is not filtered on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AnalysisQuery {
    /// Years to include.
    #[serde(default, rename = "year", skip_serializing_if = "Vec::is_empty")]
    pub years: Vec<i32>,
    /// Month numbers to include, 1 for January.
    #[serde(default, rename = "month", skip_serializing_if = "Vec::is_empty")]
    pub months: Vec<u8>,
    /// Categories to include.
    #[serde(default, rename = "category", skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    /// Descriptions to include.
    #[serde(default, rename = "description", skip_serializing_if = "Vec::is_empty")]
    pub descriptions: Vec<String>,
    /// The monthly income as typed by the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income: Option<String>,
    /// The monthly budget limit as typed by the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
}

impl AnalysisQuery {
    /// The filter described by the facet parameters.
    ///
    /// Month numbers outside 1 to 12 are ignored.
    pub fn criteria(&self) -> FilterCriteria {
        let mut criteria = FilterCriteria::new();

        if !self.years.is_empty() {
            criteria = criteria.years(self.years.iter().copied());
        }

        let months: Vec<CalendarMonth> = self
            .months
            .iter()
            .filter_map(|&number| CalendarMonth::from_number(number))
            .collect();
        if !months.is_empty() {
            criteria = criteria.months(months);
        }

        if !self.categories.is_empty() {
            criteria = criteria.categories(self.categories.iter().cloned());
        }

        if !self.descriptions.is_empty() {
            criteria = criteria.descriptions(self.descriptions.iter().cloned());
        }

        criteria
    }

    /// The monthly income, zero if left blank.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidThreshold] if the income is not a number between zero and
    /// [MAX_AMOUNT](crate::expenses::MAX_AMOUNT).
    pub fn income(&self) -> Result<Decimal, Error> {
        parse_threshold(self.income.as_deref(), "income")
    }

    /// The monthly budget limit, zero if left blank.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidThreshold] if the budget is not a number between zero and
    /// [MAX_AMOUNT](crate::expenses::MAX_AMOUNT).
    pub fn budget_limit(&self) -> Result<Decimal, Error> {
        parse_threshold(self.budget.as_deref(), "budget")
    }

    /// Encode the query for use in a link, e.g. to the export endpoint.
    pub fn to_query_string(&self) -> String {
        serde_html_form::to_string(self)
            .inspect_err(|error| tracing::error!("could not encode analysis query: {error}"))
            .unwrap_or_default()
    }
}

fn parse_threshold(value: Option<&str>, name: &str) -> Result<Decimal, Error> {
    let value = value.map(str::trim).unwrap_or_default();

    if value.is_empty() {
        return Ok(Decimal::ZERO);
    }

    parse_amount(value).ok_or_else(|| Error::InvalidThreshold(value.to_owned(), name.to_owned()))
}
