//! The expense analysis pipeline.
//!
//! Data flows one way: a [RawTable] is parsed into [ExpenseRecord]s, each
//! record is indexed by its [TimeBucket], the indexed records are narrowed by
//! a [FilterCriteria], grouped into [AggregateRow]s and finally summarised by
//! [SummaryMetrics]. Every stage is a pure function of its input.

pub mod aggregation;
pub mod calendar;
pub mod filter;
pub mod parse;
pub mod record;
pub mod summary;

pub use aggregation::{
    AggregateRow, CategoryPivot, PivotMode, category_totals, monthly_category_totals,
    monthly_totals, yearly_totals,
};
pub use calendar::{CalendarMonth, IndexedRecord, TimeBucket, index_records};
pub use filter::{FacetOptions, FilterCriteria};
pub use parse::{Column, MAX_AMOUNT, RawTable, parse_amount, parse_date, parse_records};
pub use record::{ExpenseRecord, format_date, round_for_display};
pub use summary::{
    BudgetStatus, IncomeStatus, PeriodComparison, SummaryMetrics, Thresholds, Variance,
};

use crate::Error;

/// Parses and indexes an uploaded table.
///
/// # Errors
///
/// Returns the first validation error found, see [parse_records].
pub fn load(table: &RawTable) -> Result<Vec<IndexedRecord>, Error> {
    parse_records(table).map(index_records)
}

/// Everything derived from one set of filter criteria and thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// The records that passed the filter, in date order.
    pub records: Vec<IndexedRecord>,
    /// Total per month, sparse.
    pub monthly: Vec<AggregateRow<TimeBucket>>,
    /// Total per year.
    pub yearly: Vec<AggregateRow<i32>>,
    /// Total per category.
    pub categories: Vec<AggregateRow<String>>,
    /// The dense month × category table.
    pub pivot: CategoryPivot,
    /// Headline metrics, `None` if no records passed the filter.
    pub summary: Option<SummaryMetrics>,
}

impl Analysis {
    /// Filters `records` by `criteria` and computes every aggregate of the
    /// result.
    pub fn run(records: &[IndexedRecord], criteria: &FilterCriteria, thresholds: Thresholds) -> Self {
        let records = criteria.apply(records);
        let monthly = monthly_totals(&records);
        let summary = SummaryMetrics::calculate(&monthly, thresholds);

        Self {
            yearly: yearly_totals(&records),
            categories: category_totals(&records),
            pivot: CategoryPivot::from_records(&records),
            monthly,
            summary,
            records,
        }
    }

    /// Whether no records passed the filter.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use super::{
        Analysis, BudgetStatus, FilterCriteria, PeriodComparison, RawTable, Thresholds, load,
        round_for_display,
    };

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    fn example_table() -> RawTable {
        RawTable {
            headers: vec![
                "Data".to_owned(),
                "Descrição".to_owned(),
                "Tipo".to_owned(),
                "Valor".to_owned(),
            ],
            rows: vec![
                vec!["15/03/2000", "Faculdade", "Educação", "350.00"],
                vec!["01/01/2000", "Almoço", "Alimentação", "100.00"],
                vec!["10/02/2000", "Cinema", "Lazer", "70.00"],
            ]
            .into_iter()
            .map(|row| row.into_iter().map(str::to_owned).collect())
            .collect(),
        }
    }

    #[test]
    fn example_ledger_end_to_end() {
        let records = load(&example_table()).unwrap();
        let thresholds = Thresholds {
            income: Decimal::ZERO,
            budget_limit: dec("200"),
        };

        let analysis = Analysis::run(&records, &FilterCriteria::new(), thresholds);

        let monthly: Vec<_> = analysis.monthly.iter().map(|row| row.total).collect();
        assert_eq!(monthly, vec![dec("100.00"), dec("70.00"), dec("350.00")]);

        let summary = analysis.summary.unwrap();
        assert_eq!(round_for_display(summary.mean_spend).to_string(), "173.33");
        assert_eq!(summary.budget_variance.status, BudgetStatus::Over);
        assert_eq!(summary.budget_variance.amount, dec("150.00"));
        assert_eq!(summary.delta(), Some(dec("280.00")));
    }

    #[test]
    fn filter_applies_before_aggregation() {
        let records = load(&example_table()).unwrap();
        let criteria = FilterCriteria::new().categories(["Lazer"]);

        let analysis = Analysis::run(&records, &criteria, Thresholds::default());

        assert_eq!(analysis.records.len(), 1);
        assert_eq!(analysis.monthly.len(), 1);
        assert_eq!(analysis.pivot.categories(), &["Lazer"]);
        assert_eq!(
            analysis.summary.unwrap().comparison,
            PeriodComparison::InsufficientPeriods
        );
    }

    #[test]
    fn empty_filter_result_has_no_summary() {
        let records = load(&example_table()).unwrap();
        let criteria = FilterCriteria::new().years([1999]);

        let analysis = Analysis::run(&records, &criteria, Thresholds::default());

        assert!(analysis.is_empty());
        assert!(analysis.monthly.is_empty());
        assert!(analysis.pivot.is_empty());
        assert_eq!(analysis.summary, None);
    }
}
