//! Headline metrics computed from the monthly time series.

use rust_decimal::Decimal;

use crate::expenses::{aggregation::AggregateRow, calendar::TimeBucket};

/// The user's monthly income and budget limit. Both default to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Thresholds {
    /// Monthly income.
    pub income: Decimal,
    /// Monthly budget limit.
    pub budget_limit: Decimal,
}

/// How the latest period compares to the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodComparison {
    /// There is a period before the latest one.
    Available {
        /// The period immediately before the latest one.
        prior_period: TimeBucket,
        /// The total spent in `prior_period`.
        prior_total: Decimal,
        /// Latest total minus prior total, negative when spending went down.
        delta: Decimal,
    },
    /// Only one period has records, so there is nothing to compare against.
    InsufficientPeriods,
}

/// Whether spending reached the budget limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStatus {
    /// Spent at least the budget limit.
    Over,
    /// Spent less than the budget limit.
    Under,
}

/// Whether spending reached the income.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncomeStatus {
    /// Spent at least the income.
    Shortfall,
    /// Spent less than the income.
    Surplus,
}

/// The absolute distance between the latest total and a threshold, tagged
/// with which side of the threshold the total is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variance<S> {
    /// Non-negative distance from the threshold.
    pub amount: Decimal,
    /// The direction of the difference.
    pub status: S,
}

/// Summary of the monthly totals of the selected records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryMetrics {
    /// The most recent period with records.
    pub latest_period: TimeBucket,
    /// The total spent in `latest_period`.
    pub latest_total: Decimal,
    /// The comparison against the period before the latest.
    pub comparison: PeriodComparison,
    /// The mean of every period total.
    pub mean_spend: Decimal,
    /// The number of periods the mean is taken over.
    pub period_count: usize,
    /// The latest total compared against the budget limit.
    pub budget_variance: Variance<BudgetStatus>,
    /// The latest total compared against the income.
    pub income_variance: Variance<IncomeStatus>,
}

impl SummaryMetrics {
    /// Computes the metrics of `monthly`, which must be ordered by period as
    /// returned by [monthly_totals](crate::expenses::aggregation::monthly_totals).
    ///
    /// Returns `None` when there are no periods.
    pub fn calculate(monthly: &[AggregateRow<TimeBucket>], thresholds: Thresholds) -> Option<Self> {
        let (latest, earlier) = monthly.split_last()?;

        let comparison = match earlier.last() {
            Some(prior) => PeriodComparison::Available {
                prior_period: prior.key,
                prior_total: prior.total,
                delta: latest.total - prior.total,
            },
            None => PeriodComparison::InsufficientPeriods,
        };

        let sum: Decimal = monthly.iter().map(|row| row.total).sum();
        let mean_spend = sum / Decimal::from(monthly.len());

        let budget_variance = Variance {
            amount: (latest.total - thresholds.budget_limit).abs(),
            status: if latest.total >= thresholds.budget_limit {
                BudgetStatus::Over
            } else {
                BudgetStatus::Under
            },
        };

        let income_variance = Variance {
            amount: (latest.total - thresholds.income).abs(),
            status: if latest.total >= thresholds.income {
                IncomeStatus::Shortfall
            } else {
                IncomeStatus::Surplus
            },
        };

        Some(Self {
            latest_period: latest.key,
            latest_total: latest.total,
            comparison,
            mean_spend,
            period_count: monthly.len(),
            budget_variance,
            income_variance,
        })
    }

    /// The change from the prior period, if there is one.
    pub fn delta(&self) -> Option<Decimal> {
        match self.comparison {
            PeriodComparison::Available { delta, .. } => Some(delta),
            PeriodComparison::InsufficientPeriods => None,
        }
    }
}
