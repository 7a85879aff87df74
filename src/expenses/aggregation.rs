//! Grouping records and summing their amounts.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;

use crate::expenses::calendar::{IndexedRecord, TimeBucket};

/// The summed amount of every record sharing the same grouping key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateRow<K> {
    /// The grouping key, e.g. a [TimeBucket] or a category.
    pub key: K,
    /// The exact, unrounded sum of the group's amounts.
    pub total: Decimal,
}

/// Whether a two-key grouping includes key combinations with no records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotMode {
    /// Only the combinations that have at least one record.
    Sparse,
    /// Every combination of the observed buckets and observed categories,
    /// with missing combinations totalling zero.
    Dense,
}

fn sum_by<K, F>(records: &[IndexedRecord], key_of: F) -> Vec<AggregateRow<K>>
where
    K: Ord,
    F: Fn(&IndexedRecord) -> K,
{
    let mut totals: BTreeMap<K, Decimal> = BTreeMap::new();

    for record in records {
        *totals.entry(key_of(record)).or_default() += record.record.amount;
    }

    totals
        .into_iter()
        .map(|(key, total)| AggregateRow { key, total })
        .collect()
}

/// Total spend per (year, month), in calendar order.
///
/// Months without records are not included.
pub fn monthly_totals(records: &[IndexedRecord]) -> Vec<AggregateRow<TimeBucket>> {
    sum_by(records, |record| record.bucket)
}

/// Total spend per year, in ascending order.
pub fn yearly_totals(records: &[IndexedRecord]) -> Vec<AggregateRow<i32>> {
    sum_by(records, |record| record.bucket.year)
}

/// Total spend per category, in alphabetical order.
pub fn category_totals(records: &[IndexedRecord]) -> Vec<AggregateRow<String>> {
    sum_by(records, |record| record.record.category.clone())
}

/// Total spend per (year, month) and category, ordered by bucket and then
/// category.
pub fn monthly_category_totals(
    records: &[IndexedRecord],
    mode: PivotMode,
) -> Vec<AggregateRow<(TimeBucket, String)>> {
    let sparse = sum_by(records, |record| {
        (record.bucket, record.record.category.clone())
    });

    match mode {
        PivotMode::Sparse => sparse,
        PivotMode::Dense => {
            let buckets: BTreeSet<TimeBucket> = records.iter().map(|record| record.bucket).collect();
            let categories: BTreeSet<&str> = records
                .iter()
                .map(|record| record.record.category.as_str())
                .collect();
            let mut totals: BTreeMap<(TimeBucket, String), Decimal> = sparse
                .into_iter()
                .map(|row| (row.key, row.total))
                .collect();

            for bucket in &buckets {
                for category in &categories {
                    totals
                        .entry((*bucket, (*category).to_owned()))
                        .or_insert(Decimal::ZERO);
                }
            }

            totals
                .into_iter()
                .map(|(key, total)| AggregateRow { key, total })
                .collect()
        }
    }
}

/// A dense month × category table of totals.
///
/// Rows are the observed buckets in calendar order, columns are the observed
/// categories in alphabetical order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryPivot {
    buckets: Vec<TimeBucket>,
    categories: Vec<String>,
    /// `cells[row][column]`
    cells: Vec<Vec<Decimal>>,
}

impl CategoryPivot {
    /// Build the pivot of `records`.
    pub fn from_records(records: &[IndexedRecord]) -> Self {
        let rows = monthly_category_totals(records, PivotMode::Dense);

        let buckets: Vec<TimeBucket> = rows
            .iter()
            .map(|row| row.key.0)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let categories: Vec<String> = rows
            .iter()
            .map(|row| row.key.1.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_owned)
            .collect();

        // Dense rows come ordered by bucket then category, so they fill the
        // table row by row.
        let cells = if categories.is_empty() {
            Vec::new()
        } else {
            rows.chunks(categories.len())
                .map(|chunk| chunk.iter().map(|row| row.total).collect())
                .collect()
        };

        Self {
            buckets,
            categories,
            cells,
        }
    }

    /// The row labels.
    pub fn buckets(&self) -> &[TimeBucket] {
        &self.buckets
    }

    /// The column labels.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Whether the pivot has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The totals of one bucket, one per category.
    pub fn row(&self, bucket_index: usize) -> &[Decimal] {
        self.cells
            .get(bucket_index)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The totals of one category, one per bucket.
    pub fn column(&self, category_index: usize) -> Vec<Decimal> {
        self.cells
            .iter()
            .map(|row| row.get(category_index).copied().unwrap_or_default())
            .collect()
    }

    /// The total of every category in one bucket.
    pub fn row_total(&self, bucket_index: usize) -> Decimal {
        self.row(bucket_index).iter().sum()
    }

    /// The total of one category across every bucket.
    pub fn column_total(&self, category_index: usize) -> Decimal {
        self.column(category_index).iter().sum()
    }

    /// The total of every cell.
    pub fn grand_total(&self) -> Decimal {
        self.cells.iter().flatten().sum()
    }
}
