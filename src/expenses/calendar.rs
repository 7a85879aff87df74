//! Calendar facets derived from record dates.
//!
//! Months are ordered by their position in the calendar, never by name, so
//! grouped data always reads chronologically even when months are displayed
//! as words.

use std::fmt;

use time::{Date, Month};

use crate::expenses::record::ExpenseRecord;

/// A month of the year, ordered January to December.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CalendarMonth {
    /// Janeiro
    January = 1,
    /// Fevereiro
    February,
    /// Março
    March,
    /// Abril
    April,
    /// Maio
    May,
    /// Junho
    June,
    /// Julho
    July,
    /// Agosto
    August,
    /// Setembro
    September,
    /// Outubro
    October,
    /// Novembro
    November,
    /// Dezembro
    December,
}

impl CalendarMonth {
    /// All twelve months in calendar order.
    pub const ALL: [CalendarMonth; 12] = [
        CalendarMonth::January,
        CalendarMonth::February,
        CalendarMonth::March,
        CalendarMonth::April,
        CalendarMonth::May,
        CalendarMonth::June,
        CalendarMonth::July,
        CalendarMonth::August,
        CalendarMonth::September,
        CalendarMonth::October,
        CalendarMonth::November,
        CalendarMonth::December,
    ];

    /// The month number, 1 for January through 12 for December.
    pub fn number(self) -> u8 {
        self as u8
    }

    /// Get the month for a month number between 1 and 12.
    pub fn from_number(number: u8) -> Option<Self> {
        let index = number.checked_sub(1)?;
        Self::ALL.get(usize::from(index)).copied()
    }

    /// The full month name as shown to the user.
    pub fn name(self) -> &'static str {
        match self {
            CalendarMonth::January => "Janeiro",
            CalendarMonth::February => "Fevereiro",
            CalendarMonth::March => "Março",
            CalendarMonth::April => "Abril",
            CalendarMonth::May => "Maio",
            CalendarMonth::June => "Junho",
            CalendarMonth::July => "Julho",
            CalendarMonth::August => "Agosto",
            CalendarMonth::September => "Setembro",
            CalendarMonth::October => "Outubro",
            CalendarMonth::November => "Novembro",
            CalendarMonth::December => "Dezembro",
        }
    }

    /// Three-letter abbreviation used for chart axes.
    pub fn short_name(self) -> &'static str {
        match self {
            CalendarMonth::January => "Jan",
            CalendarMonth::February => "Fev",
            CalendarMonth::March => "Mar",
            CalendarMonth::April => "Abr",
            CalendarMonth::May => "Mai",
            CalendarMonth::June => "Jun",
            CalendarMonth::July => "Jul",
            CalendarMonth::August => "Ago",
            CalendarMonth::September => "Set",
            CalendarMonth::October => "Out",
            CalendarMonth::November => "Nov",
            CalendarMonth::December => "Dez",
        }
    }
}

impl From<Month> for CalendarMonth {
    fn from(month: Month) -> Self {
        match month {
            Month::January => CalendarMonth::January,
            Month::February => CalendarMonth::February,
            Month::March => CalendarMonth::March,
            Month::April => CalendarMonth::April,
            Month::May => CalendarMonth::May,
            Month::June => CalendarMonth::June,
            Month::July => CalendarMonth::July,
            Month::August => CalendarMonth::August,
            Month::September => CalendarMonth::September,
            Month::October => CalendarMonth::October,
            Month::November => CalendarMonth::November,
            Month::December => CalendarMonth::December,
        }
    }
}

impl fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A (year, month) grouping key.
///
/// The derived ordering compares the year first and then the calendar
/// position of the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeBucket {
    /// The calendar year.
    pub year: i32,
    /// The month within `year`.
    pub month: CalendarMonth,
}

impl TimeBucket {
    /// Create a bucket from a year and month.
    pub fn new(year: i32, month: CalendarMonth) -> Self {
        Self { year, month }
    }

    /// The bucket that `date` falls in.
    pub fn of(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month().into(),
        }
    }

    /// A compact label such as "Jan/2024" for chart axes.
    pub fn short_label(&self) -> String {
        format!("{}/{}", self.month.short_name(), self.year)
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.month.name(), self.year)
    }
}

/// An expense record annotated with the time bucket of its date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedRecord {
    /// The parsed record.
    pub record: ExpenseRecord,
    /// The (year, month) the record belongs to.
    pub bucket: TimeBucket,
}

/// Annotates each record with its [TimeBucket], keeping the input order.
pub fn index_records(records: Vec<ExpenseRecord>) -> Vec<IndexedRecord> {
    records
        .into_iter()
        .map(|record| IndexedRecord {
            bucket: TimeBucket::of(record.date),
            record,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::expenses::record::ExpenseRecord;

    use super::{CalendarMonth, TimeBucket, index_records};

    #[test]
    fn months_sort_by_calendar_position_not_name() {
        let mut months = vec![
            CalendarMonth::December,
            CalendarMonth::April,
            CalendarMonth::January,
            CalendarMonth::August,
        ];

        months.sort();

        assert_eq!(
            months,
            vec![
                CalendarMonth::January,
                CalendarMonth::April,
                CalendarMonth::August,
                CalendarMonth::December,
            ]
        );

        // Alphabetically "Abril" < "Agosto" < "Dezembro" < "Janeiro".
        let mut names: Vec<_> = months.iter().map(|month| month.name()).collect();
        names.sort();
        assert_eq!(names, vec!["Abril", "Agosto", "Dezembro", "Janeiro"]);
    }

    #[test]
    fn buckets_order_chronologically_across_years() {
        let january = TimeBucket::new(2023, CalendarMonth::January);
        let december = TimeBucket::new(2023, CalendarMonth::December);
        let next_january = TimeBucket::new(2024, CalendarMonth::January);

        assert!(january < december);
        assert!(december < next_january);
    }

    #[test]
    fn month_numbers_round_trip() {
        for month in CalendarMonth::ALL {
            assert_eq!(CalendarMonth::from_number(month.number()), Some(month));
        }

        assert_eq!(CalendarMonth::from_number(0), None);
        assert_eq!(CalendarMonth::from_number(13), None);
    }

    #[test]
    fn bucket_of_date() {
        let bucket = TimeBucket::of(date!(2000 - 02 - 10));

        assert_eq!(bucket, TimeBucket::new(2000, CalendarMonth::February));
        assert_eq!(bucket.to_string(), "Fevereiro/2000");
        assert_eq!(bucket.short_label(), "Fev/2000");
    }

    #[test]
    fn index_keeps_order_and_assigns_buckets() {
        let records = vec![
            ExpenseRecord {
                date: date!(2000 - 03 - 15),
                description: "Faculdade".to_owned(),
                category: "Educação".to_owned(),
                amount: Decimal::from(350),
            },
            ExpenseRecord {
                date: date!(1999 - 12 - 01),
                description: "Presente".to_owned(),
                category: "Lazer".to_owned(),
                amount: Decimal::from(20),
            },
        ];

        let indexed = index_records(records.clone());

        assert_eq!(indexed.len(), 2);
        assert_eq!(indexed[0].record, records[0]);
        assert_eq!(indexed[0].bucket, TimeBucket::new(2000, CalendarMonth::March));
        assert_eq!(indexed[1].bucket, TimeBucket::new(1999, CalendarMonth::December));
    }
}
