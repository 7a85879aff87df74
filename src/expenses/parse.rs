//! Turns a raw uploaded table into typed, date-sorted expense records.
//!
//! Parsing is all-or-nothing: the first invalid row (in the order the rows
//! appear in the upload) aborts the whole load.

use std::str::FromStr;

use rust_decimal::Decimal;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{Error, expenses::record::ExpenseRecord};

/// The largest amount accepted in a ledger or as a threshold.
///
/// Keeps every sum over an upload well inside the range of [Decimal].
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// The only accepted date format, e.g. "31/01/2024".
const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[day]/[month]/[year]");

/// A table read from an uploaded file before any validation.
///
/// Every cell is kept as text. Spreadsheet date cells are expected to have
/// been converted to `DD/MM/YYYY` text by the reader.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// The cells of the first row.
    pub headers: Vec<String>,
    /// The remaining rows. Rows may be shorter or longer than `headers`.
    pub rows: Vec<Vec<String>>,
}

/// The columns every ledger must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// The day of the expense.
    Date,
    /// A free text description.
    Description,
    /// The user-defined category.
    Category,
    /// The amount spent.
    Amount,
}

impl Column {
    /// Every required column, in template order.
    pub const ALL: [Column; 4] = [
        Column::Date,
        Column::Description,
        Column::Category,
        Column::Amount,
    ];

    /// Get the column with the canonical name `name`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|column| column.name() == name)
    }

    /// The canonical column name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Column::Date => "Date",
            Column::Description => "Description",
            Column::Category => "Category",
            Column::Amount => "Amount",
        }
    }

    /// The header written by the downloadable template.
    pub fn template_label(self) -> &'static str {
        match self {
            Column::Date => "Data",
            Column::Description => "Descrição",
            Column::Category => "Tipo",
            Column::Amount => "Valor",
        }
    }

    /// Lower case header labels accepted for this column.
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Column::Date => &["date", "data"],
            Column::Description => &["description", "descrição", "descricao"],
            Column::Category => &["category", "tipo", "categoria"],
            Column::Amount => &["amount", "valor"],
        }
    }

    fn matches_header(self, header: &str) -> bool {
        let header = header.trim().to_lowercase();
        self.aliases().contains(&header.as_str())
    }
}

/// Where each required column sits in a row.
#[derive(Debug, PartialEq, Eq)]
struct ColumnPositions {
    date: usize,
    description: usize,
    category: usize,
    amount: usize,
}

fn locate_columns(headers: &[String]) -> Result<ColumnPositions, Error> {
    let find = |column: Column| {
        headers
            .iter()
            .position(|header| column.matches_header(header))
            .ok_or_else(|| Error::MissingColumn(column.name().to_owned()))
    };

    Ok(ColumnPositions {
        date: find(Column::Date)?,
        description: find(Column::Description)?,
        category: find(Column::Category)?,
        amount: find(Column::Amount)?,
    })
}

/// Parses and validates every row of `table`, returning the records sorted by date.
///
/// Rows where every cell is blank are skipped. The sort is stable, so
/// records sharing a date keep their upload order.
///
/// # Errors
///
/// Returns the first error found, scanning rows top to bottom:
/// - [Error::MissingColumn] if a required column is absent from the header,
/// - [Error::MalformedDate] if a date is missing or not `DD/MM/YYYY`,
/// - [Error::MissingValue] if a description or category is blank,
/// - [Error::InvalidAmount] if an amount is missing, not a number or negative,
/// - [Error::EmptyUpload] if there are no data rows.
pub fn parse_records(table: &RawTable) -> Result<Vec<ExpenseRecord>, Error> {
    let columns = locate_columns(&table.headers)?;
    let mut records = Vec::with_capacity(table.rows.len());

    for (row, cells) in table.rows.iter().enumerate() {
        if cells.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let cell = |position: usize| cells.get(position).map(|cell| cell.trim()).unwrap_or("");

        let date_text = cell(columns.date);
        let date = parse_date(date_text).ok_or_else(|| Error::MalformedDate {
            row,
            value: date_text.to_owned(),
        })?;

        let description = required_text(cell(columns.description), row, Column::Description)?;
        let category = required_text(cell(columns.category), row, Column::Category)?;

        let amount_text = cell(columns.amount);
        let amount = parse_amount(amount_text).ok_or_else(|| Error::InvalidAmount {
            row,
            value: amount_text.to_owned(),
        })?;

        records.push(ExpenseRecord {
            date,
            description,
            category,
            amount,
        });
    }

    if records.is_empty() {
        return Err(Error::EmptyUpload);
    }

    records.sort_by_key(|record| record.date);

    Ok(records)
}

fn required_text(text: &str, row: usize, column: Column) -> Result<String, Error> {
    if text.is_empty() {
        Err(Error::MissingValue {
            row,
            column: column.name().to_owned(),
        })
    } else {
        Ok(text.to_owned())
    }
}

/// Parses a `DD/MM/YYYY` date, e.g. "01/02/2000" is the 1st of February.
pub fn parse_date(text: &str) -> Option<Date> {
    Date::parse(text.trim(), DATE_FORMAT).ok()
}

/// Parses a decimal amount between zero and [MAX_AMOUNT].
///
/// Both "100.50" and "100,50" are accepted. Thousands separators are not,
/// so a lone comma is always read as the decimal separator: "1,234" is
/// 1.234, not 1234.
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let text = text.trim();

    if text.is_empty() {
        return None;
    }

    let normalized = if !text.contains('.') && text.matches(',').count() == 1 {
        text.replace(',', ".")
    } else {
        text.to_owned()
    };

    if !normalized
        .chars()
        .all(|c| c.is_ascii_digit() || c == '.' || c == '-' || c == '+')
    {
        return None;
    }

    let amount = Decimal::from_str(&normalized).ok()?;

    if amount < Decimal::ZERO || amount > Decimal::from(MAX_AMOUNT) {
        None
    } else {
        // Turns "-0" into "0".
        Some(amount.abs())
    }
}
