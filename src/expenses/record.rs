//! The typed expense record produced by parsing an uploaded ledger.

use rust_decimal::{Decimal, RoundingStrategy};
use time::Date;

/// One row of the user's expense ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseRecord {
    /// The day the expense happened.
    pub date: Date,
    /// Free text describing the expense, never empty.
    pub description: String,
    /// The user-defined category of the expense, never empty.
    pub category: String,
    /// The non-negative amount spent.
    pub amount: Decimal,
}

/// Formats `date` as `DD/MM/YYYY`, the format expected in uploaded ledgers.
pub fn format_date(date: Date) -> String {
    format!(
        "{:02}/{:02}/{:04}",
        date.day(),
        u8::from(date.month()),
        date.year()
    )
}

/// Rounds `amount` to two decimal places for display, with halves rounded
/// away from zero.
///
/// Sums are kept exact everywhere else, only call this right before showing
/// an amount to the user.
pub fn round_for_display(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
