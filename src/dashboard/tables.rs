//! Table views for the analysis page.
//!
//! Provides HTML tables for the monthly totals, the month by category
//! breakdown and the filtered records.

use maud::{Markup, html};

use crate::{
    config::DisplayConfig,
    expenses::{AggregateRow, CategoryPivot, IndexedRecord, TimeBucket, format_date},
    html::{TABLE_CELL_STYLE, TABLE_ROW_STYLE, format_currency},
};

// Table cell styles
const TABLE_HEADER_CELL_STYLE: &str = "px-3 py-3 text-center min-w-[100px]";
const TABLE_HEADER_FIRST_CELL_STYLE: &str =
    "px-3 py-3 sticky left-0 bg-gray-100 dark:bg-gray-700 z-10 font-semibold";
const TABLE_STICKY_CELL_STYLE: &str = "px-3 py-4 font-medium text-gray-900 dark:text-white sticky left-0 bg-white dark:bg-gray-800 z-10";
const TABLE_DATA_CELL_STYLE: &str = "text-center whitespace-nowrap";
const TABLE_FOOTER_ROW_STYLE: &str =
    "font-semibold text-gray-900 bg-gray-50 dark:bg-gray-700 dark:text-white";

/// Renders the total spent per month, followed by a subtotal row per year.
pub(super) fn monthly_totals_table(
    monthly: &[AggregateRow<TimeBucket>],
    yearly: &[AggregateRow<i32>],
    display: &DisplayConfig,
) -> Markup {
    html! {
        div {
            h3 class="text-xl font-semibold mb-4" { "Gastos por mês" }

            div class="overflow-x-auto rounded-lg shadow" {
                table id="monthly-totals" class="w-full text-sm text-left text-gray-500 dark:text-gray-400" {
                    thead class="text-xs text-gray-900 uppercase bg-gray-100 dark:bg-gray-700 dark:text-gray-400" {
                        tr {
                            th scope="col" class={(TABLE_HEADER_FIRST_CELL_STYLE) " text-left"} {
                                "Mês"
                            }
                            th scope="col" class={(TABLE_HEADER_CELL_STYLE) " font-bold"} {
                                "Total"
                            }
                        }
                    }
                    tbody {
                        @for row in monthly {
                            tr class=(TABLE_ROW_STYLE) {
                                th scope="row" class={(TABLE_STICKY_CELL_STYLE) " text-left"} {
                                    (row.key)
                                }
                                td class={(TABLE_CELL_STYLE) " " (TABLE_DATA_CELL_STYLE)} {
                                    (format_currency(row.total, display))
                                }
                            }
                        }
                    }
                    tfoot {
                        @for row in yearly {
                            tr class=(TABLE_FOOTER_ROW_STYLE) {
                                th scope="row" class={(TABLE_CELL_STYLE) " text-left"} {
                                    "Total " (row.key)
                                }
                                td class={(TABLE_CELL_STYLE) " " (TABLE_DATA_CELL_STYLE)} {
                                    (format_currency(row.total, display))
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Renders the month by category breakdown with a total column and row.
///
/// Months without spending in a category show zero.
pub(super) fn category_pivot_table(pivot: &CategoryPivot, display: &DisplayConfig) -> Markup {
    html! {
        div class="xl:col-span-2" {
            h3 class="text-xl font-semibold mb-4" { "Gastos mensais por tipo" }

            div class="overflow-x-auto rounded-lg shadow" {
                table id="category-pivot" class="w-full text-sm text-left text-gray-500 dark:text-gray-400" {
                    thead class="text-xs text-gray-900 uppercase bg-gray-100 dark:bg-gray-700 dark:text-gray-400" {
                        tr {
                            th scope="col" class={(TABLE_HEADER_FIRST_CELL_STYLE) " text-left"} {
                                "Mês"
                            }
                            @for category in pivot.categories() {
                                th scope="col" class={(TABLE_HEADER_CELL_STYLE) " font-semibold"} {
                                    (category)
                                }
                            }
                            th scope="col" class={(TABLE_HEADER_CELL_STYLE) " font-bold"} {
                                "Total"
                            }
                        }
                    }
                    tbody {
                        @for (bucket_index, bucket) in pivot.buckets().iter().enumerate() {
                            tr class=(TABLE_ROW_STYLE) {
                                th scope="row" class={(TABLE_STICKY_CELL_STYLE) " text-left"} {
                                    (bucket)
                                }
                                @for amount in pivot.row(bucket_index) {
                                    td class={(TABLE_CELL_STYLE) " " (TABLE_DATA_CELL_STYLE)} {
                                        (format_currency(*amount, display))
                                    }
                                }
                                td class={(TABLE_CELL_STYLE) " " (TABLE_DATA_CELL_STYLE) " font-bold"} {
                                    (format_currency(pivot.row_total(bucket_index), display))
                                }
                            }
                        }
                    }
                    tfoot {
                        tr class=(TABLE_FOOTER_ROW_STYLE) {
                            th scope="row" class={(TABLE_CELL_STYLE) " text-left"} {
                                "Total"
                            }
                            @for category_index in 0..pivot.categories().len() {
                                td class={(TABLE_CELL_STYLE) " " (TABLE_DATA_CELL_STYLE)} {
                                    (format_currency(pivot.column_total(category_index), display))
                                }
                            }
                            td class={(TABLE_CELL_STYLE) " " (TABLE_DATA_CELL_STYLE)} {
                                (format_currency(pivot.grand_total(), display))
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Renders the filtered records in date order.
pub(super) fn records_table(records: &[IndexedRecord], display: &DisplayConfig) -> Markup {
    html! {
        div class="xl:col-span-2" {
            h3 class="text-xl font-semibold mb-4" { "Gastos registrados" }

            div class="overflow-x-auto rounded-lg shadow" {
                table id="records" class="w-full text-sm text-left text-gray-500 dark:text-gray-400" {
                    thead class="text-xs text-gray-900 uppercase bg-gray-100 dark:bg-gray-700 dark:text-gray-400" {
                        tr {
                            th scope="col" class=(TABLE_HEADER_FIRST_CELL_STYLE) { "Data" }
                            th scope="col" class={(TABLE_HEADER_CELL_STYLE) " text-left"} { "Descrição" }
                            th scope="col" class={(TABLE_HEADER_CELL_STYLE) " text-left"} { "Tipo" }
                            th scope="col" class=(TABLE_HEADER_CELL_STYLE) { "Valor" }
                        }
                    }
                    tbody {
                        @for indexed in records {
                            tr class=(TABLE_ROW_STYLE) {
                                td class={(TABLE_STICKY_CELL_STYLE) " whitespace-nowrap"} {
                                    (format_date(indexed.record.date))
                                }
                                td class=(TABLE_CELL_STYLE) { (indexed.record.description) }
                                td class=(TABLE_CELL_STYLE) { (indexed.record.category) }
                                td class={(TABLE_CELL_STYLE) " " (TABLE_DATA_CELL_STYLE)} {
                                    (format_currency(indexed.record.amount, display))
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
