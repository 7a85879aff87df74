//! Exporting tables as `.xlsx` workbooks.

mod analysis;
mod workbook;

pub use analysis::export_analysis;
pub(crate) use analysis::{records_sheet, xlsx_attachment};
pub use workbook::{ExportCell, SheetTable, export_workbook};
