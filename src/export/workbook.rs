//! Writing tables to an `.xlsx` workbook.

use std::{collections::HashSet, str::FromStr};

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::{Error, expenses::round_for_display};

/// The content type of an `.xlsx` workbook.
pub(crate) const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// A single cell of an exported table.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportCell {
    /// Plain text.
    Text(String),
    /// A number written as is.
    Number(f64),
    /// An amount of money, rounded to two decimal places.
    Amount(Decimal),
    /// An amount of money written unrounded and shown with two decimal
    /// places, so reading the file back gives the same amount.
    ///
    /// Amounts that a spreadsheet number cannot hold exactly are written
    /// as text.
    ExactAmount(Decimal),
}

impl From<&str> for ExportCell {
    fn from(text: &str) -> Self {
        ExportCell::Text(text.to_owned())
    }
}

impl From<String> for ExportCell {
    fn from(text: String) -> Self {
        ExportCell::Text(text)
    }
}

impl From<Decimal> for ExportCell {
    fn from(amount: Decimal) -> Self {
        ExportCell::Amount(amount)
    }
}

/// A table written to its own worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    /// The worksheet name, at most 31 characters and unique in the workbook.
    pub name: String,
    /// The header row, written in bold.
    pub headers: Vec<String>,
    /// The data rows below the header.
    pub rows: Vec<Vec<ExportCell>>,
}

impl SheetTable {
    /// Create an empty table with a header row.
    pub fn new<I, S>(name: &str, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_owned(),
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a data row.
    pub fn push_row(&mut self, row: Vec<ExportCell>) {
        self.rows.push(row);
    }
}

/// Write every table to its own worksheet, in order, and return the bytes of
/// the `.xlsx` file.
///
/// # Errors
///
/// Returns [Error::SpreadsheetExport] if a sheet name is invalid or used more
/// than once, or if the workbook cannot be written.
pub fn export_workbook(tables: &[SheetTable]) -> Result<Vec<u8>, Error> {
    let mut seen_names = HashSet::new();
    for table in tables {
        if !seen_names.insert(table.name.to_lowercase()) {
            return Err(Error::SpreadsheetExport(format!(
                "the sheet name \"{}\" is used more than once",
                table.name
            )));
        }
    }

    let header_format = Format::new().set_bold();
    let amount_format = Format::new().set_num_format("0.00");

    let mut workbook = Workbook::new();

    for table in tables {
        let worksheet = workbook.add_worksheet().set_name(&table.name).map_err(|error| {
            Error::SpreadsheetExport(format!("invalid sheet name \"{}\": {error}", table.name))
        })?;

        write_table(worksheet, table, &header_format, &amount_format)?;
        worksheet.autofit();
    }

    workbook
        .save_to_buffer()
        .map_err(|error| Error::SpreadsheetExport(error.to_string()))
}

fn write_table(
    worksheet: &mut Worksheet,
    table: &SheetTable,
    header_format: &Format,
    amount_format: &Format,
) -> Result<(), Error> {
    for (column, header) in table.headers.iter().enumerate() {
        let (row, column) = cell_position(0, column)?;
        worksheet
            .write_string_with_format(row, column, header, header_format)
            .map_err(|error| Error::SpreadsheetExport(error.to_string()))?;
    }

    for (row_index, cells) in table.rows.iter().enumerate() {
        for (column, cell) in cells.iter().enumerate() {
            let (row, column) = cell_position(row_index + 1, column)?;

            let result = match cell {
                ExportCell::Text(text) => worksheet.write_string(row, column, text),
                ExportCell::Number(number) => worksheet.write_number(row, column, *number),
                ExportCell::Amount(amount) => worksheet.write_number_with_format(
                    row,
                    column,
                    round_for_display(*amount).to_f64().unwrap_or_default(),
                    amount_format,
                ),
                ExportCell::ExactAmount(amount) => match exact_number(*amount) {
                    Some(number) => {
                        worksheet.write_number_with_format(row, column, number, amount_format)
                    }
                    None => worksheet.write_string(row, column, amount.to_string()),
                },
            };

            result.map_err(|error| {
                Error::SpreadsheetExport(format!(
                    "could not write cell ({row}, {column}) of \"{}\": {error}",
                    table.name
                ))
            })?;
        }
    }

    Ok(())
}

/// The spreadsheet number for `amount`, if it reads back as the same amount.
fn exact_number(amount: Decimal) -> Option<f64> {
    let number = amount.to_f64()?;
    let read_back = Decimal::from_str(&number.to_string()).ok()?;

    (read_back == amount).then_some(number)
}

fn cell_position(row: usize, column: usize) -> Result<(u32, u16), Error> {
    let row = u32::try_from(row)
        .map_err(|_| Error::SpreadsheetExport(format!("row {row} is out of range")))?;
    let column = u16::try_from(column)
        .map_err(|_| Error::SpreadsheetExport(format!("column {column} is out of range")))?;

    Ok((row, column))
}

#[cfg(test)]
mod tests {
    use std::{io::Cursor, str::FromStr};

    use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
    use rust_decimal::Decimal;

    use crate::Error;

    use super::{ExportCell, SheetTable, export_workbook};

    fn open(bytes: Vec<u8>) -> Xlsx<Cursor<Vec<u8>>> {
        open_workbook_from_rs(Cursor::new(bytes)).expect("could not open exported workbook")
    }

    #[test]
    fn writes_one_sheet_per_table() {
        let mut first = SheetTable::new("Tipos", ["Tipo", "Total"]);
        first.push_row(vec![
            "Lazer".into(),
            Decimal::from_str("70.005").unwrap().into(),
        ]);
        let mut second = SheetTable::new("Mensal", ["Ano", "Mês", "Total"]);
        second.push_row(vec![
            ExportCell::Number(2000.0),
            "Janeiro".into(),
            Decimal::from(100).into(),
        ]);

        let bytes = export_workbook(&[first, second]).unwrap();
        let mut workbook = open(bytes);

        assert_eq!(workbook.sheet_names(), vec!["Tipos", "Mensal"]);

        let range = workbook.worksheet_range("Tipos").unwrap();
        let rows: Vec<_> = range.rows().collect();
        assert_eq!(
            rows[0],
            &[Data::String("Tipo".to_owned()), Data::String("Total".to_owned())]
        );
        assert_eq!(
            rows[1],
            &[Data::String("Lazer".to_owned()), Data::Float(70.01)]
        );

        let range = workbook.worksheet_range("Mensal").unwrap();
        assert_eq!(range.get_value((1, 0)), Some(&Data::Float(2000.0)));
    }

    #[test]
    fn exact_amounts_are_not_rounded() {
        let mut table = SheetTable::new("Dados", ["Valor"]);
        for amount in ["0.125", "70", "0.1234567890123456789"] {
            table.push_row(vec![ExportCell::ExactAmount(
                Decimal::from_str(amount).unwrap(),
            )]);
        }

        let mut workbook = open(export_workbook(&[table]).unwrap());

        let range = workbook.worksheet_range("Dados").unwrap();
        assert_eq!(range.get_value((1, 0)), Some(&Data::Float(0.125)));
        assert_eq!(range.get_value((2, 0)), Some(&Data::Float(70.0)));
        assert_eq!(
            range.get_value((3, 0)),
            Some(&Data::String("0.1234567890123456789".to_owned()))
        );
    }

    #[test]
    fn empty_table_keeps_header() {
        let table = SheetTable::new("Dados", ["Data", "Descrição", "Tipo", "Valor"]);

        let mut workbook = open(export_workbook(&[table]).unwrap());

        let range = workbook.worksheet_range("Dados").unwrap();
        assert_eq!(range.height(), 1);
        assert_eq!(range.get_value((0, 3)), Some(&Data::String("Valor".to_owned())));
    }

    #[test]
    fn rejects_duplicate_sheet_names() {
        let tables = [
            SheetTable::new("Dados", ["A"]),
            SheetTable::new("dados", ["B"]),
        ];

        let result = export_workbook(&tables);

        assert!(matches!(result, Err(Error::SpreadsheetExport(_))));
    }

    #[test]
    fn rejects_invalid_sheet_names() {
        for name in ["", "Mensal/Tipo", "um nome de planilha longo demais para o excel"] {
            let result = export_workbook(&[SheetTable::new(name, ["A"])]);

            assert!(
                matches!(result, Err(Error::SpreadsheetExport(_))),
                "expected \"{name}\" to be rejected, got {result:?}"
            );
        }
    }
}
