//! Reading uploaded CSV files and spreadsheet workbooks into a [RawTable].

use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use time::{Date, Duration, macros::date, macros::format_description};

use crate::{
    Error,
    expenses::{RawTable, format_date},
};

/// The formats an upload can be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    /// Comma or semicolon separated text.
    Csv,
    /// An Excel or OpenDocument workbook, only the first sheet is read.
    Workbook,
}

impl UploadKind {
    /// Work out the format of an upload from its file name, falling back to
    /// the content type sent by the browser.
    ///
    /// # Errors
    ///
    /// Returns [Error::UnsupportedFile] if the file is neither CSV nor a workbook.
    pub fn detect(file_name: &str, content_type: Option<&str>) -> Result<Self, Error> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, extension)| extension.to_ascii_lowercase());

        match extension.as_deref() {
            Some("csv") => return Ok(UploadKind::Csv),
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => return Ok(UploadKind::Workbook),
            _ => {}
        }

        match content_type {
            Some("text/csv") => Ok(UploadKind::Csv),
            Some(
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
                | "application/vnd.ms-excel"
                | "application/vnd.oasis.opendocument.spreadsheet",
            ) => Ok(UploadKind::Workbook),
            _ => Err(Error::UnsupportedFile(file_name.to_owned())),
        }
    }
}

/// Read the header row and data rows of an upload.
///
/// Cells are returned as text, workbook date cells are converted to
/// `DD/MM/YYYY`.
///
/// # Errors
///
/// Returns [Error::EmptyUpload] if there is no header row, or
/// [Error::InvalidSpreadsheet] if the bytes cannot be read as `kind`.
pub fn read_table(kind: UploadKind, bytes: &[u8]) -> Result<RawTable, Error> {
    let mut rows = match kind {
        UploadKind::Csv => read_csv_rows(bytes)?,
        UploadKind::Workbook => read_workbook_rows(bytes)?,
    }
    .into_iter();

    let headers = rows.next().ok_or(Error::EmptyUpload)?;

    Ok(RawTable {
        headers,
        rows: rows.collect(),
    })
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

fn read_csv_rows(bytes: &[u8]) -> Result<Vec<Vec<String>>, Error> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .delimiter(detect_delimiter(bytes))
        .from_reader(bytes);

    let mut rows: Vec<Vec<String>> = Vec::new();

    for record in reader.byte_records() {
        let record = record.map_err(|error| Error::InvalidSpreadsheet(error.to_string()))?;

        if !rows.is_empty() {
            let start = record
                .position()
                .map_or(0, |position| position.byte() as usize)
                .min(bytes.len());
            let skipped = blank_lines_at(bytes, start);
            rows.extend(std::iter::repeat_with(Vec::new).take(skipped));
        }

        rows.push(
            record
                .iter()
                .map(|field| String::from_utf8_lossy(field).into_owned())
                .collect(),
        );
    }

    Ok(rows)
}

/// The number of empty lines in the run of line breaks around `position`.
///
/// The CSV reader drops empty lines, but spreadsheet programs show them as
/// rows, so they are kept as empty rows for the line numbers in error
/// messages to match.
fn blank_lines_at(bytes: &[u8], position: usize) -> usize {
    let is_line_break = |byte: &&u8| **byte == b'\n' || **byte == b'\r';
    let before = bytes[..position].iter().rev().take_while(is_line_break).count();
    let after = bytes[position..].iter().take_while(is_line_break).count();
    let separators = &bytes[position - before..position + after];

    // "\r\n" is one line break, as is a lone "\r" or "\n".
    let line_breaks = separators
        .iter()
        .enumerate()
        .filter(|&(index, &byte)| byte == b'\n' || separators.get(index + 1) != Some(&b'\n'))
        .count();

    line_breaks.saturating_sub(1)
}

/// Spreadsheet programs set to a locale with a decimal comma export CSV with
/// semicolons, so pick whichever separator appears more often in the header.
fn detect_delimiter(bytes: &[u8]) -> u8 {
    let header = bytes.split(|&byte| byte == b'\n').next().unwrap_or_default();
    let count = |delimiter: u8| header.iter().filter(|&&byte| byte == delimiter).count();

    if count(b';') > count(b',') {
        b';'
    } else {
        b','
    }
}

fn read_workbook_rows(bytes: &[u8]) -> Result<Vec<Vec<String>>, Error> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|error| Error::InvalidSpreadsheet(error.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| Error::InvalidSpreadsheet("the workbook has no sheets".to_owned()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|error| Error::InvalidSpreadsheet(error.to_string()))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.clone(),
        Data::Float(number) => format!("{number}"),
        Data::Int(number) => format!("{number}"),
        Data::Bool(value) => value.to_string(),
        Data::Error(error) => format!("#{error:?}"),
        Data::DateTime(date_time) => {
            let serial = date_time.as_f64();
            date_from_serial(serial)
                .map(format_date)
                .unwrap_or_else(|| format!("{serial}"))
        }
        Data::DateTimeIso(text) => date_from_iso(text)
            .map(format_date)
            .unwrap_or_else(|| text.clone()),
        Data::DurationIso(text) => text.clone(),
    }
}

/// The serial of 31/12/9999, the last date spreadsheet programs can show.
const MAX_DATE_SERIAL: f64 = 2_958_465.0;

/// Converts a spreadsheet date serial, the number of days since 30/12/1899,
/// to a date. The time of day is dropped.
fn date_from_serial(serial: f64) -> Option<Date> {
    if !(0.0..=MAX_DATE_SERIAL).contains(&serial) {
        return None;
    }

    let days = serial.floor() as i64;
    date!(1899 - 12 - 30).checked_add(Duration::days(days))
}

fn date_from_iso(text: &str) -> Option<Date> {
    let date_part = text.get(..10)?;
    Date::parse(date_part, format_description!("[year]-[month]-[day]")).ok()
}
