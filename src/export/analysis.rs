//! Downloading the current analysis as a workbook.

use axum::{
    extract::{FromRef, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{CookieJar, Query};

use crate::{
    AppState, Error,
    dashboard::AnalysisQuery,
    expenses::{Analysis, Column, ExpenseRecord, Thresholds, format_date},
    export::workbook::{ExportCell, SheetTable, XLSX_CONTENT_TYPE, export_workbook},
    session::{SessionStore, session_id_from_jar},
};

/// The file name suggested to the browser for the analysis download.
const EXPORT_FILE_NAME: &str = "analise-dos-gastos.xlsx";

/// The state needed for exporting an analysis.
#[derive(Debug, Clone)]
pub struct ExportState {
    /// The uploads of every active session.
    pub sessions: SessionStore,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            sessions: state.sessions.clone(),
        }
    }
}

/// Download the analysis of the session's upload as an `.xlsx` workbook,
/// filtered the same way as the analysis page.
pub async fn export_analysis(
    State(state): State<ExportState>,
    jar: CookieJar,
    Query(query): Query<AnalysisQuery>,
) -> Result<Response, Error> {
    let ledger = match session_id_from_jar(&jar) {
        Some(session_id) => state.sessions.get(session_id)?,
        None => None,
    }
    .ok_or(Error::NoUpload)?;

    let analysis = Analysis::run(&ledger.records, &query.criteria(), Thresholds::default());
    let bytes = export_workbook(&analysis_sheets(&analysis))?;

    tracing::info!(
        "Exported {} of {} records from '{}'",
        analysis.records.len(),
        ledger.records.len(),
        ledger.file_name
    );

    Ok(xlsx_attachment(EXPORT_FILE_NAME, bytes))
}

/// A response that makes the browser save `bytes` as `file_name`.
pub(crate) fn xlsx_attachment(file_name: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (CONTENT_TYPE, XLSX_CONTENT_TYPE.to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// The `Dados` sheet, laid out like the upload template so the file can be
/// uploaded again.
pub(crate) fn records_sheet<'a>(records: impl IntoIterator<Item = &'a ExpenseRecord>) -> SheetTable {
    let mut sheet = SheetTable::new("Dados", Column::ALL.map(Column::template_label));

    for record in records {
        sheet.push_row(vec![
            format_date(record.date).into(),
            record.description.as_str().into(),
            record.category.as_str().into(),
            ExportCell::ExactAmount(record.amount),
        ]);
    }

    sheet
}

fn analysis_sheets(analysis: &Analysis) -> Vec<SheetTable> {
    let records = records_sheet(analysis.records.iter().map(|indexed| &indexed.record));

    let mut monthly = SheetTable::new("Mensal", ["Ano", "Mês", "Total"]);
    for row in &analysis.monthly {
        monthly.push_row(vec![
            ExportCell::Number(f64::from(row.key.year)),
            row.key.month.name().into(),
            row.total.into(),
        ]);
    }

    let mut categories = SheetTable::new("Tipos", ["Tipo", "Total"]);
    for row in &analysis.categories {
        categories.push_row(vec![row.key.as_str().into(), row.total.into()]);
    }

    let pivot = &analysis.pivot;
    let mut monthly_by_category = SheetTable::new(
        "Mensal por Tipo",
        ["Mês"]
            .into_iter()
            .map(str::to_owned)
            .chain(pivot.categories().iter().cloned())
            .chain(["Total".to_owned()]),
    );
    for (bucket_index, bucket) in pivot.buckets().iter().enumerate() {
        let mut row = vec![ExportCell::Text(bucket.to_string())];
        row.extend(pivot.row(bucket_index).iter().copied().map(ExportCell::Amount));
        row.push(pivot.row_total(bucket_index).into());

        monthly_by_category.push_row(row);
    }

    vec![records, monthly, categories, monthly_by_category]
}
