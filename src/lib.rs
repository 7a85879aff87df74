//! Sapo Saver is a web app for analysing personal expenses.
//!
//! Users upload a spreadsheet of dated expense records and get back summary
//! tables, monthly aggregates and charts. Uploads are only held in memory for
//! the duration of a browser session and are never written to disk.
//!
//! The analysis pipeline lives in [expenses] and is synchronous and free of
//! side effects. Everything else is the HTML front end that feeds it.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod config;
mod dashboard;
mod endpoints;
pub mod expenses;
mod export;
mod home;
mod html;
mod logging;
mod navigation;
mod not_found;
mod routing;
mod session;
mod template;
#[cfg(test)]
mod test_utils;
mod upload;

pub use app_state::AppState;
pub use config::{AppConfig, DisplayConfig};
pub use export::{ExportCell, SheetTable, export_workbook};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use upload::{UploadKind, read_table};

use crate::{alert::Alert, expenses::Column, html::error_view};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The date cell of a data row is missing or is not a `DD/MM/YYYY` date.
    ///
    /// `row` is the zero-based index of the row among the data rows of the
    /// uploaded table, i.e. the header is not counted.
    #[error("row {row}: \"{value}\" is not a date in the format DD/MM/YYYY")]
    MalformedDate {
        /// Zero-based index of the offending data row.
        row: usize,
        /// The text found in the date cell.
        value: String,
    },

    /// The amount cell of a data row is missing, not a number, negative or
    /// larger than [expenses::MAX_AMOUNT].
    #[error("row {row}: \"{value}\" is not a number between 0 and {max}", max = expenses::MAX_AMOUNT)]
    InvalidAmount {
        /// Zero-based index of the offending data row.
        row: usize,
        /// The text found in the amount cell.
        value: String,
    },

    /// The description or category cell of a data row is blank.
    #[error("row {row}: the column \"{column}\" is empty")]
    MissingValue {
        /// Zero-based index of the offending data row.
        row: usize,
        /// The canonical name of the blank column.
        column: String,
    },

    /// The header row does not contain one of the required columns.
    #[error("the required column \"{0}\" is missing")]
    MissingColumn(String),

    /// The uploaded table has no data rows after the header.
    #[error("the uploaded table has no rows")]
    EmptyUpload,

    /// The uploaded file is neither a CSV file nor a spreadsheet workbook.
    #[error("unsupported file \"{0}\"")]
    UnsupportedFile(String),

    /// The uploaded file looked like a supported format but could not be read.
    #[error("could not read the spreadsheet: {0}")]
    InvalidSpreadsheet(String),

    /// The multipart form could not be parsed.
    #[error("could not parse multipart form: {0}")]
    Multipart(String),

    /// The income or budget value entered by the user is not a number between
    /// zero and [expenses::MAX_AMOUNT].
    #[error("invalid value \"{0}\" for {1}")]
    InvalidThreshold(String, String),

    /// Writing an `.xlsx` workbook failed.
    #[error("could not export the spreadsheet: {0}")]
    SpreadsheetExport(String),

    /// The current session has no uploaded ledger.
    #[error("no spreadsheet has been uploaded in this session")]
    NoUpload,

    /// Could not acquire the session store lock.
    #[error("could not acquire the session store lock")]
    SessionLock,
}

impl Error {
    /// The one-based line number, as shown by spreadsheet programs, of the
    /// row that caused a validation error.
    ///
    /// Line 1 is the header, so data row 0 is on line 2.
    pub fn spreadsheet_line(&self) -> Option<usize> {
        match self {
            Error::MalformedDate { row, .. }
            | Error::InvalidAmount { row, .. }
            | Error::MissingValue { row, .. } => Some(row + 2),
            _ => None,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NoUpload => (
                StatusCode::NOT_FOUND,
                error_view(
                    "Nenhuma planilha",
                    "404",
                    "Nenhuma planilha foi enviada.",
                    "Envie sua planilha na página de análise e tente novamente.",
                ),
            )
                .into_response(),
            Error::SpreadsheetExport(_) => {
                tracing::error!("{self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_view(
                        "Erro",
                        "500",
                        "Não foi possível gerar a planilha.",
                        "Tente novamente mais tarde.",
                    ),
                )
                    .into_response()
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_view(
                        "Erro",
                        "500",
                        "Desculpe, algo deu errado.",
                        "Tente novamente mais tarde.",
                    ),
                )
                    .into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub(crate) fn into_alert_response(self) -> Response {
        let line = self.spreadsheet_line().unwrap_or_default();
        let label = |column: &str| {
            Column::from_name(column)
                .map(Column::template_label)
                .unwrap_or(column)
                .to_owned()
        };

        let (status_code, alert) = match self {
            Error::MalformedDate { value, .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::Error {
                    message: "Data inválida".to_owned(),
                    details: format!(
                        "A data \"{value}\" na linha {line} não está no formato dd/mm/aaaa."
                    ),
                },
            ),
            Error::InvalidAmount { value, .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::Error {
                    message: "Valor inválido".to_owned(),
                    details: format!(
                        "O valor \"{value}\" na linha {line} precisa ser um número entre 0 e 1 trilhão."
                    ),
                },
            ),
            Error::MissingValue { column, .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::Error {
                    message: "Campo vazio".to_owned(),
                    details: format!(
                        "A coluna \"{}\" está vazia na linha {line}.",
                        label(&column)
                    ),
                },
            ),
            Error::MissingColumn(column) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::Error {
                    message: "Coluna ausente".to_owned(),
                    details: format!(
                        "A planilha precisa ter a coluna \"{}\". \
                        Mantenha o nome das colunas conforme a planilha modelo.",
                        label(&column)
                    ),
                },
            ),
            Error::EmptyUpload => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::Error {
                    message: "Planilha vazia".to_owned(),
                    details: "A planilha não tem nenhum gasto registrado.".to_owned(),
                },
            ),
            Error::UnsupportedFile(file_name) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Formato não suportado".to_owned(),
                    details: format!(
                        "O arquivo \"{file_name}\" precisa ser uma planilha \
                        (.xlsx, .xls, .ods) ou um arquivo .csv."
                    ),
                },
            ),
            Error::InvalidSpreadsheet(_) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Não foi possível ler a planilha".to_owned(),
                    details: "Verifique se o arquivo não está corrompido.".to_owned(),
                },
            ),
            Error::Multipart(_) => (
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: "Selecione um arquivo para enviar.".to_owned(),
                },
            ),
            Error::NoUpload => (
                StatusCode::NOT_FOUND,
                Alert::ErrorSimple {
                    message: "Nenhuma planilha foi enviada nesta sessão.".to_owned(),
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Algo deu errado".to_owned(),
                        details: "Ocorreu um erro inesperado, tente novamente mais tarde."
                            .to_owned(),
                    },
                )
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}
