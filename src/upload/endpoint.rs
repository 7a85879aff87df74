use axum::{
    body::Bytes,
    extract::{FromRef, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use axum_htmx::HxRedirect;

use crate::{
    AppState, Error, endpoints,
    expenses::{self, IndexedRecord},
    session::{
        Ledger, SessionStore, expired_session_cookie, session_cookie, session_id_from_jar,
    },
    upload::table::{UploadKind, read_table},
};

/// The name of the multipart field holding the uploaded file.
const FILE_FIELD: &str = "file";

/// The state needed for uploading and discarding ledgers.
#[derive(Debug, Clone)]
pub struct UploadState {
    /// The uploads of every active session.
    pub sessions: SessionStore,
}

impl FromRef<AppState> for UploadState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            sessions: state.sessions.clone(),
        }
    }
}

/// A file taken from the upload form.
struct UploadedFile {
    file_name: String,
    content_type: Option<String>,
    bytes: Bytes,
}

/// Route handler for uploading a ledger.
///
/// The file is parsed and validated as a whole. If every row is valid the
/// ledger replaces any earlier upload of the session and the client is
/// redirected to the analysis page, otherwise nothing is stored and an alert
/// describing the first invalid row is returned.
pub async fn upload_ledger(
    State(state): State<UploadState>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> Response {
    let file = match read_uploaded_file(&mut multipart).await {
        Ok(file) => file,
        Err(error) => return error.into_alert_response(),
    };

    let records = match parse_uploaded_file(&file) {
        Ok(records) => records,
        Err(error) => {
            tracing::info!("Rejected upload '{}': {error}", file.file_name);
            return error.into_alert_response();
        }
    };

    let session_id = session_id_from_jar(&jar).unwrap_or_default();
    let record_count = records.len();

    if let Err(error) = state
        .sessions
        .insert(session_id, Ledger::new(file.file_name, records))
    {
        return error.into_alert_response();
    }

    tracing::info!("Stored {record_count} expense records for session {session_id}");

    (
        StatusCode::SEE_OTHER,
        HxRedirect(endpoints::ANALYSIS_VIEW.to_owned()),
        jar.add(session_cookie(session_id)),
    )
        .into_response()
}

/// Route handler for discarding the uploaded ledger of the current session.
///
/// The session cookie is cleared and the client is redirected to the
/// analysis page, which then asks for a new upload.
pub async fn discard_upload(State(state): State<UploadState>, jar: CookieJar) -> Response {
    if let Some(session_id) = session_id_from_jar(&jar) {
        match state.sessions.remove(session_id) {
            Ok(true) => tracing::info!("Discarded the upload of session {session_id}"),
            Ok(false) => tracing::debug!("Session {session_id} had no upload to discard"),
            Err(error) => return error.into_alert_response(),
        }
    }

    (
        StatusCode::SEE_OTHER,
        HxRedirect(endpoints::ANALYSIS_VIEW.to_owned()),
        jar.add(expired_session_cookie()),
    )
        .into_response()
}

async fn read_uploaded_file(multipart: &mut Multipart) -> Result<UploadedFile, Error> {
    while let Some(field) = multipart
        .next_field()
        .await
        .inspect_err(|error| tracing::debug!("Could not read multipart form: {error}"))
        .map_err(|error| Error::Multipart(error.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = match field.file_name() {
            Some(file_name) if !file_name.is_empty() => file_name.to_owned(),
            _ => {
                return Err(Error::Multipart(
                    "the file field has no file name".to_owned(),
                ));
            }
        };
        let content_type = field.content_type().map(str::to_owned);

        let bytes = field
            .bytes()
            .await
            .inspect_err(|error| {
                tracing::error!("Could not read data from multipart form field: {error}")
            })
            .map_err(|error| Error::Multipart(error.body_text()))?;

        tracing::debug!("Received file '{}' that is {} bytes", file_name, bytes.len());

        return Ok(UploadedFile {
            file_name,
            content_type,
            bytes,
        });
    }

    Err(Error::Multipart(format!(
        "the form has no \"{FILE_FIELD}\" field"
    )))
}

fn parse_uploaded_file(file: &UploadedFile) -> Result<Vec<IndexedRecord>, Error> {
    let kind = UploadKind::detect(&file.file_name, file.content_type.as_deref())?;
    let table = read_table(kind, &file.bytes)?;

    expenses::load(&table)
}
