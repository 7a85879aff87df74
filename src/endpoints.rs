//! The page and API endpoint URIs.
//!
//! To add a query string to an endpoint, use [with_query].

/// The introduction page.
pub const ROOT: &str = "/";
/// The page explaining how to fill in a ledger, with the template download.
pub const TEMPLATE_VIEW: &str = "/planilha";
/// The page for uploading a ledger and viewing its analysis.
pub const ANALYSIS_VIEW: &str = "/analise";

/// The route for uploading a ledger.
pub const UPLOAD: &str = "/api/upload";
/// The route for discarding the uploaded ledger of the current session.
pub const DISCARD: &str = "/api/discard";
/// The route for downloading the current analysis as a workbook.
pub const EXPORT: &str = "/api/export";
/// The route for downloading the blank ledger template.
pub const TEMPLATE_DOWNLOAD: &str = "/api/template";

/// Append `query` to `endpoint_path`, omitting the `?` if `query` is empty.
pub fn with_query(endpoint_path: &str, query: &str) -> String {
    if query.is_empty() {
        endpoint_path.to_owned()
    } else {
        format!("{endpoint_path}?{query}")
    }
}
