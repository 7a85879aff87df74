//! Uploading a ledger into the current session, and discarding it again.

mod endpoint;
mod page;
mod table;

pub use endpoint::{discard_upload, upload_ledger};
pub(crate) use page::upload_form_view;
pub use table::{UploadKind, read_table};
