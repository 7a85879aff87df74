//! Analysis page
//!
//! Shows the summary cards, charts and tables of the session's upload,
//! narrowed down by the filters in the query string.

mod cards;
mod charts;
mod filter_form;
mod handlers;
mod query;
mod tables;

pub use handlers::get_analysis_page;
pub use query::AnalysisQuery;
