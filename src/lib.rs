//! Live job postings viewer: loads the postings sheet, filters it through
//! several independent facets and shows the result as a paginated table.

pub mod app;
pub mod config;
pub mod data;
pub mod state;
pub mod ui;
