pub mod get;
pub mod list;

pub use get::GetReportError;
pub use list::{ListReportsError, ListReportsQuery};
