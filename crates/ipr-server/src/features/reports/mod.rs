//! Report lifecycle
//!
//! A report belongs to a patient, moves through a fixed set of states
//! (ready, active, uploaded, reviewed, completed, archived) and owns the
//! versioned sub-entities (small mutations, mutation signatures,
//! structural variants, therapeutic targets).

pub mod commands;
pub mod models;
pub mod queries;
pub mod routes;

pub use models::ReportRecord;
pub use routes::reports_routes;
