//! Patient management
//!
//! Patients are identified by an external `patient_identifier` (e.g.
//! `POG1234`) and own one or more reports.

pub mod commands;
pub mod models;
pub mod queries;
pub mod routes;

pub use models::PatientRecord;
pub use routes::patients_routes;
