//! Therapeutic target entries (ranked gene/variant/therapy associations)

pub mod commands;
pub mod models;
pub mod queries;
pub mod routes;

pub use models::TherapeuticTargetRecord;
pub use routes::therapeutic_targets_routes;
