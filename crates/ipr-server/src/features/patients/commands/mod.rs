pub mod upsert;

pub use upsert::{UpsertPatientCommand, UpsertPatientError};
