//! Mutation signature entries (COSMIC-style signature exposures)
//!
//! Versioned sub-entity of a report; edits go through the revise protocol
//! in [`crate::versioning`].

pub mod commands;
pub mod models;
pub mod queries;
pub mod routes;

pub use models::MutationSignatureRecord;
pub use routes::mutation_signatures_routes;
