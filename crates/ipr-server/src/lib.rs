//! IPR Server Library
//!
//! HTTP server for Integrated Pipeline Reports: genomic/clinical report
//! metadata, versioned report sub-entities, and session management.
//!
//! # Overview
//!
//! - **API Endpoints**: RESTful API over reports, patients, and report
//!   sub-entities (small mutations, mutation signatures, structural variants,
//!   therapeutic targets)
//! - **Versioned Mutation Protocol**: copy-on-write revisioning with
//!   soft-deletes and an immutable history trail (see [`versioning`])
//! - **Authentication**: local password or external BCGSC credential check,
//!   opaque bearer tokens with expiry and renewal
//! - **Database**: PostgreSQL via SQLx, schema applied from `migrations/`
//!
//! # Architecture
//!
//! Feature slices under [`features`], each a vertical slice with its own
//! `commands/` (write operations), `queries/` (read operations), and
//! `routes.rs`. Write operations on versioned sub-entities go through the
//! revise protocol in [`versioning`], which records every version transition
//! in the `report_history` table.

use std::sync::Arc;

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod features;
pub mod history;
pub mod middleware;
pub mod versioning;

// Re-export commonly used types
pub use error::{AppError, ServerResult};

/// Application state shared across handlers and middleware
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub db: sqlx::PgPool,
    /// Server configuration
    pub config: Arc<config::Config>,
}
