//! IPR Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging, and error handling for the IPR workspace.
//!
//! This crate provides functionality used by both the API server and the
//! pipeline loader:
//!
//! - **Error Handling**: the shared `IprError` type and result alias
//! - **Logging**: tracing subscriber initialization from configuration
//! - **Types**: report states, auth types, and other shared domain types

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{IprError, Result};
