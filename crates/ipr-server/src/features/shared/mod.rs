//! Utilities shared across feature slices

pub mod pagination;
pub mod validation;

pub use pagination::{Paginated, PaginationMetadata, PaginationParams};
