//! Report history trail
//!
//! Immutable records of version transitions on report sub-entities. One row
//! is written per destroy-driven revision; rows are never updated or
//! deleted.

pub mod models;
pub mod queries;

pub use models::{HistoryQuery, HistoryRecord, NewHistoryRecord};
