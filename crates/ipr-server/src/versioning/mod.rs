//! Versioned mutation protocol
//!
//! Report sub-entities are never updated in place. Each logical entity is
//! identified by a stable `ident` (UUID); an edit inserts a new row with
//! `data_version = max(existing) + 1`, soft-deletes the row the edit was
//! based on, and writes an immutable record to `report_history`.
//!
//! Invariants maintained here:
//!
//! - at most one live row per `ident` at any time (append-only revisions
//!   are the sanctioned exception)
//! - `data_version` values for an `ident` are strictly increasing; the
//!   unique index on `(ident, data_version)` turns a concurrent
//!   double-revision into a [`ReviseError::VersionConflict`] instead of
//!   silently duplicating a version
//! - insert, soft-delete, and history insert commit atomically

pub mod revise;
pub mod tables;

pub use revise::{revise, CreatedRow, ReviseError, ReviseRequest, Revision};
pub use tables::VersionedTable;
