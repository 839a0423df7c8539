//! Domain model for the parts store.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//!
//! # Invariants
//! - Every part is identified by a stable `PartId` and carries one SKU.
//! - Deletion is represented by soft-delete tombstones, not hard delete.

pub mod part;
