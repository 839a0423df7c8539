//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Part::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateSku`) in
//!   addition to DB transport errors.

pub mod part_repo;
