//! Part domain model.
//!
//! # Responsibility
//! - Define the canonical part record persisted in `parts`.
//! - Provide lifecycle helpers for soft-delete semantics.
//!
//! # Invariants
//! - `id` is stable and never reused for another part.
//! - `sku` is assigned once at creation and never changes afterwards.
//! - `quantity_on_hand` is never negative.

use crate::sku::Sku;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable row identifier for a part, independent of its SKU.
pub type PartId = Uuid;

/// Structural validation failures for [`Part`] records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartValidationError {
    NilUuid,
    BlankName,
    NegativeQuantity(i64),
}

impl Display for PartValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilUuid => write!(f, "part id must not be nil"),
            Self::BlankName => write!(f, "part name must not be blank"),
            Self::NegativeQuantity(value) => {
                write!(f, "quantity_on_hand must be >= 0, got {value}")
            }
        }
    }
}

impl Error for PartValidationError {}

/// Canonical part record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub id: PartId,
    /// Issued by the SKU allocator; immutable after creation.
    pub sku: Sku,
    pub name: String,
    pub description: Option<String>,
    pub quantity_on_hand: i64,
    /// Unix epoch milliseconds, set by storage.
    pub created_at: i64,
    /// Unix epoch milliseconds, set by storage.
    pub updated_at: i64,
    /// Soft delete tombstone. The SKU of a deleted part stays issued.
    pub is_deleted: bool,
}

impl Part {
    /// Creates a new part with a generated stable ID.
    ///
    /// Timestamps are placeholders until the row is read back from storage.
    pub fn new(sku: Sku, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sku,
            name: name.into(),
            description: None,
            quantity_on_hand: 0,
            created_at: 0,
            updated_at: 0,
            is_deleted: false,
        }
    }

    /// Checks structural invariants before persistence.
    pub fn validate(&self) -> Result<(), PartValidationError> {
        if self.id.is_nil() {
            return Err(PartValidationError::NilUuid);
        }
        validate_fields(&self.name, self.quantity_on_hand)
    }

    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}

/// Input for the part-creation use-case. The SKU is not caller-provided.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPart {
    pub name: String,
    pub description: Option<String>,
    pub quantity_on_hand: i64,
}

impl NewPart {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Same field rules as [`Part::validate`], checked before a SKU is spent.
    pub fn validate(&self) -> Result<(), PartValidationError> {
        validate_fields(&self.name, self.quantity_on_hand)
    }
}

fn validate_fields(name: &str, quantity_on_hand: i64) -> Result<(), PartValidationError> {
    if name.trim().is_empty() {
        return Err(PartValidationError::BlankName);
    }
    if quantity_on_hand < 0 {
        return Err(PartValidationError::NegativeQuantity(quantity_on_hand));
    }
    Ok(())
}
