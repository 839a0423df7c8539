//! SKU allocation for newly created parts.
//!
//! # Responsibility
//! - Issue unique, human-readable, strictly increasing SKUs.
//! - Resume above the highest persisted SKU after every restart.
//! - Stay correct under concurrent part creation.
//!
//! # Invariants
//! - `SkuAllocator` can only be built by `bootstrap_allocator`.
//! - The counter lives only in memory; persisted parts are the durable record.
//! - An issued SKU is never issued again in the same process, even if the
//!   caller never persists it.

mod allocator;
mod bootstrap;
pub mod format;
mod sequence;

pub use allocator::{AllocError, SkuAllocator};
pub use bootstrap::{bootstrap_allocator, BootstrapError, SkuCounterStore};
pub use format::{OverflowPolicy, SkuFormat, SkuFormatError, SkuParseError};

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Stock-keeping-unit identifier, e.g. `PC-000042`.
///
/// Ordering is plain string ordering, which matches numeric ordering for SKUs
/// of one fixed-width layout.
///
/// Deserialization accepts any string and does not check it against a
/// layout. Values read from outside the process should go through
/// [`SkuFormat::parse`] before they are trusted as issued SKUs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sku(String);

impl Sku {
    /// Wraps text that is already known to be a SKU (issued or persisted).
    pub(crate) fn from_raw(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Sku {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Sku {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
