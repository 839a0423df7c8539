//! Mutex-serialized SKU allocator.
//!
//! # Responsibility
//! - Provide the atomic reserve-then-advance step over `SequenceState`.
//! - Render reserved counters through the shared `SkuFormat`.
//!
//! # Invariants
//! - One mutex guards the whole sequence state; nothing else mutates it.
//! - No I/O happens while the mutex is held.
//! - A value is consumed only when a SKU is returned.

use super::format::{OverflowPolicy, SkuFormat};
use super::sequence::SequenceState;
use super::Sku;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Allocation failure. Only reachable with [`OverflowPolicy::Reject`] or at
/// the `u64` limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocError {
    Exhausted { last_issuable: u64 },
}

impl Display for AllocError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exhausted { last_issuable } => {
                write!(f, "sku counter exhausted after {last_issuable}")
            }
        }
    }
}

impl Error for AllocError {}

/// Hands out unique, increasing SKUs to concurrent callers.
///
/// Only obtainable from [`bootstrap_allocator`](super::bootstrap_allocator),
/// so every instance starts above the highest persisted SKU. Share it as
/// `Arc<SkuAllocator>`.
#[derive(Debug)]
pub struct SkuAllocator {
    format: SkuFormat,
    state: Mutex<SequenceState>,
}

impl SkuAllocator {
    pub(crate) fn starting_at(format: SkuFormat, counter: u64) -> Self {
        let mut state = SequenceState::new();
        state.set_counter(counter);
        Self {
            format,
            state: Mutex::new(state),
        }
    }

    /// Issues the next SKU.
    ///
    /// Concurrent callers always receive distinct SKUs; the caller whose
    /// critical section ran first gets the smaller suffix.
    pub fn allocate(&self) -> Result<Sku, AllocError> {
        let ceiling = match self.format.overflow() {
            OverflowPolicy::Widen => None,
            OverflowPolicy::Reject => Some(self.format.max_fixed_width_value()),
        };

        let reserved = self.lock_state().reserve(ceiling);
        match reserved {
            Some(counter) => Ok(self.format.format(counter)),
            None => {
                let last_issuable = ceiling.unwrap_or(u64::MAX - 1);
                warn!(
                    "event=sku_exhausted module=sku status=error prefix={} width={} last_issuable={}",
                    self.format.prefix(),
                    self.format.width(),
                    last_issuable
                );
                Err(AllocError::Exhausted { last_issuable })
            }
        }
    }

    /// Counter value the next successful `allocate()` will use.
    pub fn next_counter(&self) -> u64 {
        self.lock_state().counter()
    }

    pub fn format(&self) -> &SkuFormat {
        &self.format
    }

    // The guarded state is a single integer, so a panic elsewhere cannot leave
    // it half-written.
    fn lock_state(&self) -> MutexGuard<'_, SequenceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
