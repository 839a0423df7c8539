//! One-time allocator bootstrap from persisted history.
//!
//! # Responsibility
//! - Read the highest issued SKU from the counter store.
//! - Produce a `SkuAllocator` whose first SKU is above every persisted one.
//!
//! # Invariants
//! - A malformed stored SKU or an unreachable store never yields an allocator.
//! - An empty store starts the sequence at `1`.

use super::allocator::SkuAllocator;
use super::format::{SkuFormat, SkuParseError};
use crate::repo::part_repo::{RepoError, RepoResult};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Durable record of previously issued SKUs.
pub trait SkuCounterStore {
    /// Returns the greatest SKU ever persisted, or `None` for an empty store.
    ///
    /// Rows that were soft-deleted still count; their SKUs were issued.
    fn max_issued_sku(&self) -> RepoResult<Option<String>>;
}

impl<S: SkuCounterStore + ?Sized> SkuCounterStore for &S {
    fn max_issued_sku(&self) -> RepoResult<Option<String>> {
        (**self).max_issued_sku()
    }
}

/// Fatal startup failures. The host must not serve part creation after any
/// of these.
#[derive(Debug)]
pub enum BootstrapError {
    StoreUnavailable(RepoError),
    Parse {
        value: String,
        reason: SkuParseError,
    },
    CounterOverflow {
        value: String,
    },
}

impl BootstrapError {
    fn code(&self) -> &'static str {
        match self {
            Self::StoreUnavailable(_) => "sku_store_unavailable",
            Self::Parse { .. } => "sku_parse_failed",
            Self::CounterOverflow { .. } => "sku_counter_overflow",
        }
    }
}

impl Display for BootstrapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StoreUnavailable(err) => write!(f, "sku counter store unavailable: {err}"),
            Self::Parse { value, reason } => {
                write!(f, "stored sku `{value}` is malformed: {reason}")
            }
            Self::CounterOverflow { value } => {
                write!(f, "stored sku `{value}` leaves no room for a next counter")
            }
        }
    }
}

impl Error for BootstrapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StoreUnavailable(err) => Some(err),
            Self::Parse { reason, .. } => Some(reason),
            Self::CounterOverflow { .. } => None,
        }
    }
}

/// Builds the process allocator from the counter store.
///
/// This is the only way to obtain a [`SkuAllocator`]; call it once at startup
/// and share the result.
///
/// # Errors
/// - [`BootstrapError::StoreUnavailable`] when the store query fails.
/// - [`BootstrapError::Parse`] when the stored maximum does not fit `format`.
/// - [`BootstrapError::CounterOverflow`] when the stored maximum is `u64::MAX`.
pub fn bootstrap_allocator<S>(
    store: &S,
    format: SkuFormat,
) -> Result<SkuAllocator, BootstrapError>
where
    S: SkuCounterStore + ?Sized,
{
    let started_at = Instant::now();
    match resolve_start_counter(store, &format) {
        Ok((start, max_issued)) => {
            info!(
                "event=sku_bootstrap module=sku status=ok duration_ms={} prefix={} width={} max_issued={} next_counter={}",
                started_at.elapsed().as_millis(),
                format.prefix(),
                format.width(),
                max_issued.as_deref().unwrap_or("none"),
                start
            );
            Ok(SkuAllocator::starting_at(format, start))
        }
        Err(err) => {
            error!(
                "event=sku_bootstrap module=sku status=error duration_ms={} error_code={} error={}",
                started_at.elapsed().as_millis(),
                err.code(),
                err
            );
            Err(err)
        }
    }
}

fn resolve_start_counter<S>(
    store: &S,
    format: &SkuFormat,
) -> Result<(u64, Option<String>), BootstrapError>
where
    S: SkuCounterStore + ?Sized,
{
    let Some(max_issued) = store
        .max_issued_sku()
        .map_err(BootstrapError::StoreUnavailable)?
    else {
        return Ok((1, None));
    };

    let last = format
        .parse_counter(&max_issued)
        .map_err(|reason| BootstrapError::Parse {
            value: max_issued.clone(),
            reason,
        })?;
    let next = last
        .checked_add(1)
        .ok_or_else(|| BootstrapError::CounterOverflow {
            value: max_issued.clone(),
        })?;

    Ok((next, Some(max_issued)))
}

#[cfg(test)]
mod tests {
    use super::{bootstrap_allocator, BootstrapError, SkuCounterStore};
    use crate::repo::part_repo::{RepoError, RepoResult};
    use crate::sku::format::{SkuFormat, SkuParseError};

    struct FixedStore(Option<&'static str>);

    impl SkuCounterStore for FixedStore {
        fn max_issued_sku(&self) -> RepoResult<Option<String>> {
            Ok(self.0.map(str::to_string))
        }
    }

    #[test]
    fn zero_suffix_in_store_starts_at_one() {
        let allocator =
            bootstrap_allocator(&FixedStore(Some("PC-000000")), SkuFormat::default()).unwrap();
        assert_eq!(allocator.next_counter(), 1);
    }

    #[test]
    fn maximum_u64_suffix_is_an_overflow() {
        let err = bootstrap_allocator(
            &FixedStore(Some("PC-18446744073709551615")),
            SkuFormat::default(),
        )
        .unwrap_err();
        assert!(matches!(err, BootstrapError::CounterOverflow { .. }));
    }

    #[test]
    fn parse_error_keeps_offending_value_and_reason() {
        let err = bootstrap_allocator(&FixedStore(Some("SKU-000001")), SkuFormat::default())
            .unwrap_err();
        match err {
            BootstrapError::Parse { value, reason } => {
                assert_eq!(value, "SKU-000001");
                assert!(matches!(reason, SkuParseError::WrongPrefix { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn store_errors_are_reported_as_unavailable() {
        struct BrokenStore;
        impl SkuCounterStore for BrokenStore {
            fn max_issued_sku(&self) -> RepoResult<Option<String>> {
                Err(RepoError::InvalidData("disk on fire".to_string()))
            }
        }

        let err = bootstrap_allocator(&BrokenStore, SkuFormat::default()).unwrap_err();
        assert!(matches!(err, BootstrapError::StoreUnavailable(_)));
        assert!(err.to_string().contains("disk on fire"));
    }
}
