//! SKU text layout: prefix plus zero-padded decimal suffix.
//!
//! # Invariants
//! - For suffixes that fit in `width` digits, lexicographic order of formatted
//!   SKUs equals numeric order of their counters.
//! - Parsing accepts exactly what formatting can produce under the configured
//!   overflow policy.

use super::Sku;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_SKU_PREFIX: &str = "PC-";
pub const DEFAULT_SKU_WIDTH: usize = 6;
/// Widest suffix whose all-nines value still fits in `u64`.
pub const MAX_SKU_WIDTH: usize = 18;

/// Behavior once the counter no longer fits in the configured digit width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Keep issuing SKUs with a wider suffix (`PC-1000000`).
    ///
    /// Fixed-width ordering no longer holds across the boundary.
    #[default]
    Widen,
    /// Refuse to issue SKUs past the all-nines value.
    Reject,
}

/// Invalid layout parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkuFormatError {
    EmptyPrefix,
    /// A digit in the prefix would make the suffix boundary ambiguous.
    DigitInPrefix(String),
    WidthOutOfRange(usize),
}

impl Display for SkuFormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPrefix => write!(f, "sku prefix must not be empty"),
            Self::DigitInPrefix(prefix) => {
                write!(f, "sku prefix `{prefix}` must not contain digits")
            }
            Self::WidthOutOfRange(width) => write!(
                f,
                "sku width must be between 1 and {MAX_SKU_WIDTH}, got {width}"
            ),
        }
    }
}

impl Error for SkuFormatError {}

/// Why a stored SKU string does not fit the layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkuParseError {
    WrongPrefix { expected: String },
    NonNumericSuffix,
    WrongWidth { expected: usize, actual: usize },
    OutOfRange,
}

impl Display for SkuParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WrongPrefix { expected } => write!(f, "expected prefix `{expected}`"),
            Self::NonNumericSuffix => write!(f, "suffix is not a decimal number"),
            Self::WrongWidth { expected, actual } => {
                write!(f, "suffix has {actual} digits, expected {expected}")
            }
            Self::OutOfRange => write!(f, "suffix does not fit in a 64-bit counter"),
        }
    }
}

impl Error for SkuParseError {}

/// Formatting and parsing rule shared by the allocator and the bootstrapper.
#[derive(Debug, Clone)]
pub struct SkuFormat {
    prefix: String,
    width: usize,
    overflow: OverflowPolicy,
    pattern: Regex,
}

impl SkuFormat {
    pub fn new(
        prefix: impl Into<String>,
        width: usize,
        overflow: OverflowPolicy,
    ) -> Result<Self, SkuFormatError> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(SkuFormatError::EmptyPrefix);
        }
        if prefix.bytes().any(|b| b.is_ascii_digit()) {
            return Err(SkuFormatError::DigitInPrefix(prefix));
        }
        if width == 0 || width > MAX_SKU_WIDTH {
            return Err(SkuFormatError::WidthOutOfRange(width));
        }

        let digits = match overflow {
            OverflowPolicy::Widen => format!("[0-9]{{{width},}}"),
            OverflowPolicy::Reject => format!("[0-9]{{{width}}}"),
        };
        // An escaped literal plus a bounded digit class always compiles.
        let pattern = Regex::new(&format!("^{}({digits})$", regex::escape(&prefix)))
            .expect("escaped sku pattern is valid");

        Ok(Self {
            prefix,
            width,
            overflow,
            pattern,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn overflow(&self) -> OverflowPolicy {
        self.overflow
    }

    /// Largest counter that formats to exactly `width` digits.
    pub fn max_fixed_width_value(&self) -> u64 {
        // width <= MAX_SKU_WIDTH keeps this inside u64.
        10u64.pow(self.width as u32) - 1
    }

    /// Renders `counter` as `PREFIX || zero-padded digits`.
    ///
    /// Counters wider than `width` render without truncation.
    pub fn format(&self, counter: u64) -> Sku {
        Sku::from_raw(format!(
            "{}{:0width$}",
            self.prefix,
            counter,
            width = self.width
        ))
    }

    /// Extracts the numeric suffix from a stored SKU.
    pub fn parse_counter(&self, value: &str) -> Result<u64, SkuParseError> {
        let Some(caps) = self.pattern.captures(value) else {
            return Err(self.explain_mismatch(value));
        };
        let digits = caps.get(1).map_or("", |m| m.as_str());
        digits.parse::<u64>().map_err(|_| SkuParseError::OutOfRange)
    }

    /// Validates external input (e.g. a lookup key) as a SKU of this layout.
    pub fn parse(&self, value: &str) -> Result<Sku, SkuParseError> {
        self.parse_counter(value)?;
        Ok(Sku::from_raw(value))
    }

    fn explain_mismatch(&self, value: &str) -> SkuParseError {
        let Some(suffix) = value.strip_prefix(self.prefix.as_str()) else {
            return SkuParseError::WrongPrefix {
                expected: self.prefix.clone(),
            };
        };
        if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return SkuParseError::NonNumericSuffix;
        }
        SkuParseError::WrongWidth {
            expected: self.width,
            actual: suffix.len(),
        }
    }
}

impl Default for SkuFormat {
    fn default() -> Self {
        Self::new(DEFAULT_SKU_PREFIX, DEFAULT_SKU_WIDTH, OverflowPolicy::default())
            .expect("default sku layout is valid")
    }
}
