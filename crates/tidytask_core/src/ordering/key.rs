//! Exact decimal ordering key.
//!
//! # Responsibility
//! - Carry one item's position in a list as an exact decimal value.
//! - Define the canonical text form shared with the mobile client.
//!
//! # Invariants
//! - Arithmetic is exact decimal arithmetic; binary floats never appear.
//! - Text form matches `^-?[0-9]+(\.[0-9]+)?$` with trailing fractional
//!   zeros stripped, so equal keys always render identically.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static ORDER_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").expect("valid order key regex"));

/// Position of one item inside an ordered list.
///
/// Comparison is numeric, so `OrderKey` values parsed from `"1.50"` and
/// `"1.5"` are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderKey(Decimal);

impl OrderKey {
    /// Wraps an exact decimal value.
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns the canonical text form used for storage and the wire.
    pub fn to_canonical_string(&self) -> String {
        self.0.normalize().to_string()
    }
}

impl From<Decimal> for OrderKey {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<i64> for OrderKey {
    fn from(value: i64) -> Self {
        Self(Decimal::from(value))
    }
}

impl From<OrderKey> for Decimal {
    fn from(value: OrderKey) -> Self {
        value.0
    }
}

impl Display for OrderKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

/// Malformed order key text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderKeyParseError {
    /// Text does not follow the canonical decimal shape.
    Malformed(String),
    /// Text has more digits than the decimal type can hold exactly.
    OutOfRange(String),
}

impl Display for OrderKeyParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(value) => write!(f, "malformed order key `{value}`"),
            Self::OutOfRange(value) => {
                write!(f, "order key `{value}` exceeds exact decimal precision")
            }
        }
    }
}

impl Error for OrderKeyParseError {}

impl FromStr for OrderKey {
    type Err = OrderKeyParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if !ORDER_KEY_RE.is_match(value) {
            return Err(OrderKeyParseError::Malformed(value.to_string()));
        }
        Decimal::from_str_exact(value)
            .map(Self)
            .map_err(|_| OrderKeyParseError::OutOfRange(value.to_string()))
    }
}

impl Serialize for OrderKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OrderKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}
