//! Ordering key configuration.
//!
//! # Responsibility
//! - Hold the key-space constants consumed by the allocator.
//! - Reject invalid constants at load time, never at call time.
//!
//! # Invariants
//! - `min_key < max_key`.
//! - `min_key <= default_key <= max_key`.
//! - `0 < jitter.min <= jitter.max`, both held at one common scale.
//! - `max_key * 2` is representable.
//!
//! Configuration is passed explicitly to every allocation; there is no
//! process-wide instance.

use crate::ordering::key::{OrderKey, OrderKeyParseError};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Lowest key of the fresh allocation range.
pub const DEFAULT_MIN_KEY: i64 = 1;
/// Highest key of the fresh allocation range.
pub const DEFAULT_MAX_KEY: i64 = 1_000_000;
/// Key used when an item has no ordering information at all.
///
/// Middle of the fresh range, leaving headroom on both sides.
pub const DEFAULT_DEFAULT_KEY: i64 = 500_000;
/// Smallest boundary jitter.
pub const DEFAULT_JITTER_MIN: i64 = 1;
/// Largest boundary jitter.
pub const DEFAULT_JITTER_MAX: i64 = 1_000;

/// Invalid or unreadable ordering configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// `min_key` is not strictly below `max_key`.
    MinNotBelowMax { min_key: OrderKey, max_key: OrderKey },
    /// `default_key` lies below `min_key`.
    DefaultBelowMin {
        default_key: OrderKey,
        min_key: OrderKey,
    },
    /// `default_key` lies above `max_key`.
    DefaultAboveMax {
        default_key: OrderKey,
        max_key: OrderKey,
    },
    /// Jitter range has `min > max`.
    EmptyJitterRange { min: Decimal, max: Decimal },
    /// Jitter bounds cannot share one decimal scale without losing digits.
    JitterScaleOverflow { min: Decimal, max: Decimal },
    /// Jitter lower bound is zero or negative.
    NonPositiveJitter { min: Decimal },
    /// `max_key * 2` overflows the decimal range.
    MaxKeyOverflow { max_key: OrderKey },
    /// A field holds malformed decimal text.
    InvalidValue {
        field: &'static str,
        source: OrderKeyParseError,
    },
    /// JSON document could not be decoded.
    Parse(serde_json::Error),
    /// Config file could not be read.
    Io(std::io::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MinNotBelowMax { min_key, max_key } => {
                write!(f, "min_key {min_key} must be below max_key {max_key}")
            }
            Self::DefaultBelowMin {
                default_key,
                min_key,
            } => write!(f, "default_key {default_key} must be >= min_key {min_key}"),
            Self::DefaultAboveMax {
                default_key,
                max_key,
            } => write!(f, "default_key {default_key} must be <= max_key {max_key}"),
            Self::EmptyJitterRange { min, max } => {
                write!(f, "jitter range [{min}, {max}] is empty")
            }
            Self::JitterScaleOverflow { min, max } => write!(
                f,
                "jitter bounds {min} and {max} cannot be held at a common scale"
            ),
            Self::NonPositiveJitter { min } => {
                write!(f, "jitter minimum must be positive, got {min}")
            }
            Self::MaxKeyOverflow { max_key } => {
                write!(f, "max_key {max_key} is too large to double")
            }
            Self::InvalidValue { field, source } => write!(f, "invalid `{field}`: {source}"),
            Self::Parse(err) => write!(f, "invalid sort key config: {err}"),
            Self::Io(err) => write!(f, "failed to read sort key config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidValue { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

/// Inclusive range for the random boundary offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JitterRange {
    min: Decimal,
    max: Decimal,
}

impl JitterRange {
    /// Creates a validated range.
    ///
    /// Both bounds are rescaled to the finer of their two scales so every
    /// draw lands on one grid spanning the whole range.
    pub fn new(min: Decimal, max: Decimal) -> Result<Self, ConfigError> {
        if min <= Decimal::ZERO {
            return Err(ConfigError::NonPositiveJitter { min });
        }
        if min > max {
            return Err(ConfigError::EmptyJitterRange { min, max });
        }

        let scale = min.scale().max(max.scale());
        let (mut low, mut high) = (min, max);
        low.rescale(scale);
        high.rescale(scale);
        // `rescale` stops early when the mantissa would overflow.
        if low.scale() != scale || high.scale() != scale {
            return Err(ConfigError::JitterScaleOverflow { min, max });
        }
        Ok(Self {
            min: low,
            max: high,
        })
    }

    pub fn min(&self) -> Decimal {
        self.min
    }

    pub fn max(&self) -> Decimal {
        self.max
    }

    /// Draws one offset uniformly from `[min, max]`.
    ///
    /// Values are drawn on the grid of the finer bound's scale, so an
    /// integral range only yields integers.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Decimal {
        let mantissa = rng.gen_range(self.min.mantissa()..=self.max.mantissa());
        // Bounded by two representable mantissas at the same scale.
        Decimal::from_i128_with_scale(mantissa, self.min.scale())
    }
}

/// Key-space constants for one ordered collection family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSortKeyConfig", into = "RawSortKeyConfig")]
pub struct SortKeyConfig {
    min_key: OrderKey,
    max_key: OrderKey,
    default_key: OrderKey,
    jitter: JitterRange,
    head_bisection_ceiling: OrderKey,
}

impl SortKeyConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    /// - Returns `ConfigError` when any invariant listed on this module fails.
    pub fn new(
        min_key: OrderKey,
        max_key: OrderKey,
        default_key: OrderKey,
        jitter: JitterRange,
    ) -> Result<Self, ConfigError> {
        if min_key >= max_key {
            return Err(ConfigError::MinNotBelowMax { min_key, max_key });
        }
        if default_key < min_key {
            return Err(ConfigError::DefaultBelowMin {
                default_key,
                min_key,
            });
        }
        if default_key > max_key {
            return Err(ConfigError::DefaultAboveMax {
                default_key,
                max_key,
            });
        }
        let ceiling = max_key
            .value()
            .checked_mul(Decimal::TWO)
            .ok_or(ConfigError::MaxKeyOverflow { max_key })?;

        Ok(Self {
            min_key,
            max_key,
            default_key,
            jitter,
            head_bisection_ceiling: OrderKey::new(ceiling),
        })
    }

    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str::<RawSortKeyConfig>(json)
            .map_err(ConfigError::Parse)
            .and_then(Self::try_from)
    }

    /// Reads and validates a JSON config file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json_str(&text)
    }

    pub fn min_key(&self) -> OrderKey {
        self.min_key
    }

    pub fn max_key(&self) -> OrderKey {
        self.max_key
    }

    pub fn default_key(&self) -> OrderKey {
        self.default_key
    }

    pub fn jitter(&self) -> JitterRange {
        self.jitter
    }

    /// Returns `max_key * 2`, the threshold between halving and jitter for
    /// head inserts.
    pub fn head_bisection_ceiling(&self) -> OrderKey {
        self.head_bisection_ceiling
    }
}

impl Default for SortKeyConfig {
    fn default() -> Self {
        let max_key = Decimal::from(DEFAULT_MAX_KEY);
        Self {
            min_key: OrderKey::from(DEFAULT_MIN_KEY),
            max_key: OrderKey::new(max_key),
            default_key: OrderKey::from(DEFAULT_DEFAULT_KEY),
            jitter: JitterRange {
                min: Decimal::from(DEFAULT_JITTER_MIN),
                max: Decimal::from(DEFAULT_JITTER_MAX),
            },
            head_bisection_ceiling: OrderKey::new(max_key * Decimal::TWO),
        }
    }
}

/// Serialized config shape; decimals travel as canonical strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSortKeyConfig {
    min_key: String,
    max_key: String,
    default_key: String,
    jitter: RawJitterRange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawJitterRange {
    min: String,
    max: String,
}

impl TryFrom<RawSortKeyConfig> for SortKeyConfig {
    type Error = ConfigError;

    fn try_from(raw: RawSortKeyConfig) -> Result<Self, Self::Error> {
        let jitter = JitterRange::new(
            parse_field("jitter.min", &raw.jitter.min)?.value(),
            parse_field("jitter.max", &raw.jitter.max)?.value(),
        )?;
        Self::new(
            parse_field("min_key", &raw.min_key)?,
            parse_field("max_key", &raw.max_key)?,
            parse_field("default_key", &raw.default_key)?,
            jitter,
        )
    }
}

impl From<SortKeyConfig> for RawSortKeyConfig {
    fn from(config: SortKeyConfig) -> Self {
        Self {
            min_key: config.min_key.to_canonical_string(),
            max_key: config.max_key.to_canonical_string(),
            default_key: config.default_key.to_canonical_string(),
            jitter: RawJitterRange {
                min: config.jitter.min.normalize().to_string(),
                max: config.jitter.max.normalize().to_string(),
            },
        }
    }
}

fn parse_field(field: &'static str, value: &str) -> Result<OrderKey, ConfigError> {
    value
        .parse()
        .map_err(|source| ConfigError::InvalidValue { field, source })
}
