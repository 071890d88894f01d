//! `allowed.partitions` parsing
//!
//! Client configuration arrives in many shapes: a single number, a
//! comma-separated string, or a collection of numbers (machine integers,
//! floats, or arbitrary-precision values rendered as text). Every shape is
//! mapped onto [`RawAllowedPartitions`] and normalized by
//! [`parse_allowed_partitions`] into a [`Constraint`].
//!
//! The parser knows nothing about the topology: indices beyond the current
//! partition count are accepted here and clipped by the engine.

use std::collections::{BTreeSet, HashSet};

use serde_json::Value;

use super::constraint::{AllowSet, Constraint};
use crate::constants::{PartitionIndex, ALLOWED_PARTITIONS_SEPARATOR, MAX_PARTITION_INDEX};
use crate::error::{AssignorError, Result};

/// A single raw partition value
#[derive(Debug, Clone, PartialEq)]
pub enum PartitionValue {
    /// Any machine integer, signed or unsigned
    Int(i128),

    /// Floating point; only finite integral values are accepted
    Float(f64),

    /// Arbitrary-precision integer or decimal (`"9"`, `"9.00"`, `"9E+1"`)
    Decimal(String),

    /// A string token, trimmed before parsing as an integer
    Text(String),
}

impl PartitionValue {
    /// Arbitrary-precision value, e.g. the rendering of a big integer/decimal
    pub fn decimal(value: impl Into<String>) -> Self {
        PartitionValue::Decimal(value.into())
    }

    /// Normalize into a partition index
    pub fn to_partition(&self) -> Result<PartitionIndex> {
        match self {
            PartitionValue::Int(v) => int_to_partition(*v),
            PartitionValue::Float(v) => float_to_partition(*v),
            PartitionValue::Decimal(s) => decimal_to_partition(s),
            PartitionValue::Text(s) => text_to_partition(s),
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for PartitionValue {
                fn from(v: $t) -> Self {
                    PartitionValue::Int(v as i128)
                }
            }

            impl From<$t> for RawAllowedPartitions {
                fn from(v: $t) -> Self {
                    RawAllowedPartitions::Scalar(PartitionValue::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f32> for PartitionValue {
    fn from(v: f32) -> Self {
        PartitionValue::Float(v as f64)
    }
}

impl From<f64> for PartitionValue {
    fn from(v: f64) -> Self {
        PartitionValue::Float(v)
    }
}

impl From<&str> for PartitionValue {
    fn from(v: &str) -> Self {
        PartitionValue::Text(v.to_string())
    }
}

impl From<String> for PartitionValue {
    fn from(v: String) -> Self {
        PartitionValue::Text(v)
    }
}

/// The shapes an `allowed.partitions` option may take
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawAllowedPartitions {
    /// Option absent or null
    #[default]
    Unset,

    /// A single value
    Scalar(PartitionValue),

    /// Comma-separated tokens, e.g. `" 3,0, 1 "`; blank means no partitions
    Delimited(String),

    /// Any collection of values, ordered or not, duplicates allowed
    Sequence(Vec<PartitionValue>),
}

impl From<&str> for RawAllowedPartitions {
    fn from(v: &str) -> Self {
        RawAllowedPartitions::Delimited(v.to_string())
    }
}

impl From<String> for RawAllowedPartitions {
    fn from(v: String) -> Self {
        RawAllowedPartitions::Delimited(v)
    }
}

impl From<f64> for RawAllowedPartitions {
    fn from(v: f64) -> Self {
        RawAllowedPartitions::Scalar(PartitionValue::Float(v))
    }
}

impl From<PartitionValue> for RawAllowedPartitions {
    fn from(v: PartitionValue) -> Self {
        RawAllowedPartitions::Scalar(v)
    }
}

impl<T: Into<PartitionValue>> From<Vec<T>> for RawAllowedPartitions {
    fn from(values: Vec<T>) -> Self {
        RawAllowedPartitions::Sequence(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<PartitionValue>, const N: usize> From<[T; N]> for RawAllowedPartitions {
    fn from(values: [T; N]) -> Self {
        RawAllowedPartitions::Sequence(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<PartitionValue> + Clone> From<&[T]> for RawAllowedPartitions {
    fn from(values: &[T]) -> Self {
        RawAllowedPartitions::Sequence(values.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<PartitionValue>> From<BTreeSet<T>> for RawAllowedPartitions {
    fn from(values: BTreeSet<T>) -> Self {
        RawAllowedPartitions::Sequence(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<PartitionValue>> From<HashSet<T>> for RawAllowedPartitions {
    fn from(values: HashSet<T>) -> Self {
        RawAllowedPartitions::Sequence(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<RawAllowedPartitions>> From<Option<T>> for RawAllowedPartitions {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// JSON-shaped configuration values (what a config file or map hands us)
impl TryFrom<&Value> for RawAllowedPartitions {
    type Error = AssignorError;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(RawAllowedPartitions::Unset),
            Value::Number(_) => Ok(RawAllowedPartitions::Scalar(json_number(value)?)),
            Value::String(s) => Ok(RawAllowedPartitions::Delimited(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Number(_) => json_number(item),
                    Value::String(s) => Ok(PartitionValue::Text(s.clone())),
                    other => Err(AssignorError::InvalidConfiguration(format!(
                        "unsupported allowed partition element: {}",
                        other
                    ))),
                })
                .collect::<Result<Vec<_>>>()
                .map(RawAllowedPartitions::Sequence),
            other => Err(AssignorError::InvalidConfiguration(format!(
                "unsupported allowed partitions value: {}",
                other
            ))),
        }
    }
}

fn json_number(value: &Value) -> Result<PartitionValue> {
    if let Some(v) = value.as_i64() {
        Ok(PartitionValue::Int(v as i128))
    } else if let Some(v) = value.as_u64() {
        Ok(PartitionValue::Int(v as i128))
    } else if let Some(v) = value.as_f64() {
        Ok(PartitionValue::Float(v))
    } else {
        Err(AssignorError::InvalidConfiguration(format!(
            "unsupported number: {}",
            value
        )))
    }
}

/// Normalize a raw `allowed.partitions` value
///
/// Returns `Unrestricted` for [`RawAllowedPartitions::Unset`]; every other
/// shape yields a sorted, deduplicated allow-set. Fails with
/// `InvalidConfiguration` on negative, fractional, non-numeric or
/// out-of-bound values.
pub fn parse_allowed_partitions(raw: &RawAllowedPartitions) -> Result<Constraint> {
    let indices = match raw {
        RawAllowedPartitions::Unset => return Ok(Constraint::Unrestricted),
        RawAllowedPartitions::Scalar(value) => vec![value.to_partition()?],
        RawAllowedPartitions::Delimited(s) => {
            let s = s.trim();
            if s.is_empty() {
                Vec::new()
            } else {
                let mut tokens: Vec<&str> = s.split(ALLOWED_PARTITIONS_SEPARATOR).collect();
                // "1,2," lists the same partitions as "1,2"
                while tokens.last() == Some(&"") {
                    tokens.pop();
                }
                tokens
                    .into_iter()
                    .map(text_to_partition)
                    .collect::<Result<Vec<_>>>()?
            }
        }
        RawAllowedPartitions::Sequence(values) => values
            .iter()
            .map(PartitionValue::to_partition)
            .collect::<Result<Vec<_>>>()?,
    };

    Ok(Constraint::AllowSet(AllowSet::new(indices)))
}

impl Constraint {
    /// The configuration value that parses back into this constraint
    pub fn to_raw(&self) -> RawAllowedPartitions {
        match self {
            Constraint::Unrestricted => RawAllowedPartitions::Unset,
            Constraint::AllowSet(set) => RawAllowedPartitions::Delimited(set.to_string()),
        }
    }
}

impl std::str::FromStr for Constraint {
    type Err = AssignorError;

    /// Parse the delimited form; a blank string is the empty allow-set
    fn from_str(s: &str) -> Result<Self> {
        parse_allowed_partitions(&RawAllowedPartitions::Delimited(s.to_string()))
    }
}

fn int_to_partition(value: i128) -> Result<PartitionIndex> {
    if value < 0 {
        return Err(AssignorError::InvalidConfiguration(format!(
            "negative partition: {}",
            value
        )));
    }
    if value > MAX_PARTITION_INDEX as i128 {
        return Err(AssignorError::out_of_bounds(value));
    }
    Ok(value as PartitionIndex)
}

fn float_to_partition(value: f64) -> Result<PartitionIndex> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(AssignorError::InvalidConfiguration(format!(
            "partition must be an integer: {}",
            value
        )));
    }
    if value < 0.0 {
        return Err(AssignorError::InvalidConfiguration(format!(
            "negative partition: {}",
            value
        )));
    }
    if value > MAX_PARTITION_INDEX as f64 {
        return Err(AssignorError::out_of_bounds(value));
    }
    Ok(value as PartitionIndex)
}

fn text_to_partition(token: &str) -> Result<PartitionIndex> {
    let token = token.trim();
    let value: i128 = token.parse().map_err(|_| {
        AssignorError::InvalidConfiguration(format!("not a partition number: '{}'", token))
    })?;
    int_to_partition(value)
}

/// Decimal of any length: `[+-]digits[.digits][(e|E)[+-]digits]`
///
/// Scientific notation is what a big decimal renders for negative scales
/// (`"9E+1"`); the value must still be a whole number.
fn decimal_to_partition(text: &str) -> Result<PartitionIndex> {
    let invalid =
        || AssignorError::InvalidConfiguration(format!("not a partition number: '{}'", text));
    let fractional = || {
        AssignorError::InvalidConfiguration(format!("partition must be an integer: {}", text.trim()))
    };

    let trimmed = text.trim();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let (mantissa, exponent) = match unsigned.split_once(|c: char| c == 'e' || c == 'E') {
        Some((mantissa, exponent)) => {
            let digits = exponent
                .strip_prefix(|c: char| c == '+' || c == '-')
                .unwrap_or(exponent);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            (mantissa, exponent.parse::<i64>().map_err(|_| invalid())?)
        }
        None => (unsigned, 0),
    };

    let (integral, fraction) = match mantissa.split_once('.') {
        Some((integral, fraction)) => (integral, fraction),
        None => (mantissa, ""),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if integral.is_empty() || !all_digits(integral) || !all_digits(fraction) {
        return Err(invalid());
    }

    // value = digits * 10^scale
    let digits = format!("{}{}", integral, fraction);
    let scale = exponent.saturating_sub(fraction.len() as i64);

    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Ok(0);
    }
    if negative {
        return Err(AssignorError::InvalidConfiguration(format!(
            "negative partition: {}",
            trimmed
        )));
    }

    // Anything longer than i16::MAX's five digits is out of bounds
    let whole = if scale >= 0 {
        if (significant.len() as i64).saturating_add(scale) > 5 {
            return Err(AssignorError::out_of_bounds(trimmed));
        }
        format!("{}{}", significant, "0".repeat(scale as usize))
    } else {
        let shift = scale.unsigned_abs();
        if shift >= significant.len() as u64 {
            return Err(fractional());
        }
        let (kept, dropped) = significant.split_at(significant.len() - shift as usize);
        if dropped.bytes().any(|b| b != b'0') {
            return Err(fractional());
        }
        kept.to_string()
    };

    if whole.len() > 5 {
        return Err(AssignorError::out_of_bounds(trimmed));
    }
    let value: u32 = whole.parse().map_err(|_| invalid())?;
    int_to_partition(value as i128)
}
