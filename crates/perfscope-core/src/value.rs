//! Tagged counter values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::DataType;

/// A single decoded counter value.
///
/// The variant preserves the exact width and signedness the backend reported
/// for the counter; `as_f64` gives a lossy uniform view for display and
/// aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CounterValue {
    /// 32-bit float value.
    Float32(f32),
    /// 64-bit float value.
    Float64(f64),
    /// Unsigned 32-bit value.
    Uint32(u32),
    /// Unsigned 64-bit value.
    Uint64(u64),
    /// Signed 32-bit value.
    Int32(i32),
    /// Signed 64-bit value.
    Int64(i64),
}

impl CounterValue {
    /// The data type of this value.
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        match self {
            Self::Float32(_) => DataType::Float32,
            Self::Float64(_) => DataType::Float64,
            Self::Uint32(_) => DataType::Uint32,
            Self::Uint64(_) => DataType::Uint64,
            Self::Int32(_) => DataType::Int32,
            Self::Int64(_) => DataType::Int64,
        }
    }

    /// Lossy numeric view of the value.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Float32(v) => f64::from(v),
            Self::Float64(v) => v,
            Self::Uint32(v) => f64::from(v),
            Self::Uint64(v) => v as f64,
            Self::Int32(v) => f64::from(v),
            Self::Int64(v) => v as f64,
        }
    }

    /// The value as an unsigned 64-bit integer, if it is an unsigned variant.
    #[must_use]
    pub const fn as_u64(&self) -> Option<u64> {
        match *self {
            Self::Uint32(v) => Some(v as u64),
            Self::Uint64(v) => Some(v),
            _ => None,
        }
    }

    /// The value as a signed 64-bit integer, if it is a signed variant.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Int32(v) => Some(v as i64),
            Self::Int64(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for CounterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Float32(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Uint32(v) => write!(f, "{v}"),
            Self::Uint64(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
        }
    }
}
