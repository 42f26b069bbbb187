//! Counter descriptors and backend enum decoding.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Numeric type of a counter, as reported by the backend.
///
/// The wire codes match the backend's data-type enumeration; an unrecognized
/// code is a decode error rather than a silent fallback, so a newer backend
/// surfaces loudly instead of producing garbage values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// 32-bit float.
    Float32,
    /// 64-bit float.
    Float64,
    /// Unsigned 32-bit integer.
    Uint32,
    /// Unsigned 64-bit integer.
    Uint64,
    /// Signed 32-bit integer.
    Int32,
    /// Signed 64-bit integer.
    Int64,
}

impl DataType {
    /// Decode a backend data-type code.
    pub fn from_raw(raw: u32) -> Result<Self> {
        match raw {
            0 => Ok(Self::Float32),
            1 => Ok(Self::Float64),
            2 => Ok(Self::Uint32),
            3 => Ok(Self::Uint64),
            4 => Ok(Self::Int32),
            5 => Ok(Self::Int64),
            other => Err(Error::UnknownDataType(other)),
        }
    }

    /// The backend wire code for this data type.
    #[must_use]
    pub const fn as_raw(self) -> u32 {
        match self {
            Self::Float32 => 0,
            Self::Float64 => 1,
            Self::Uint32 => 2,
            Self::Uint64 => 3,
            Self::Int32 => 4,
            Self::Int64 => 5,
        }
    }
}

/// Unit or interpretation of a counter's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UsageType {
    /// Ratio of two different values or types.
    Ratio,
    /// Percentage, typically within [0, 100] but may exceed it for some counters.
    Percentage,
    /// Clock cycles.
    Cycles,
    /// Milliseconds.
    Milliseconds,
    /// Bytes.
    Bytes,
    /// Count of items or objects (vertices, triangles, threads, pixels, ...).
    Items,
    /// Kilobytes.
    Kilobytes,
}

impl UsageType {
    /// Decode a backend usage-type code.
    pub fn from_raw(raw: u32) -> Result<Self> {
        match raw {
            0 => Ok(Self::Ratio),
            1 => Ok(Self::Percentage),
            2 => Ok(Self::Cycles),
            3 => Ok(Self::Milliseconds),
            4 => Ok(Self::Bytes),
            5 => Ok(Self::Items),
            6 => Ok(Self::Kilobytes),
            other => Err(Error::UnknownUsageType(other)),
        }
    }

    /// The backend wire code for this usage type.
    #[must_use]
    pub const fn as_raw(self) -> u32 {
        match self {
            Self::Ratio => 0,
            Self::Percentage => 1,
            Self::Cycles => 2,
            Self::Milliseconds => 3,
            Self::Bytes => 4,
            Self::Items => 5,
            Self::Kilobytes => 6,
        }
    }
}

/// Descriptor of a single hardware counter.
///
/// The index is assigned by the backend and stays stable for the lifetime of
/// the context the counter was enumerated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    /// Backend-assigned counter index.
    pub index: u32,
    /// Numeric type of the counter's value.
    pub data_type: DataType,
    /// Unit or interpretation of the counter's value.
    pub usage: UsageType,
}

/// Rendering API a profiling backend is loaded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProfileApi {
    /// Direct3D 10.
    Direct3D10,
    /// Direct3D 11.
    Direct3D11,
    /// OpenGL.
    OpenGl,
    /// OpenCL.
    OpenCl,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_round_trip() {
        for raw in 0..6 {
            let decoded = DataType::from_raw(raw).unwrap();
            assert_eq!(decoded.as_raw(), raw);
        }
    }

    #[test]
    fn unknown_data_type_code_is_an_error() {
        match DataType::from_raw(17) {
            Err(Error::UnknownDataType(17)) => {}
            other => panic!("expected UnknownDataType, got {other:?}"),
        }
    }

    #[test]
    fn usage_type_round_trip() {
        for raw in 0..7 {
            let decoded = UsageType::from_raw(raw).unwrap();
            assert_eq!(decoded.as_raw(), raw);
        }
    }

    #[test]
    fn unknown_usage_type_code_is_an_error() {
        match UsageType::from_raw(99) {
            Err(Error::UnknownUsageType(99)) => {}
            other => panic!("expected UnknownUsageType, got {other:?}"),
        }
    }
}
