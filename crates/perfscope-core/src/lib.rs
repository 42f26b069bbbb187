//! Core types and errors for the perfscope profiler.
//!
//! This crate provides the foundational types used throughout the profiler:
//! - Counter descriptors and their data/usage classifications
//! - The tagged counter value returned by result decoding
//! - The rendering-API target selector
//! - Common error types

pub mod error;
pub mod types;
pub mod value;

pub use error::{Error, Result};
pub use types::{Counter, DataType, ProfileApi, UsageType};
pub use value::CounterValue;
