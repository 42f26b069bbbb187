//! Backend interface and dynamic loading for the perfscope profiler.
//!
//! This crate provides:
//! - The [`Backend`] capability trait every profiler component talks through
//! - The raw C ABI of the vendor profiling module ([`ffi`])
//! - [`DynamicBackend`], which discovers and loads the vendor module at
//!   runtime and resolves its full entry-point table eagerly

pub mod backend;
pub mod dynamic;
pub mod ffi;

pub use backend::{Backend, NativeContext};
pub use dynamic::DynamicBackend;
