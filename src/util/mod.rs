//! Utility types and functions.
//!
//! - [`Error`] / [`Result`] - Error handling
//! - [`pod`] helpers - checked reinterpretation of raw little-endian bytes
//! - [`fs`] helpers - output directory handling and file name sanitizing
//! - Math type re-exports from glam

mod error;
mod pod;
mod math;
pub mod fs;

pub use error::*;
pub use pod::*;
pub use math::*;
