//! Utility types shared by the whole decoder.
//!
//! - [`DataType`] - Component data types of attribute values
//! - [`Error`] / [`Result`] - Error handling

mod data_type;
mod error;

pub use data_type::*;
pub use error::*;
