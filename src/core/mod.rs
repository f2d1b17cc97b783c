//! Core layer - cursor, options and metadata containers.
//!
//! This module provides:
//! - [`DecoderBuffer`] - Read cursor carrying the negotiated bitstream version
//! - [`DecoderOptions`] - Named options consulted during decoding
//! - [`Metadata`] / [`GeometryMetadata`] - Key-value metadata storage

mod buffer;
mod metadata;
mod options;

pub use buffer::{zigzag_decode, DecoderBuffer};
pub use metadata::{AttributeMetadata, EntryValue, GeometryMetadata, Metadata};
pub use options::{
    DecoderOptions, Options, ATTRIBUTE_NAME_KEY, FORMAT_OUTPUT_KEY, SKIP_ATTRIBUTE_TRANSFORM_KEY,
    SPLIT_ATTR_KEY, TO_GENERIC_KEY,
};
