//! Metadata attached to geometries and their attributes.
//!
//! Metadata entries are named byte blobs with typed accessors. A metadata
//! block can also hold named sub-blocks. Geometry metadata additionally
//! carries one block per attribute, keyed by the attribute's unique id.

use smallvec::SmallVec;
use std::fmt;

/// Raw value of a metadata entry.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct EntryValue {
    data: Vec<u8>,
}

impl EntryValue {
    /// Wrap raw bytes.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    /// Raw bytes of the value.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Interpret as a little-endian i32.
    pub fn as_int(&self) -> Option<i32> {
        let bytes: [u8; 4] = self.data.as_slice().try_into().ok()?;
        Some(i32::from_le_bytes(bytes))
    }

    /// Interpret as a little-endian f64.
    pub fn as_double(&self) -> Option<f64> {
        let bytes: [u8; 8] = self.data.as_slice().try_into().ok()?;
        Some(f64::from_le_bytes(bytes))
    }

    /// Interpret as a sequence of little-endian i32.
    pub fn as_int_array(&self) -> Option<Vec<i32>> {
        if self.data.len() % 4 != 0 {
            return None;
        }
        Some(
            self.data
                .chunks_exact(4)
                .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        )
    }

    /// Interpret as UTF-8 text.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }
}

impl fmt::Debug for EntryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(s) => write!(f, "{s:?}"),
            None => write!(f, "{:?}", self.data),
        }
    }
}

/// A block of named entries and named sub-blocks.
///
/// Uses SmallVec optimization for the common case of few entries.
#[derive(Clone, Default, PartialEq)]
pub struct Metadata {
    entries: SmallVec<[(String, EntryValue); 4]>,
    sub_metadatas: Vec<(String, Metadata)>,
}

impl Metadata {
    /// Human readable attribute name.
    pub const NAME_KEY: &'static str = "name";

    /// Marker set on attributes decoded by a filtered (split) call.
    pub const OUTPUT_KEY: &'static str = "output";

    /// Create empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry.
    pub fn add_entry(&mut self, key: impl Into<String>, value: EntryValue) {
        let key = key.into();
        for (k, v) in &mut self.entries {
            if *k == key {
                *v = value;
                return;
            }
        }
        self.entries.push((key, value));
    }

    pub fn add_entry_int(&mut self, key: impl Into<String>, value: i32) {
        self.add_entry(key, EntryValue::from_bytes(value.to_le_bytes()));
    }

    pub fn add_entry_double(&mut self, key: impl Into<String>, value: f64) {
        self.add_entry(key, EntryValue::from_bytes(value.to_le_bytes()));
    }

    pub fn add_entry_string(&mut self, key: impl Into<String>, value: &str) {
        self.add_entry(key, EntryValue::from_bytes(value.as_bytes()));
    }

    /// Get an entry by key.
    pub fn entry(&self, key: &str) -> Option<&EntryValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_entry_int(&self, key: &str) -> Option<i32> {
        self.entry(key).and_then(EntryValue::as_int)
    }

    pub fn get_entry_double(&self, key: &str) -> Option<f64> {
        self.entry(key).and_then(EntryValue::as_double)
    }

    pub fn get_entry_string(&self, key: &str) -> Option<&str> {
        self.entry(key).and_then(EntryValue::as_str)
    }

    /// Remove an entry and return its value.
    pub fn remove_entry(&mut self, key: &str) -> Option<EntryValue> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Number of entries (sub-blocks not counted).
    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }

    /// Iterate over entries.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &EntryValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Add or replace a named sub-block.
    pub fn add_sub_metadata(&mut self, name: impl Into<String>, sub: Metadata) {
        let name = name.into();
        match self.sub_metadatas.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => *existing = sub,
            None => self.sub_metadatas.push((name, sub)),
        }
    }

    /// Get a named sub-block.
    pub fn sub_metadata(&self, name: &str) -> Option<&Metadata> {
        self.sub_metadatas.iter().find(|(k, _)| k == name).map(|(_, m)| m)
    }

    /// Number of sub-blocks.
    pub fn num_sub_metadatas(&self) -> usize {
        self.sub_metadatas.len()
    }

    /// Check if there are neither entries nor sub-blocks.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.sub_metadatas.is_empty()
    }
}

impl fmt::Debug for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        map.entries(self.entries.iter().map(|(k, v)| (k, v)));
        map.entries(self.sub_metadatas.iter().map(|(k, m)| (k, m)));
        map.finish()
    }
}

/// Metadata of a single attribute.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeMetadata {
    att_unique_id: u32,
    metadata: Metadata,
}

impl AttributeMetadata {
    pub fn new(att_unique_id: u32) -> Self {
        Self { att_unique_id, metadata: Metadata::new() }
    }

    /// Unique id of the attribute this block describes.
    pub fn att_unique_id(&self) -> u32 {
        self.att_unique_id
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

impl std::ops::Deref for AttributeMetadata {
    type Target = Metadata;

    fn deref(&self) -> &Metadata {
        &self.metadata
    }
}

impl std::ops::DerefMut for AttributeMetadata {
    fn deref_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

/// Geometry-level metadata plus the per-attribute blocks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeometryMetadata {
    metadata: Metadata,
    attribute_metadatas: Vec<AttributeMetadata>,
}

impl GeometryMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    /// Add an attribute block, replacing any block with the same unique id.
    pub fn add_attribute_metadata(&mut self, att_metadata: AttributeMetadata) {
        let id = att_metadata.att_unique_id();
        match self.attribute_metadata_mut(id) {
            Some(existing) => *existing = att_metadata,
            None => self.attribute_metadatas.push(att_metadata),
        }
    }

    /// Block for the attribute with `unique_id`.
    pub fn attribute_metadata(&self, unique_id: u32) -> Option<&AttributeMetadata> {
        self.attribute_metadatas.iter().find(|m| m.att_unique_id() == unique_id)
    }

    pub fn attribute_metadata_mut(&mut self, unique_id: u32) -> Option<&mut AttributeMetadata> {
        self.attribute_metadatas.iter_mut().find(|m| m.att_unique_id() == unique_id)
    }

    /// Find the first attribute block whose entry `key` equals `value`.
    pub fn attribute_metadata_by_string_entry(&self, key: &str, value: &str) -> Option<&AttributeMetadata> {
        self.attribute_metadatas
            .iter()
            .find(|m| m.get_entry_string(key) == Some(value))
    }

    pub fn attribute_metadatas(&self) -> &[AttributeMetadata] {
        &self.attribute_metadatas
    }
}

impl std::ops::Deref for GeometryMetadata {
    type Target = Metadata;

    fn deref(&self) -> &Metadata {
        &self.metadata
    }
}

impl std::ops::DerefMut for GeometryMetadata {
    fn deref_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
