//! Serialized forms of [`LayoutResult`] for caller-side caches.
//!
//! The engine never caches on its own. Callers that retain layouts across
//! frames or processes can store them with these helpers.

use core::fmt;

use crate::render_ir::LayoutResult;

/// Error from encoding or decoding a persisted layout.
#[derive(Debug)]
pub enum PersistError {
    /// Serialization failed.
    Encode(String),
    /// Payload could not be decoded.
    Decode(String),
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode(msg) => write!(f, "layout encode failed: {}", msg),
            Self::Decode(msg) => write!(f, "layout decode failed: {}", msg),
        }
    }
}

impl std::error::Error for PersistError {}

/// Encode a layout as a compact postcard payload.
pub fn encode_layout(layout: &LayoutResult) -> Result<Vec<u8>, PersistError> {
    postcard::to_allocvec(layout).map_err(|err| PersistError::Encode(err.to_string()))
}

/// Decode a payload produced by [`encode_layout`].
pub fn decode_layout(bytes: &[u8]) -> Result<LayoutResult, PersistError> {
    postcard::from_bytes(bytes).map_err(|err| PersistError::Decode(err.to_string()))
}

/// Pretty JSON dump for debugging and snapshot fixtures.
pub fn layout_to_json(layout: &LayoutResult) -> Result<String, PersistError> {
    serde_json::to_string_pretty(layout).map_err(|err| PersistError::Encode(err.to_string()))
}

/// Parse a JSON dump produced by [`layout_to_json`].
pub fn layout_from_json(json: &str) -> Result<LayoutResult, PersistError> {
    serde_json::from_str(json).map_err(|err| PersistError::Decode(err.to_string()))
}
