//! Engine document abstraction.
//!
//! Provides a trait-based interface for everything the plugin asks of the
//! PDF engine, isolating the concrete library (lopdf) from the host
//! adapters.

use std::path::Path;

use crate::error::{Error, Result};

/// Axis-aligned rectangle in engine page space (origin top-left, y down).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

/// One node of the engine's outline.
///
/// `uri` is `None` for entries without a target; otherwise it is a link URI
/// as described in [`crate::engine::uri`].
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineEntry {
    pub title: String,
    pub uri: Option<String>,
    pub children: Vec<OutlineEntry>,
}

impl OutlineEntry {
    pub fn new(title: impl Into<String>, uri: Option<String>) -> Self {
        Self {
            title: title.into(),
            uri,
            children: Vec::new(),
        }
    }
}

/// A link annotation on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineLink {
    pub rect: Rect,
    pub uri: String,
}

/// An internal link resolved to a page.
///
/// `x`/`y` are NaN when the destination does not pin that coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedLink {
    /// Zero-based page index.
    pub page: u32,
    pub x: f32,
    pub y: f32,
}

/// Abstract interface for an opened engine document.
///
/// Implementations are not required to be thread-safe beyond `Send`; the
/// plugin serializes every call through the session lock.
pub trait EngineDocument: Send {
    /// Whether the document still needs a password before it can be read.
    fn needs_password(&self) -> bool;

    /// Try a password. Returns `true` when the document is now readable.
    fn authenticate_password(&mut self, password: &str) -> bool;

    /// Number of pages.
    fn count_pages(&self) -> Result<u32>;

    /// Look up a text entry of the document information dictionary.
    ///
    /// Formats without an information dictionary return `Ok(None)`.
    fn lookup_metadata(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    /// Load the outline. An empty vector means the document has none.
    fn load_outline(&self) -> Result<Vec<OutlineEntry>>;

    /// Resolve an internal link URI to a page and position.
    ///
    /// Returns `Ok(None)` when the URI does not lead to a page of this
    /// document.
    fn resolve_link(&self, uri: &str) -> Result<Option<ResolvedLink>>;

    /// Bounds of a page in engine page space.
    fn page_bounds(&self, index: u32) -> Result<Rect>;

    /// Page label, if the document defines one for the page.
    fn page_label(&self, _index: u32) -> Result<Option<String>> {
        Ok(None)
    }

    /// Link annotations on a page.
    fn load_links(&self, _index: u32) -> Result<Vec<EngineLink>> {
        Ok(Vec::new())
    }

    /// Write the document to `path`.
    fn save(&mut self, _path: &Path) -> Result<()> {
        Err(Error::NotImplemented("save"))
    }
}

/// Decode a PDF text string.
///
/// Handles UTF-16BE (with BOM) and UTF-8 (with or without BOM), falling
/// back to Latin-1 for everything else.
pub fn decode_text_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Fallback: Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8() {
        assert_eq!(decode_text_string(b"Hello"), "Hello");
        assert_eq!(decode_text_string(b"\xEF\xBB\xBFHello"), "Hello");
    }

    #[test]
    fn test_decode_latin1() {
        // 0xE9 = 'é' in Latin-1
        let bytes = vec![0x48, 0x65, 0x6C, 0x6C, 0xE9];
        assert_eq!(decode_text_string(&bytes), "Hellé");
    }

    #[test]
    fn test_decode_utf16be() {
        let bytes = vec![0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69];
        assert_eq!(decode_text_string(&bytes), "Hi");
    }

    #[test]
    fn test_rect_size() {
        let rect = Rect::new(0.0, 0.0, 612.0, 792.0);
        assert_eq!(rect.width(), 612.0);
        assert_eq!(rect.height(), 792.0);
    }
}
