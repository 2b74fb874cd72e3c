//! Document handlers.
//!
//! A handler knows how to recognize one document format and open it as an
//! [`EngineDocument`]. The context keeps them in a [`HandlerRegistry`] and
//! dispatches on the file's magic bytes first and its extension second.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use super::backend::EngineDocument;
use super::lopdf_backend::LopdfDocument;
use crate::detect;
use crate::error::Result;

/// Trait for document format handlers.
pub trait DocumentHandler: Send + Sync {
    /// Name of this handler.
    fn name(&self) -> &str;

    /// Supported file extensions, lowercase without the leading dot.
    fn extensions(&self) -> &[&str];

    /// MIME types this handler opens.
    fn mime_types(&self) -> &[&str];

    /// Check whether the leading bytes of a file belong to this format.
    fn recognize(&self, header: &[u8]) -> bool;

    /// Open the file at `path`.
    fn open(&self, path: &Path) -> Result<Box<dyn EngineDocument>>;

    /// Check if this handler supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Built-in PDF handler backed by lopdf.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfHandler;

impl PdfHandler {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentHandler for PdfHandler {
    fn name(&self) -> &str {
        "pdf"
    }

    fn extensions(&self) -> &[&str] {
        &["pdf"]
    }

    fn mime_types(&self) -> &[&str] {
        &["application/pdf"]
    }

    fn recognize(&self, header: &[u8]) -> bool {
        detect::is_pdf_bytes(header)
    }

    fn open(&self, path: &Path) -> Result<Box<dyn EngineDocument>> {
        Ok(Box::new(LopdfDocument::load_file(path)?))
    }
}

/// Registry of document handlers.
///
/// Handlers are consulted in registration order; for extensions the first
/// handler registered for it wins.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: Vec<Arc<dyn DocumentHandler>>,
    by_extension: HashMap<String, Arc<dyn DocumentHandler>>,
}

impl HandlerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler.
    ///
    /// A handler already registered under the same name is ignored.
    pub fn register(&mut self, handler: Arc<dyn DocumentHandler>) {
        if self.get(handler.name()).is_some() {
            log::debug!("handler '{}' already registered", handler.name());
            return;
        }
        for ext in handler.extensions() {
            self.by_extension
                .entry(ext.to_lowercase())
                .or_insert_with(|| handler.clone());
        }
        self.handlers.push(handler);
    }

    /// Get a handler by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn DocumentHandler>> {
        self.handlers
            .iter()
            .find(|h| h.name().eq_ignore_ascii_case(name))
            .cloned()
    }

    /// Find the handler for a file from its leading bytes, then its extension.
    pub fn find(&self, path: &Path, header: &[u8]) -> Option<Arc<dyn DocumentHandler>> {
        if let Some(handler) = self.handlers.iter().find(|h| h.recognize(header)) {
            return Some(handler.clone());
        }

        let ext = path.extension()?.to_str()?.to_lowercase();
        self.by_extension.get(&ext).cloned()
    }

    /// Names of all registered handlers, in registration order.
    pub fn handler_names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Check if no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }
}
