//! Engine context: resource store sizing, user style sheet and the
//! registry of document handlers.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use super::backend::EngineDocument;
use super::handler::{DocumentHandler, HandlerRegistry, PdfHandler};
use super::options::EngineOptions;
use crate::detect;
use crate::error::{Error, Result};

/// Engine context.
///
/// A context is not meant for unsynchronized use from several threads; the
/// session that owns it wraps it in a lock together with the document.
pub struct EngineContext {
    store_size: usize,
    user_css: String,
    handlers: HandlerRegistry,
}

impl EngineContext {
    /// Create a context with an empty handler registry.
    pub fn new(store_size: usize) -> Self {
        log::debug!("creating engine context (store {} bytes)", store_size);
        Self {
            store_size,
            user_css: String::new(),
            handlers: HandlerRegistry::new(),
        }
    }

    /// Create a fully configured context: style sheet, extra handlers from
    /// the options, then the built-in handlers.
    pub fn from_options(options: &EngineOptions) -> Self {
        let mut context = Self::new(options.store_size);
        context.set_user_css(options.user_style_sheet.clone());
        for handler in &options.handlers {
            context.register_handler(handler.clone());
        }
        context.register_document_handlers();
        context
    }

    pub fn store_size(&self) -> usize {
        self.store_size
    }

    pub fn set_user_css(&mut self, css: impl Into<String>) {
        self.user_css = css.into();
    }

    pub fn user_css(&self) -> &str {
        &self.user_css
    }

    /// Register the built-in document handlers.
    pub fn register_document_handlers(&mut self) {
        self.handlers.register(Arc::new(PdfHandler::new()));
    }

    pub fn register_handler(&mut self, handler: Arc<dyn DocumentHandler>) {
        self.handlers.register(handler);
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Open a document with the handler that recognizes it.
    pub fn open_document(&self, path: &Path) -> Result<Box<dyn EngineDocument>> {
        let header = detect::read_header(path)?;
        let handler = self
            .handlers
            .find(path, &header)
            .ok_or_else(|| Error::NoHandler(path.display().to_string()))?;

        log::debug!("opening {} with handler '{}'", path.display(), handler.name());
        handler.open(path)
    }
}

impl fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineContext")
            .field("store_size", &self.store_size)
            .field("handlers", &self.handlers.handler_names())
            .finish()
    }
}
