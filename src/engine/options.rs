//! Engine configuration.

use std::fmt;
use std::sync::Arc;

use super::handler::DocumentHandler;

/// Default size of the engine resource store (256 MiB).
pub const DEFAULT_STORE_SIZE: usize = 256 << 20;

/// User style sheet applied to every context.
///
/// Only reflowable formats consult it; fixed-layout PDF pages ignore it.
pub const DEFAULT_USER_STYLE_SHEET: &str = "@page { margin: 1em; }\n\
     body { line-height: 1.4; }\n\
     p { text-align: justify; hyphens: auto; }\n";

/// Options for creating engine contexts.
#[derive(Clone)]
pub struct EngineOptions {
    /// Resource store size in bytes
    pub store_size: usize,

    /// Style sheet handed to the context after creation
    pub user_style_sheet: String,

    /// Handlers registered ahead of the built-in ones
    pub handlers: Vec<Arc<dyn DocumentHandler>>,
}

impl EngineOptions {
    /// Create new engine options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the resource store size in bytes.
    pub fn with_store_size(mut self, bytes: usize) -> Self {
        self.store_size = bytes;
        self
    }

    /// Replace the user style sheet.
    pub fn with_user_style_sheet(mut self, css: impl Into<String>) -> Self {
        self.user_style_sheet = css.into();
        self
    }

    /// Register an additional document handler.
    ///
    /// Extra handlers are consulted before the built-in PDF handler.
    pub fn with_handler(mut self, handler: Arc<dyn DocumentHandler>) -> Self {
        self.handlers.push(handler);
        self
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            store_size: DEFAULT_STORE_SIZE,
            user_style_sheet: DEFAULT_USER_STYLE_SHEET.to_string(),
            handlers: Vec::new(),
        }
    }
}

impl fmt::Debug for EngineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers: Vec<&str> = self.handlers.iter().map(|h| h.name()).collect();
        f.debug_struct("EngineOptions")
            .field("store_size", &self.store_size)
            .field("user_style_sheet", &self.user_style_sheet)
            .field("handlers", &handlers)
            .finish()
    }
}
