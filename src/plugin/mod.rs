//! The document-backend contract and its PDF implementation.
//!
//! A host viewer drives a backend through [`DocumentBackend`]: it creates a
//! [`Document`] for a path, calls `document_open`, then asks for pages,
//! information and the index, and finally calls `document_free`. Errors are
//! reported as [`crate::Error`]; [`crate::Error::code`] gives the host error
//! code.
//!
//! # Example
//!
//! ```no_run
//! use docview_pdf::model::Document;
//! use docview_pdf::plugin::{DocumentBackend, PdfPlugin};
//!
//! fn main() -> docview_pdf::Result<()> {
//!     let backend = PdfPlugin::new();
//!     let mut document = Document::new("report.pdf");
//!     backend.document_open(&mut document)?;
//!
//!     let index = backend.document_index_generate(&document)?;
//!     index.walk(|depth, element| println!("{}{}", "  ".repeat(depth - 1), element.title));
//!
//!     backend.document_free(&mut document)?;
//!     Ok(())
//! }
//! ```

mod document;
mod index;
mod links;
mod page;

pub use index::INDEX_ROOT_TITLE;
pub use links::link_from_uri;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::engine::EngineOptions;
use crate::error::Result;
use crate::model::{Document, IndexTree, InformationEntry, Link, Page};

/// MIME types handled by the PDF backend.
pub const MIME_TYPES: &[&str] = &["application/pdf"];

/// Operations a host calls on a document backend.
pub trait DocumentBackend: Send + Sync {
    /// Open the document's file and attach a session to it.
    fn document_open(&self, document: &mut Document) -> Result<()>;

    /// Detach and release the document's session.
    fn document_free(&self, document: &mut Document) -> Result<()>;

    /// Write the document to another path.
    fn document_save_as(&self, document: &Document, path: &Path) -> Result<()>;

    /// Non-empty document information entries.
    fn document_get_information(&self, document: &Document) -> Result<Vec<InformationEntry>>;

    /// Build the document index below a `ROOT` node.
    fn document_index_generate(&self, document: &Document) -> Result<IndexTree>;

    /// Fill in the page size.
    fn page_init(&self, document: &Document, page: &mut Page) -> Result<()>;

    /// Release per-page resources.
    fn page_clear(&self, document: &Document, page: &mut Page) -> Result<()>;

    /// The page label, if any.
    fn page_get_label(&self, document: &Document, page: &Page) -> Result<Option<String>>;

    /// Links on a page.
    fn page_links_get(&self, document: &Document, page: &Page) -> Result<Vec<Link>>;
}

/// PDF backend.
#[derive(Debug, Clone, Default)]
pub struct PdfPlugin {
    options: EngineOptions,
}

impl PdfPlugin {
    /// Create a backend with default engine options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend with custom engine options.
    pub fn with_options(options: EngineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }
}

impl DocumentBackend for PdfPlugin {
    fn document_open(&self, document: &mut Document) -> Result<()> {
        document::document_open(&self.options, document)
    }

    fn document_free(&self, document: &mut Document) -> Result<()> {
        document::document_free(document)
    }

    fn document_save_as(&self, document: &Document, path: &Path) -> Result<()> {
        document::document_save_as(document, path)
    }

    fn document_get_information(&self, document: &Document) -> Result<Vec<InformationEntry>> {
        document::document_get_information(document)
    }

    fn document_index_generate(&self, document: &Document) -> Result<IndexTree> {
        index::document_index_generate(document)
    }

    fn page_init(&self, document: &Document, page: &mut Page) -> Result<()> {
        page::page_init(document, page)
    }

    fn page_clear(&self, document: &Document, page: &mut Page) -> Result<()> {
        page::page_clear(document, page)
    }

    fn page_get_label(&self, document: &Document, page: &Page) -> Result<Option<String>> {
        page::page_get_label(document, page)
    }

    fn page_links_get(&self, document: &Document, page: &Page) -> Result<Vec<Link>> {
        links::page_links_get(document, page)
    }
}

/// What a host needs to load the backend.
#[derive(Clone)]
pub struct PluginDefinition {
    pub name: &'static str,
    pub version: &'static str,
    pub mime_types: &'static [&'static str],
    pub backend: Arc<dyn DocumentBackend>,
}

impl PluginDefinition {
    /// Check whether the plugin handles a MIME type.
    pub fn handles(&self, mime_type: &str) -> bool {
        self.mime_types
            .iter()
            .any(|m| m.eq_ignore_ascii_case(mime_type))
    }
}

impl fmt::Debug for PluginDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDefinition")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("mime_types", &self.mime_types)
            .finish()
    }
}

/// Plugin descriptor with the default PDF backend.
pub fn register() -> PluginDefinition {
    register_with(EngineOptions::default())
}

/// Plugin descriptor with a backend using custom engine options.
pub fn register_with(options: EngineOptions) -> PluginDefinition {
    PluginDefinition {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        mime_types: MIME_TYPES,
        backend: Arc::new(PdfPlugin::with_options(options)),
    }
}
