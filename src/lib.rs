//! # docview-pdf
//!
//! PDF backend for document viewers.
//!
//! The crate plugs a PDF engine (built on lopdf) into a viewer's
//! document-backend contract: it opens files (with password support), reports
//! page counts and sizes, lists document information, and turns the PDF
//! outline and link annotations into the viewer's generic link and tree types.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docview_pdf::plugin::DocumentBackend;
//!
//! fn main() -> docview_pdf::Result<()> {
//!     let plugin = docview_pdf::register();
//!     let mut document = docview_pdf::Document::new("document.pdf");
//!     plugin.backend.document_open(&mut document)?;
//!
//!     println!("{} pages", document.page_count());
//!     for entry in plugin.backend.document_get_information(&document)? {
//!         println!("{}: {}", entry.kind.label(), entry.value);
//!     }
//!
//!     plugin.backend.document_free(&mut document)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Layout
//!
//! - [`engine`]: the PDF engine (context, handlers, lopdf documents, link URIs)
//! - [`model`]: host-side document, page, link and tree types
//! - [`plugin`]: the backend contract and its PDF implementation
//! - `ffi` (feature `ffi`): C ABI for hosts loading the plugin dynamically

pub mod detect;
pub mod engine;
pub mod error;
pub mod model;
pub mod plugin;

#[cfg(feature = "ffi")]
pub mod ffi;

// Re-export commonly used types
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, PdfFormat};
pub use engine::{EngineOptions, LopdfDocument};
pub use error::{Error, ErrorCode, Result};
pub use model::{
    DestinationType, Document, IndexElement, IndexTree, InformationEntry, InformationType, Link,
    LinkTarget, LinkType, Page, Rectangle, TreeNode,
};
pub use plugin::{register, register_with, DocumentBackend, PdfPlugin, PluginDefinition};

use std::path::Path;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Open a PDF file with the default backend.
///
/// # Example
///
/// ```no_run
/// use docview_pdf::open_document;
///
/// let doc = open_document("encrypted.pdf", Some("secret")).unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn open_document<P: AsRef<Path>>(path: P, password: Option<&str>) -> Result<Document> {
    open_document_with_options(path, password, EngineOptions::default())
}

/// Open a PDF file with custom engine options.
pub fn open_document_with_options<P: AsRef<Path>>(
    path: P,
    password: Option<&str>,
    options: EngineOptions,
) -> Result<Document> {
    let mut document = Document::new(path.as_ref());
    if let Some(password) = password {
        document = document.with_password(password);
    }
    PdfPlugin::with_options(options).document_open(&mut document)?;
    Ok(document)
}

/// Build the index of a PDF file.
///
/// # Example
///
/// ```no_run
/// let index = docview_pdf::index_file("book.pdf").unwrap();
/// index.walk(|depth, element| println!("{}{}", "  ".repeat(depth - 1), element.title));
/// ```
pub fn index_file<P: AsRef<Path>>(path: P) -> Result<IndexTree> {
    let document = open_document(path, None)?;
    PdfPlugin::new().document_index_generate(&document)
}
