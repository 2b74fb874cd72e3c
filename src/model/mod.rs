//! Host-side types.
//!
//! These mirror the abstractions a document viewer exposes to its backend
//! plugins: the document and page objects it owns, the information entries
//! it lists, the links it follows, and the generic tree it renders as an
//! index. Nothing in here knows about the PDF engine.

mod document;
mod link;
mod page;
mod tree;

pub use document::{parse_pdf_date, Document, InformationEntry, InformationType};
pub use link::{DestinationType, Link, LinkTarget, LinkType, Rectangle};
pub use page::Page;
pub use tree::{IndexElement, IndexTree, TreeNode};
