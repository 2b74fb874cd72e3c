//! Outline adapter: builds the host index from the engine outline.

use super::links::link_from_uri;
use crate::engine::{EngineDocument, OutlineEntry};
use crate::error::{Error, Result};
use crate::model::{Document, IndexElement, IndexTree, Rectangle};

/// Title of the root node handed to the host.
pub const INDEX_ROOT_TITLE: &str = "ROOT";

/// Generate the document index.
///
/// The whole traversal runs under the session lock. A document without an
/// outline yields a bare root.
pub(crate) fn document_index_generate(document: &Document) -> Result<IndexTree> {
    let session = document.data().ok_or(Error::NotOpen)?;
    session.with_document(|engine, _| {
        let outline = engine.load_outline()?;
        let mut root = IndexTree::new(IndexElement::new(INDEX_ROOT_TITLE));
        build_index(&*engine, &outline, &mut root)?;
        log::debug!(
            "index of {} has {} entries",
            document.path().display(),
            root.descendant_count()
        );
        Ok(root)
    })
}

/// Append `entries` below `parent`, depth-first.
///
/// An entry without a usable link is left out together with its children;
/// its siblings are still added.
fn build_index(
    engine: &dyn EngineDocument,
    entries: &[OutlineEntry],
    parent: &mut IndexTree,
) -> Result<()> {
    for entry in entries {
        let Some(link) = link_from_uri(engine, entry.uri.as_deref(), Rectangle::default())? else {
            log::debug!("skipping outline entry '{}'", entry.title);
            continue;
        };

        let node = parent.append_data(IndexElement::with_link(entry.title.clone(), link));
        build_index(engine, &entry.children, node)?;
    }
    Ok(())
}
