//! Page adapter.

use crate::error::{Error, Result};
use crate::model::{Document, Page};

/// Check that `page` belongs to the open document.
fn check_page(document: &Document, page: &Page) -> Result<()> {
    if !document.is_open() {
        return Err(Error::NotOpen);
    }
    if page.index() >= document.page_count() {
        return Err(Error::PageOutOfRange(page.index(), document.page_count()));
    }
    Ok(())
}

/// Set the page size from the engine's page bounds.
pub(crate) fn page_init(document: &Document, page: &mut Page) -> Result<()> {
    check_page(document, page)?;
    let session = document.data().ok_or(Error::NotOpen)?;
    let bounds = session.with_document(|engine, _| engine.page_bounds(page.index()))?;

    page.set_width(f64::from(bounds.width()));
    page.set_height(f64::from(bounds.height()));
    Ok(())
}

/// Pages hold no engine resources; only the arguments are checked.
pub(crate) fn page_clear(document: &Document, page: &mut Page) -> Result<()> {
    check_page(document, page)
}

/// The page label, if the document defines a non-empty one.
pub(crate) fn page_get_label(document: &Document, page: &Page) -> Result<Option<String>> {
    check_page(document, page)?;
    let session = document.data().ok_or(Error::NotOpen)?;
    let label = session.with_document(|engine, _| engine.page_label(page.index()))?;
    Ok(label.filter(|l| !l.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_document() {
        let document = Document::new("a.pdf");
        let mut page = Page::new(0);
        assert!(matches!(page_init(&document, &mut page), Err(Error::NotOpen)));
        assert!(matches!(page_clear(&document, &mut page), Err(Error::NotOpen)));
        assert!(matches!(page_get_label(&document, &page), Err(Error::NotOpen)));
        assert_eq!(page.width(), 0.0);
    }
}
