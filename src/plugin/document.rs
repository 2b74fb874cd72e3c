//! Document adapter: open, free, save-as and information.

use std::path::Path;

use crate::engine::{EngineContext, EngineOptions, EngineSession};
use crate::error::{Error, Result};
use crate::model::{Document, InformationEntry, InformationType};

/// Information dictionary keys in the order entries are reported.
const INFORMATION_KEYS: [(&str, InformationType); 8] = [
    ("Title", InformationType::Title),
    ("Author", InformationType::Author),
    ("Subject", InformationType::Subject),
    ("Keywords", InformationType::Keywords),
    ("Creator", InformationType::Creator),
    ("Producer", InformationType::Producer),
    ("CreationDate", InformationType::CreationDate),
    ("ModDate", InformationType::ModificationDate),
];

/// Open the document's file and attach an engine session to it.
///
/// On failure nothing stays attached; whatever was acquired is released,
/// document before context.
pub(crate) fn document_open(options: &EngineOptions, document: &mut Document) -> Result<()> {
    match open_session(options, document) {
        Ok((session, page_count)) => {
            document.set_page_count(page_count);
            document.set_data(Some(session));
            Ok(())
        }
        Err(e) => {
            log::debug!("failed to open {}: {}", document.path().display(), e);
            document.set_data(None);
            Err(e)
        }
    }
}

fn open_session(options: &EngineOptions, document: &Document) -> Result<(EngineSession, u32)> {
    if document.path().as_os_str().is_empty() {
        return Err(Error::InvalidArgument("document path is empty".to_string()));
    }

    let context = EngineContext::from_options(options);
    // Declared after the context so it is dropped first on early return.
    let mut engine = context.open_document(document.path())?;

    if engine.needs_password() {
        let Some(password) = document.password() else {
            return Err(Error::Encrypted);
        };
        if !engine.authenticate_password(password) {
            return Err(Error::InvalidPassword);
        }
    }

    let page_count = engine.count_pages()?;
    log::info!("opened {} ({} pages)", document.path().display(), page_count);
    Ok((EngineSession::new(context, engine), page_count))
}

/// Release the engine session, document handle first.
pub(crate) fn document_free(document: &mut Document) -> Result<()> {
    let session = document.take_data().ok_or(Error::NotOpen)?;
    session.close();
    Ok(())
}

/// Save the document to `path` through the engine.
pub(crate) fn document_save_as(document: &Document, path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(Error::InvalidArgument("target path is empty".to_string()));
    }
    let session = document.data().ok_or(Error::NotOpen)?;
    session
        .with_document(|engine, _| engine.save(path))
        .map_err(|e| {
            log::warn!("saving to {} failed: {}", path.display(), e);
            e
        })
}

/// Document information entries that are present and non-empty.
pub(crate) fn document_get_information(document: &Document) -> Result<Vec<InformationEntry>> {
    let session = document.data().ok_or(Error::NotOpen)?;
    session.with_document(|engine, _| {
        let mut entries = Vec::new();
        for (key, kind) in INFORMATION_KEYS {
            match engine.lookup_metadata(key)? {
                Some(value) if !value.is_empty() => {
                    entries.push(InformationEntry::new(kind, value))
                }
                _ => {}
            }
        }
        Ok(entries)
    })
}
