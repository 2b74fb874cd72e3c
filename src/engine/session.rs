//! Engine session: the live pairing of a context and an opened document.

use std::fmt;
use std::sync::Mutex;

use super::backend::EngineDocument;
use super::context::EngineContext;
use crate::error::{Error, Result};

/// An engine context plus the document opened in it, behind one lock.
///
/// Every engine access goes through [`EngineSession::with_document`], so
/// calls against the same session are serialized. Dropping the session
/// releases the document before the context.
pub struct EngineSession {
    inner: Mutex<SessionInner>,
}

struct SessionInner {
    document: Option<Box<dyn EngineDocument>>,
    context: Option<EngineContext>,
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        drop(self.document.take());
        drop(self.context.take());
    }
}

impl EngineSession {
    pub fn new(context: EngineContext, document: Box<dyn EngineDocument>) -> Self {
        Self {
            inner: Mutex::new(SessionInner {
                document: Some(document),
                context: Some(context),
            }),
        }
    }

    /// Run `f` with exclusive access to the document and its context.
    pub fn with_document<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut dyn EngineDocument, &EngineContext) -> Result<R>,
    {
        let mut inner = self.inner.lock().map_err(|_| Error::Poisoned)?;
        let SessionInner { document, context } = &mut *inner;
        match (document.as_deref_mut(), context.as_ref()) {
            (Some(document), Some(context)) => f(document, context),
            _ => Err(Error::NotOpen),
        }
    }

    /// Release the document, then the context.
    pub fn close(self) {
        log::debug!("closing engine session");
        drop(self);
    }
}

impl fmt::Debug for EngineSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = self
            .inner
            .try_lock()
            .map(|inner| inner.document.is_some())
            .ok();
        f.debug_struct("EngineSession").field("open", &open).finish()
    }
}
