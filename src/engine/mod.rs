//! PDF engine layer.
//!
//! Everything the plugin knows about PDF internals lives here: opening files
//! through registered handlers, the [`EngineDocument`] abstraction and its
//! lopdf implementation, and the link URI scheme used to describe targets.

mod backend;
mod context;
mod handler;
pub mod labels;
mod lopdf_backend;
mod options;
mod security;
mod session;
pub mod uri;

pub use backend::{
    decode_text_string, EngineDocument, EngineLink, OutlineEntry, Rect, ResolvedLink,
};
pub use context::EngineContext;
pub use handler::{DocumentHandler, HandlerRegistry, PdfHandler};
pub use lopdf_backend::LopdfDocument;
pub use options::{EngineOptions, DEFAULT_STORE_SIZE, DEFAULT_USER_STYLE_SHEET};
pub use security::SecurityHandler;
pub use session::EngineSession;
