//! Error types for docview-pdf.

use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for docview-pdf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error codes understood by the host application.
///
/// This is the only error taxonomy that crosses the plugin boundary; every
/// [`Error`] collapses onto one of these through [`Error::code`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    /// No error occurred.
    Ok = 0,
    /// An unknown error occurred.
    Unknown = 1,
    /// Out of memory.
    OutOfMemory = 2,
    /// The called function is not implemented.
    NotImplemented = 3,
    /// Invalid arguments were passed.
    InvalidArguments = 4,
    /// The password is missing or wrong.
    InvalidPassword = 5,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::Ok => "ok",
            ErrorCode::Unknown => "unknown error",
            ErrorCode::OutOfMemory => "out of memory",
            ErrorCode::NotImplemented => "not implemented",
            ErrorCode::InvalidArguments => "invalid arguments",
            ErrorCode::InvalidPassword => "invalid password",
        };
        f.write_str(s)
    }
}

/// Error types that can occur inside the plugin.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// No registered handler accepts the document.
    #[error("No document handler for {0}")]
    NoHandler(String),

    /// Error reported by the PDF engine.
    #[error("PDF engine error: {0}")]
    Engine(String),

    /// The document is encrypted and no password was supplied.
    #[error("Document is encrypted")]
    Encrypted,

    /// The document uses an encryption scheme this backend cannot decrypt.
    #[error("Unsupported encryption: {0}")]
    UnsupportedEncryption(String),

    /// The provided password is incorrect.
    #[error("Invalid password")]
    InvalidPassword,

    /// Page index is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// An argument passed by the host was unusable.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The host document has no open session attached.
    #[error("Document is not open")]
    NotOpen,

    /// The operation is not provided by this backend.
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    /// The session lock was poisoned by a panicking thread.
    #[error("Engine session lock poisoned")]
    Poisoned,
}

impl Error {
    /// Collapse the error onto the host error code.
    ///
    /// Everything the engine reports becomes [`ErrorCode::Unknown`]; only
    /// argument and password failures keep a distinct code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Encrypted | Error::InvalidPassword => ErrorCode::InvalidPassword,
            Error::InvalidArgument(_) | Error::NotOpen | Error::PageOutOfRange(..) => {
                ErrorCode::InvalidArguments
            }
            Error::NotImplemented(_) => ErrorCode::NotImplemented,
            Error::Io(e) if e.kind() == io::ErrorKind::OutOfMemory => ErrorCode::OutOfMemory,
            _ => ErrorCode::Unknown,
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::Engine(err.to_string()),
        }
    }
}
