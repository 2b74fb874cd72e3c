//! C-ABI FFI bindings for hosts that load the plugin as a shared library.
//!
//! Documents are opaque handles. Every function returns an [`ErrorCode`];
//! results that are not plain numbers come back as JSON strings that must be
//! released with [`docview_pdf_free_string`].

use std::ffi::{c_char, CStr, CString};
use std::path::Path;
use std::ptr;

use serde::Serialize;

use crate::error::ErrorCode;
use crate::model::Document;
use crate::plugin::{DocumentBackend, PdfPlugin};

/// Opaque document handle.
pub struct DocviewPdfDocument {
    backend: PdfPlugin,
    document: Document,
}

unsafe fn str_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

unsafe fn write_json<T: Serialize>(value: &T, out: *mut *mut c_char) -> ErrorCode {
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("failed to serialize result: {}", e);
            return ErrorCode::Unknown;
        }
    };
    match CString::new(json) {
        Ok(s) => {
            *out = s.into_raw();
            ErrorCode::Ok
        }
        Err(_) => ErrorCode::Unknown,
    }
}

/// Open a PDF document.
///
/// `password` may be null. On success `*out` receives a handle that must be
/// released with `docview_pdf_document_free`; on failure it is set to null.
///
/// # Safety
///
/// `path` and a non-null `password` must be valid null-terminated UTF-8
/// strings; `out` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn docview_pdf_document_open(
    path: *const c_char,
    password: *const c_char,
    out: *mut *mut DocviewPdfDocument,
) -> ErrorCode {
    if out.is_null() {
        return ErrorCode::InvalidArguments;
    }
    *out = ptr::null_mut();

    let Some(path) = str_arg(path) else {
        return ErrorCode::InvalidArguments;
    };
    let password = if password.is_null() {
        None
    } else {
        match str_arg(password) {
            Some(p) => Some(p),
            None => return ErrorCode::InvalidArguments,
        }
    };

    let backend = PdfPlugin::new();
    let mut document = Document::new(path);
    if let Some(password) = password {
        document = document.with_password(password);
    }

    match backend.document_open(&mut document) {
        Ok(()) => {
            *out = Box::into_raw(Box::new(DocviewPdfDocument { backend, document }));
            ErrorCode::Ok
        }
        Err(e) => e.code(),
    }
}

/// Close a document and release its handle.
///
/// # Safety
///
/// `handle` must come from `docview_pdf_document_open` and must not be used
/// afterwards.
#[no_mangle]
pub unsafe extern "C" fn docview_pdf_document_free(handle: *mut DocviewPdfDocument) -> ErrorCode {
    if handle.is_null() {
        return ErrorCode::InvalidArguments;
    }
    let mut handle = Box::from_raw(handle);
    let DocviewPdfDocument { backend, document } = &mut *handle;
    match backend.document_free(document) {
        Ok(()) => ErrorCode::Ok,
        Err(e) => e.code(),
    }
}

/// Save a document to another path.
///
/// # Safety
///
/// `handle` must be a live handle and `path` a valid null-terminated UTF-8
/// string.
#[no_mangle]
pub unsafe extern "C" fn docview_pdf_document_save_as(
    handle: *const DocviewPdfDocument,
    path: *const c_char,
) -> ErrorCode {
    let (Some(handle), Some(path)) = (handle.as_ref(), str_arg(path)) else {
        return ErrorCode::InvalidArguments;
    };
    match handle.backend.document_save_as(&handle.document, Path::new(path)) {
        Ok(()) => ErrorCode::Ok,
        Err(e) => e.code(),
    }
}

/// Number of pages, or -1 for a null handle.
///
/// # Safety
///
/// `handle` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn docview_pdf_document_page_count(handle: *const DocviewPdfDocument) -> i64 {
    match handle.as_ref() {
        Some(handle) => i64::from(handle.document.page_count()),
        None => -1,
    }
}

/// Document information as a JSON array of `{"type": ..., "value": ...}`.
///
/// # Safety
///
/// `handle` must be a live handle and `out` a valid pointer. The string
/// stored in `*out` must be freed with `docview_pdf_free_string`.
#[no_mangle]
pub unsafe extern "C" fn docview_pdf_document_get_information(
    handle: *const DocviewPdfDocument,
    out: *mut *mut c_char,
) -> ErrorCode {
    let Some(handle) = handle.as_ref() else {
        return ErrorCode::InvalidArguments;
    };
    if out.is_null() {
        return ErrorCode::InvalidArguments;
    }
    *out = ptr::null_mut();

    match handle.backend.document_get_information(&handle.document) {
        Ok(entries) => write_json(&entries, out),
        Err(e) => e.code(),
    }
}

/// Document index as a JSON tree rooted at `ROOT`.
///
/// # Safety
///
/// `handle` must be a live handle and `out` a valid pointer. The string
/// stored in `*out` must be freed with `docview_pdf_free_string`.
#[no_mangle]
pub unsafe extern "C" fn docview_pdf_document_index_generate(
    handle: *const DocviewPdfDocument,
    out: *mut *mut c_char,
) -> ErrorCode {
    let Some(handle) = handle.as_ref() else {
        return ErrorCode::InvalidArguments;
    };
    if out.is_null() {
        return ErrorCode::InvalidArguments;
    }
    *out = ptr::null_mut();

    match handle.backend.document_index_generate(&handle.document) {
        Ok(index) => write_json(&index, out),
        Err(e) => e.code(),
    }
}

/// Free a string allocated by this library.
///
/// # Safety
///
/// The `ptr` must have been returned by this library.
/// This function should only be called once per pointer.
#[no_mangle]
pub unsafe extern "C" fn docview_pdf_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Get the version of the library.
///
/// The returned string is statically allocated and should not be freed.
#[no_mangle]
pub extern "C" fn docview_pdf_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
