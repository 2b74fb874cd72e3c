//! Document-level host types.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::EngineSession;

/// A document as the host application sees it.
///
/// The host owns the path, the password the user typed and the page count
/// the backend reported. The backend attaches its engine session with
/// [`Document::set_data`] on open and detaches it on free.
pub struct Document {
    path: PathBuf,
    password: Option<String>,
    page_count: u32,
    data: Option<EngineSession>,
}

impl Document {
    /// Create a host document for a file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            password: None,
            page_count: 0,
            data: None,
        }
    }

    /// Attach the password to try when the file is encrypted.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Replace the password, e.g. after the user was prompted again.
    pub fn set_password(&mut self, password: Option<String>) {
        self.password = password;
    }

    /// Number of pages reported by the backend (0 until opened).
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn set_page_count(&mut self, count: u32) {
        self.page_count = count;
    }

    /// The backend session attached to this document, if open.
    pub fn data(&self) -> Option<&EngineSession> {
        self.data.as_ref()
    }

    pub fn set_data(&mut self, data: Option<EngineSession>) {
        self.data = data;
    }

    /// Detach the backend session, leaving the document closed.
    pub fn take_data(&mut self) -> Option<EngineSession> {
        self.data.take()
    }

    /// Whether a backend session is attached.
    pub fn is_open(&self) -> bool {
        self.data.is_some()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("path", &self.path)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("page_count", &self.page_count)
            .field("open", &self.is_open())
            .finish()
    }
}

/// Kind of a document information entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InformationType {
    Title,
    Author,
    Subject,
    Keywords,
    Creator,
    Producer,
    CreationDate,
    ModificationDate,
}

impl InformationType {
    /// Human readable label used by viewers when listing the entry.
    pub fn label(self) -> &'static str {
        match self {
            InformationType::Title => "Title",
            InformationType::Author => "Author",
            InformationType::Subject => "Subject",
            InformationType::Keywords => "Keywords",
            InformationType::Creator => "Creator",
            InformationType::Producer => "Producer",
            InformationType::CreationDate => "Creation date",
            InformationType::ModificationDate => "Modification date",
        }
    }

    /// Whether the value is a date string.
    pub fn is_date(self) -> bool {
        matches!(
            self,
            InformationType::CreationDate | InformationType::ModificationDate
        )
    }
}

/// A single document information entry.
///
/// Values are passed through exactly as the document stores them; dates
/// keep their raw `D:YYYYMMDDHHmmSS...` form. Use [`InformationEntry::as_datetime`]
/// to interpret one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InformationEntry {
    #[serde(rename = "type")]
    pub kind: InformationType,
    pub value: String,
}

impl InformationEntry {
    pub fn new(kind: InformationType, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// Interpret a date entry as a UTC timestamp.
    ///
    /// Returns `None` for non-date entries and for values that are not in
    /// PDF date syntax.
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        if !self.kind.is_date() {
            return None;
        }
        parse_pdf_date(&self.value)
    }
}

/// Parse a PDF date string (`D:YYYYMMDDHHmmSSOHH'mm'`).
///
/// The timezone offset, when present, is applied so the result is UTC.
pub fn parse_pdf_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    let s = s.strip_prefix("D:").unwrap_or(s);

    // At minimum we need YYYY
    if s.len() < 4 {
        return None;
    }

    let year: i32 = s.get(0..4)?.parse().ok()?;
    let month: u32 = s.get(4..6).and_then(|m| m.parse().ok()).unwrap_or(1);
    let day: u32 = s.get(6..8).and_then(|d| d.parse().ok()).unwrap_or(1);
    let hour: u32 = s.get(8..10).and_then(|h| h.parse().ok()).unwrap_or(0);
    let minute: u32 = s.get(10..12).and_then(|m| m.parse().ok()).unwrap_or(0);
    let second: u32 = s.get(12..14).and_then(|s| s.parse().ok()).unwrap_or(0);

    let naive = chrono::NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_opt(hour, minute, second)?;

    let offset_minutes = match s.get(14..15) {
        Some(sign @ ("+" | "-")) => {
            let hours: i64 = s.get(15..17).and_then(|h| h.parse().ok()).unwrap_or(0);
            let minutes: i64 = s
                .get(17..)
                .map(|rest| rest.trim_start_matches('\''))
                .and_then(|rest| rest.get(0..2))
                .and_then(|m| m.parse().ok())
                .unwrap_or(0);
            let total = hours * 60 + minutes;
            if sign == "-" {
                -total
            } else {
                total
            }
        }
        _ => 0,
    };

    let utc = naive - chrono::Duration::minutes(offset_minutes);
    Some(DateTime::from_naive_utc_and_offset(utc, Utc))
}
