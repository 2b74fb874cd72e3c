//! Link URIs.
//!
//! The engine describes every link target as a URI string, and the plugin
//! decides what kind of host link it becomes:
//!
//! - `#page=3&view=XYZ,72,100,nan`: explicit destination (1-based page,
//!   coordinates already in top-left page space)
//! - `#nameddest=chapter%201`: named destination, resolved on demand
//! - `file:///path/other.pdf#page=2`: another file
//! - `https://example.org`: anything else with a scheme

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters kept unescaped in destination names.
const NAME_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Check whether a link URI leaves the document.
///
/// A URI is external when it starts with a scheme (`[A-Za-z][A-Za-z0-9+.-]*:`).
pub fn is_external_link(uri: &str) -> bool {
    let mut chars = uri.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    for c in chars {
        if c == ':' {
            return true;
        }
        if !(c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
            return false;
        }
    }
    false
}

/// Check whether an external URI refers to a local file.
pub fn is_file_uri(uri: &str) -> bool {
    uri.starts_with("file://")
}

/// How a destination wants the page shown.
///
/// Missing coordinates are NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DestView {
    Fit,
    Xyz { left: f32, top: f32, zoom: f32 },
    FitH { top: f32 },
    FitV { left: f32 },
    FitR { left: f32, top: f32, right: f32, bottom: f32 },
}

/// An explicit destination: zero-based page plus view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkDest {
    pub page: u32,
    pub view: DestView,
}

impl LinkDest {
    pub fn new(page: u32, view: DestView) -> Self {
        Self { page, view }
    }

    /// Format as a `#page=...` fragment.
    pub fn to_uri(&self) -> String {
        format!("#{}", self.to_fragment())
    }

    /// Format without the leading `#`, for appending to file URIs.
    pub fn to_fragment(&self) -> String {
        let page = self.page + 1;
        match self.view {
            DestView::Fit => format!("page={}", page),
            DestView::Xyz { left, top, zoom } => format!(
                "page={}&view=XYZ,{},{},{}",
                page,
                coord(left),
                coord(top),
                coord(zoom)
            ),
            DestView::FitH { top } => format!("page={}&view=FitH,{}", page, coord(top)),
            DestView::FitV { left } => format!("page={}&view=FitV,{}", page, coord(left)),
            DestView::FitR {
                left,
                top,
                right,
                bottom,
            } => format!(
                "page={}&view=FitR,{},{},{},{}",
                page,
                coord(left),
                coord(top),
                coord(right),
                coord(bottom)
            ),
        }
    }

    /// The point the viewer should scroll to.
    pub fn position(&self) -> (f32, f32) {
        match self.view {
            DestView::Fit => (f32::NAN, f32::NAN),
            DestView::Xyz { left, top, .. } => (left, top),
            DestView::FitH { top } => (f32::NAN, top),
            DestView::FitV { left } => (left, f32::NAN),
            DestView::FitR { left, top, .. } => (left, top),
        }
    }
}

/// A parsed internal link.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkFragment {
    Dest(LinkDest),
    Named(String),
}

/// Internal link that names no page, for destinations that point nowhere.
///
/// [`parse_fragment`] rejects it, so it never resolves.
pub const UNRESOLVED_URI: &str = "#";

/// Format a named destination URI.
pub fn named_dest_uri(name: &str) -> String {
    format!("#{}", named_dest_fragment(name))
}

pub fn named_dest_fragment(name: &str) -> String {
    format!("nameddest={}", utf8_percent_encode(name, NAME_SET))
}

/// Parse an internal link URI (`#...`).
///
/// Returns `None` for anything that is not a fragment or names no page.
pub fn parse_fragment(uri: &str) -> Option<LinkFragment> {
    let fragment = uri.strip_prefix('#')?;

    // Bare page number, e.g. "#4"
    if let Ok(page) = fragment.parse::<u32>() {
        return page
            .checked_sub(1)
            .map(|page| LinkFragment::Dest(LinkDest::new(page, DestView::Fit)));
    }

    let mut page = None;
    let mut view = DestView::Fit;
    for pair in fragment.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        match key {
            "nameddest" => {
                let name = percent_decode_str(value).decode_utf8_lossy().into_owned();
                return Some(LinkFragment::Named(name));
            }
            "page" => page = value.parse::<u32>().ok(),
            "view" => view = parse_view(value),
            _ => {}
        }
    }

    let page = page?.checked_sub(1)?;
    Some(LinkFragment::Dest(LinkDest::new(page, view)))
}

fn parse_view(value: &str) -> DestView {
    let mut parts = value.split(',');
    let kind = parts.next().unwrap_or_default();
    let nums: Vec<f32> = parts.map(parse_coord).collect();
    let at = |i: usize| nums.get(i).copied().unwrap_or(f32::NAN);

    match kind {
        "XYZ" => DestView::Xyz {
            left: at(0),
            top: at(1),
            zoom: at(2),
        },
        "FitH" | "FitBH" => DestView::FitH { top: at(0) },
        "FitV" | "FitBV" => DestView::FitV { left: at(0) },
        "FitR" => DestView::FitR {
            left: at(0),
            top: at(1),
            right: at(2),
            bottom: at(3),
        },
        _ => DestView::Fit,
    }
}

fn coord(value: f32) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else {
        value.to_string()
    }
}

fn parse_coord(s: &str) -> f32 {
    let s = s.trim();
    if s.eq_ignore_ascii_case("nan") {
        return f32::NAN;
    }
    s.parse().unwrap_or(f32::NAN)
}
