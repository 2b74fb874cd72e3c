//! Links and link targets.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in page space (origin top-left, y grows down).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Rectangle {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }
}

/// What following a link does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkType {
    /// Not a usable link.
    Invalid,
    /// A link that does nothing (e.g. an outline heading without target).
    None,
    /// Jump to a destination inside the document.
    GotoDest,
    /// Open another file.
    GotoRemote,
    /// Open a URI.
    Uri,
    /// Launch an external application.
    Launch,
    /// Run a named viewer action.
    Named,
}

/// How the viewer should position the destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DestinationType {
    #[default]
    Unknown,
    Xyz,
    Fit,
    FitH,
    FitV,
    FitR,
    FitB,
    FitBH,
    FitBV,
}

/// Where a link points.
///
/// Coordinates that are not known are left at `-1`; `zoom` is `0` when the
/// current zoom should be kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkTarget {
    pub destination_type: DestinationType,
    /// URI or file reference for external links.
    pub value: Option<String>,
    /// Zero-based page index for in-document destinations.
    pub page_number: u32,
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub zoom: f64,
}

impl Default for LinkTarget {
    fn default() -> Self {
        Self {
            destination_type: DestinationType::Unknown,
            value: None,
            page_number: 0,
            left: -1.0,
            right: -1.0,
            top: -1.0,
            bottom: -1.0,
            zoom: 0.0,
        }
    }
}

/// A link: its type, its area on the page and its target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    #[serde(rename = "type")]
    pub link_type: LinkType,
    pub position: Rectangle,
    pub target: LinkTarget,
}

impl Link {
    /// Build a link, refusing combinations the host cannot follow.
    ///
    /// Returns `None` for [`LinkType::Invalid`] and for external link types
    /// without a target value.
    pub fn new(link_type: LinkType, position: Rectangle, target: LinkTarget) -> Option<Self> {
        match link_type {
            LinkType::Invalid => return None,
            LinkType::GotoRemote | LinkType::Uri | LinkType::Launch | LinkType::Named => {
                if target.value.as_deref().map_or(true, str::is_empty) {
                    return None;
                }
            }
            LinkType::None | LinkType::GotoDest => {}
        }

        Some(Self {
            link_type,
            position,
            target,
        })
    }
}
