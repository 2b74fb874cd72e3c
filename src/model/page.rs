//! Host page object.

use serde::{Deserialize, Serialize};

/// A page as the host tracks it: its index and the size the backend
/// reported during page init.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    index: u32,
    width: f64,
    height: f64,
}

impl Page {
    /// Create an uninitialized page (zero size) for a zero-based index.
    pub fn new(index: u32) -> Self {
        Self {
            index,
            width: 0.0,
            height: 0.0,
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn set_width(&mut self, width: f64) {
        self.width = width;
    }

    pub fn set_height(&mut self, height: f64) {
        self.height = height;
    }
}
