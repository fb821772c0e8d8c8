use crate::constants::mm_to_pt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Invalid face: {0}")]
    InvalidFace(String),
    #[error("Invalid manifest: {0}")]
    Manifest(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, LayoutError>;

/// Paper orientation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Portrait: height > width (default for most paper sizes)
    #[default]
    Portrait,
    /// Landscape: width > height
    Landscape,
}

/// Standard paper sizes
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PaperSize {
    A3,
    A4,
    A5,
    #[default]
    Letter,
    Legal,
    Tabloid,
    Custom { width_mm: f32, height_mm: f32 },
}

impl PaperSize {
    /// Get base dimensions (always portrait: width < height for standard sizes)
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PaperSize::A3 => (297.0, 420.0),
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::A5 => (148.0, 210.0),
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Legal => (215.9, 355.6),
            PaperSize::Tabloid => (279.4, 431.8),
            PaperSize::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        }
    }

    /// Get dimensions with orientation applied
    pub fn dimensions_with_orientation(self, orientation: Orientation) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

/// Resolved sheet geometry in points.
///
/// The margin is applied uniformly on all four sides; everything the engine
/// places lives inside the usable area that remains.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paper {
    width: f32,
    height: f32,
    margin: f32,
}

impl Paper {
    /// Create a paper, rejecting geometry that leaves no room for cards.
    pub fn new(width: f32, height: f32, margin: f32) -> Result<Self> {
        if !(width > 0.0 && height > 0.0) {
            return Err(LayoutError::Config(format!(
                "Paper dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        if !(margin >= 0.0) {
            return Err(LayoutError::Config(format!(
                "Paper margin must not be negative, got {}",
                margin
            )));
        }
        if width - 2.0 * margin <= 0.0 || height - 2.0 * margin <= 0.0 {
            return Err(LayoutError::Config(format!(
                "Margin of {} leaves no usable area on a {}x{} sheet",
                margin, width, height
            )));
        }
        Ok(Self {
            width,
            height,
            margin,
        })
    }

    /// Create a paper from a named size and a margin in millimeters.
    pub fn from_size(size: PaperSize, orientation: Orientation, margin_mm: f32) -> Result<Self> {
        let (w, h) = size.dimensions_with_orientation(orientation);
        Self::new(mm_to_pt(w), mm_to_pt(h), mm_to_pt(margin_mm))
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    pub fn usable_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    pub fn usable_height(&self) -> f32 {
        self.height - 2.0 * self.margin
    }
}

impl Default for Paper {
    fn default() -> Self {
        let (w, h) = PaperSize::Letter.dimensions_mm();
        Self {
            width: mm_to_pt(w),
            height: mm_to_pt(h),
            margin: mm_to_pt(crate::constants::DEFAULT_MARGIN_MM),
        }
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LayoutOutcome {
    /// Every card was placed and pages were centered
    Completed,
    /// The cancel flag was observed; the deck holds what was placed so far
    Cancelled,
}

/// Statistics about a finished layout
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutStatistics {
    /// Number of cards placed after ordering; a pair counts once unless it
    /// was split to fit the page width
    pub cards_placed: usize,
    /// Number of individual faces on all pages
    pub faces_placed: usize,
    /// Output page count
    pub pages: usize,
    /// Number of front/back groups
    pub groups: usize,
    /// Fraction of each page's usable area covered by faces
    pub page_utilization: Vec<f32>,
    /// Mean of `page_utilization` (0 for an empty deck)
    pub average_utilization: f32,
}
