//! Placement algorithms
//!
//! This module decides where a card fits on a partially filled page:
//! - Fast fit: slides a window down the page and tries the gaps left and
//!   right of the content silhouette
//! - Aggressive fit: grid search for interior holes, used as a fallback for
//!   smaller cards
//!
//! Both are pure searches over a [`PageArea`]; recording the placement is
//! left to the caller.

mod aggressive;
mod fast_fit;

pub use aggressive::aggressive_fit;
pub use fast_fit::fast_fit;

use crate::area::PageArea;
use crate::geometry::{Bounds, Point};
use crate::progress::{CancelToken, Cancelled};

/// What to place and where
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitRequest {
    /// Card width in points
    pub width: f32,
    /// Card height in points
    pub height: f32,
    /// Usable page size
    pub bounds: Bounds,
    /// Quality level, 0 (fastest) to 9 (tightest)
    pub quality: u8,
}

/// A bin-packing strategy the layout engine can be configured with
pub trait PlacementStrategy: Send + Sync {
    /// Cheap search; `None` if the card does not fit.
    fn try_fast_fit(&self, area: &PageArea, request: &FitRequest) -> Option<Point>;

    /// Expensive search; checks `cancel` while scanning.
    fn try_aggressive_fit(
        &self,
        area: &PageArea,
        request: &FitRequest,
        cancel: &CancelToken,
    ) -> Result<Option<Point>, Cancelled>;
}

/// The default strategy: silhouette fast fit plus grid hole search
#[derive(Debug, Clone, Copy, Default)]
pub struct SilhouetteStrategy;

impl PlacementStrategy for SilhouetteStrategy {
    fn try_fast_fit(&self, area: &PageArea, request: &FitRequest) -> Option<Point> {
        fast_fit(area, request)
    }

    fn try_aggressive_fit(
        &self,
        area: &PageArea,
        request: &FitRequest,
        cancel: &CancelToken,
    ) -> Result<Option<Point>, Cancelled> {
        aggressive_fit(area, request, cancel)
    }
}

/// Scan positions `0, step, 2·step, …` up to `limit`, plus one step past it
/// so rounding never hides a fit at the far edge.
pub(crate) fn scan_positions(limit: f32, step: f32) -> impl Iterator<Item = f32> {
    let steps = if limit >= 0.0 && step > 0.0 {
        (limit / step).floor() as usize + 1
    } else {
        0
    };
    (0..=steps).map(move |i| i as f32 * step)
}
