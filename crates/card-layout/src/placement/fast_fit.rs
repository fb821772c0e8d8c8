//! Silhouette placement
//!
//! Slides a horizontal window of the card's height down the page. At each
//! step the occupied part of the window is reduced to its bounding box, and
//! the card is tried just left of it, then just right of it. A candidate
//! column is then pushed up against whatever sits above it.

use crate::area::PageArea;
use crate::constants::{FAST_FIT_GRANULARITY, granularity};
use crate::geometry::{Point, Rect};

use super::{FitRequest, scan_positions};

/// Find a position for the card, or `None` if the silhouette leaves no room.
pub fn fast_fit(area: &PageArea, request: &FitRequest) -> Option<Point> {
    if area.is_empty() {
        return Some(Point::ORIGIN);
    }

    let FitRequest {
        width: cw,
        height: ch,
        bounds,
        quality,
    } = *request;
    let step = granularity(&FAST_FIT_GRANULARITY, quality, ch);

    for y in scan_positions(bounds.height - ch, step) {
        let window = Rect::new(0.0, y, bounds.width, ch);
        // An empty window behaves like a zero box at the origin
        let blocked = area.bounds_within(&window).unwrap_or_default();

        if blocked.x >= cw {
            let x = blocked.x - cw;
            if let Some(top) = settle_upward(area, x, y, request) {
                return Some(Point::new(x, top));
            }
        }

        let x = blocked.right();
        if x + cw <= bounds.width {
            if let Some(top) = settle_upward(area, x, y, request) {
                return Some(Point::new(x, top));
            }
        }
    }

    None
}

/// Lowest edge of anything above the candidate column, if the card still
/// fits below it.
fn settle_upward(area: &PageArea, x: f32, y: f32, request: &FitRequest) -> Option<f32> {
    let column = Rect::new(x, 0.0, request.width, y);
    let top = area.bounds_within(&column).map_or(0.0, |b| b.bottom());
    (top + request.height < request.bounds.height).then_some(top)
}
