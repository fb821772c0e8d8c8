//! Hole search placement
//!
//! Walks a grid of candidate top-left corners in row-major order. The first
//! free candidate is pushed up, then left, against existing content.

use crate::area::PageArea;
use crate::constants::{AGGRESSIVE_FIT_GRANULARITY, granularity};
use crate::geometry::{Point, Rect};
use crate::progress::{CancelToken, Cancelled};

use super::{FitRequest, scan_positions};

/// Find a position for the card inside holes of the occupied area.
///
/// The cancel flag is checked once per row of the scan.
pub fn aggressive_fit(
    area: &PageArea,
    request: &FitRequest,
    cancel: &CancelToken,
) -> Result<Option<Point>, Cancelled> {
    if area.is_empty() {
        return Ok(Some(Point::ORIGIN));
    }

    let FitRequest {
        width: cw,
        height: ch,
        bounds,
        quality,
    } = *request;
    let step = granularity(&AGGRESSIVE_FIT_GRANULARITY, quality, ch);

    for y in scan_positions(bounds.height - ch, step) {
        cancel.check()?;

        for x in scan_positions(bounds.width - cw, step) {
            if !area.is_clear(&Rect::new(x, y, cw, ch)) {
                continue;
            }

            let column = Rect::new(x, 0.0, cw, y);
            let top = area.bounds_within(&column).map_or(0.0, |b| b.bottom());
            if top + ch > bounds.height {
                continue;
            }

            let row = Rect::new(0.0, top, x, ch);
            let left = area.bounds_within(&row).map_or(0.0, |b| b.right());
            if left + cw > bounds.width {
                continue;
            }

            return Ok(Some(Point::new(left, top)));
        }
    }

    Ok(None)
}
