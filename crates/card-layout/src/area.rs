//! Occupied-area bookkeeping
//!
//! Each page keeps the union of the rectangles placed on it. The union is
//! stored as its member rectangles; a query clips every member to the probe,
//! which is exactly the intersection of the union with the probe.

use crate::geometry::{Rect, bounding_box};

/// Union of the rectangles placed on one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageArea {
    rects: Vec<Rect>,
}

impl PageArea {
    pub fn new() -> Self {
        Self::default()
    }

    /// True until the first rectangle is added
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Merge a placed rectangle into the union
    pub fn add(&mut self, rect: Rect) {
        self.rects.push(rect);
    }

    /// The part of the occupied region that overlaps `probe`
    pub fn query(&self, probe: &Rect) -> Vec<Rect> {
        self.rects
            .iter()
            .filter_map(|r| r.intersection(probe))
            .collect()
    }

    /// Bounding box of [`PageArea::query`], or `None` if nothing overlaps
    pub fn bounds_within(&self, probe: &Rect) -> Option<Rect> {
        bounding_box(&self.query(probe))
    }

    /// True if no occupied rectangle overlaps `probe`
    pub fn is_clear(&self, probe: &Rect) -> bool {
        !self.rects.iter().any(|r| r.intersects(probe))
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        for rect in &mut self.rects {
            *rect = rect.translated(dx, dy);
        }
    }
}

/// Per-page occupied areas, indexed by page number
#[derive(Debug, Clone, Default)]
pub struct AreaMap {
    pages: Vec<PageArea>,
}

impl AreaMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every page
    pub fn reset(&mut self) {
        self.pages.clear();
    }

    /// Area of a page; pages never touched read as empty
    pub fn page(&self, index: usize) -> &PageArea {
        static EMPTY: PageArea = PageArea { rects: Vec::new() };
        self.pages.get(index).unwrap_or(&EMPTY)
    }

    /// Mutable area of a page, fabricating empty pages up to `index`
    pub fn page_mut(&mut self, index: usize) -> &mut PageArea {
        if index >= self.pages.len() {
            self.pages.resize_with(index + 1, PageArea::new);
        }
        &mut self.pages[index]
    }

    /// Number of page slots fabricated so far
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
