//! Destination pages
//!
//! A deck is an ordered list of pages holding the geometry and identity of
//! every placed face. It carries no pixel data.

use crate::card::{Card, Face, Side};
use crate::geometry::{Rect, bounding_box};

/// Identifies the faces of one card laid out together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupId(pub u32);

/// A face at its final position
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlacedFace {
    pub name: String,
    pub source_id: Option<String>,
    pub face_index: usize,
    pub side: Side,
    /// Position of the owning card in processing order
    pub order: usize,
    /// Position relative to the usable area's top-left corner
    pub rect: Rect,
    pub group: Option<GroupId>,
}

impl PlacedFace {
    pub(crate) fn new(
        card: &Card,
        order: usize,
        face: &Face,
        rect: Rect,
        group: Option<GroupId>,
    ) -> Self {
        Self {
            name: card.name.clone(),
            source_id: card.source_id.clone(),
            face_index: card.face_index,
            side: face.side,
            order,
            rect,
            group,
        }
    }

    /// Position on the physical sheet, given the sheet margin
    pub fn sheet_rect(&self, margin: f32) -> Rect {
        self.rect.translated(margin, margin)
    }
}

/// One output page
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Page {
    pub items: Vec<PlacedFace>,
}

impl Page {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Bounding box of everything on the page
    pub fn bounds(&self) -> Option<Rect> {
        bounding_box(self.items.iter().map(|item| &item.rect))
    }
}

/// Ordered collection of pages
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Deck {
    pub pages: Vec<Page>,
    next_group: u32,
}

impl Deck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Add blank pages until `index` exists
    pub fn ensure_page(&mut self, index: usize) {
        if index >= self.pages.len() {
            self.pages.resize_with(index + 1, Page::default);
        }
    }

    /// Record a face on a page, creating the page if needed
    pub fn place(&mut self, page: usize, face: PlacedFace) {
        self.ensure_page(page);
        self.pages[page].items.push(face);
    }

    /// Shift everything on a page by the same offset
    pub fn translate_page(&mut self, page: usize, dx: f32, dy: f32) {
        if let Some(page) = self.pages.get_mut(page) {
            for item in &mut page.items {
                item.rect = item.rect.translated(dx, dy);
            }
        }
    }

    pub fn page_bounds(&self, page: usize) -> Option<Rect> {
        self.pages.get(page).and_then(Page::bounds)
    }

    /// Allocate a fresh group marker
    pub fn next_group_id(&mut self) -> GroupId {
        let id = GroupId(self.next_group);
        self.next_group += 1;
        id
    }

    /// Every placed face with its page index
    pub fn items(&self) -> impl Iterator<Item = (usize, &PlacedFace)> {
        self.pages
            .iter()
            .enumerate()
            .flat_map(|(index, page)| page.items.iter().map(move |item| (index, item)))
    }

    /// Faces sharing a group marker
    pub fn group_members(&self, group: GroupId) -> impl Iterator<Item = (usize, &PlacedFace)> {
        self.items().filter(move |(_, item)| item.group == Some(group))
    }
}
