//! Layout orchestration
//!
//! [`CardLayout`] collects cards and settings, then [`CardLayout::run`]
//! places every card: fast fit on each existing page, aggressive fit for
//! cards small enough to plausibly fill a hole, and otherwise a new page.

use crate::area::AreaMap;
use crate::card::{Card, Component};
use crate::constants::{AGGRESSIVE_FIT_RATIO, DEFAULT_QUALITY};
use crate::deck::{Deck, PlacedFace};
use crate::geometry::{Bounds, Point, Rect};
use crate::options::{LayoutOptions, validate_quality};
use crate::ordering::order_cards;
use crate::placement::{FitRequest, PlacementStrategy, SilhouetteStrategy};
use crate::progress::{CancelToken, Cancelled, ProgressSink};
use crate::types::*;

/// Result of one layout run
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutRun {
    pub outcome: LayoutOutcome,
    pub deck: Deck,
}

/// The layout engine
pub struct CardLayout {
    cards: Vec<Card>,
    paper: Paper,
    double_sided: bool,
    quality: u8,
    grouping: bool,
    bleed_margin: bool,
    strategy: Box<dyn PlacementStrategy>,
    cancel: CancelToken,
}

impl Default for CardLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl CardLayout {
    pub fn new() -> Self {
        Self {
            cards: Vec::new(),
            paper: Paper::default(),
            double_sided: false,
            quality: DEFAULT_QUALITY,
            grouping: true,
            bleed_margin: false,
            strategy: Box::new(SilhouetteStrategy),
            cancel: CancelToken::new(),
        }
    }

    /// Create an engine configured from options
    pub fn with_options(options: &LayoutOptions) -> Result<Self> {
        let mut layout = Self::new();
        layout.apply_options(options)?;
        Ok(layout)
    }

    /// Apply every setting from `options`; nothing changes if they are invalid
    pub fn apply_options(&mut self, options: &LayoutOptions) -> Result<()> {
        options.validate()?;
        self.set_paper(options.paper()?);
        self.quality = options.quality;
        self.double_sided = options.double_sided;
        self.grouping = options.grouping;
        self.bleed_margin = options.bleed_margin;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Input
    // -------------------------------------------------------------------------

    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn add_cards(&mut self, cards: impl IntoIterator<Item = Card>) {
        self.cards.extend(cards);
    }

    /// Add every sheet of a loaded component; returns the number of cards added
    pub fn add_component(&mut self, component: &Component) -> Result<usize> {
        let cards = component.cards()?;
        let count = cards.len();
        self.cards.extend(cards);
        Ok(count)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    // -------------------------------------------------------------------------
    // Configuration
    // -------------------------------------------------------------------------

    pub fn set_double_sided(&mut self, double_sided: bool) {
        self.double_sided = double_sided;
    }

    pub fn is_double_sided(&self) -> bool {
        self.double_sided
    }

    /// Set the quality level (0..=9)
    pub fn set_quality(&mut self, quality: u8) -> Result<()> {
        validate_quality(quality)?;
        self.quality = quality;
        Ok(())
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn set_grouping(&mut self, grouping: bool) {
        self.grouping = grouping;
    }

    pub fn set_bleed_margin(&mut self, bleed_margin: bool) {
        self.bleed_margin = bleed_margin;
    }

    pub fn set_paper(&mut self, paper: Paper) {
        self.paper = paper;
    }

    /// Set the paper from raw dimensions in points
    pub fn set_paper_size(&mut self, width: f32, height: f32, margin: f32) -> Result<()> {
        self.paper = Paper::new(width, height, margin)?;
        Ok(())
    }

    pub fn paper(&self) -> Paper {
        self.paper
    }

    /// Replace the placement strategy
    pub fn set_strategy(&mut self, strategy: impl PlacementStrategy + 'static) {
        self.strategy = Box::new(strategy);
    }

    // -------------------------------------------------------------------------
    // Cancellation
    // -------------------------------------------------------------------------

    /// Ask a running (or the next) layout to stop
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// A handle that can cancel this engine from another thread
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Share an existing cancel flag
    pub fn set_cancel_token(&mut self, cancel: CancelToken) {
        self.cancel = cancel;
    }

    // -------------------------------------------------------------------------
    // Layout
    // -------------------------------------------------------------------------

    /// Lay out every card onto a fresh deck.
    ///
    /// A cancelled run returns the pages filled so far, without centering.
    pub fn run(&self, progress: &dyn ProgressSink) -> LayoutRun {
        let bounds = Bounds::new(self.paper.usable_width(), self.paper.usable_height());
        let ordered = order_cards(
            &self.cards,
            self.double_sided,
            self.bleed_margin,
            bounds.width,
        );

        log::info!(
            "Laying out {} cards on {:.1}x{:.1}pt ({}, quality {})",
            ordered.len(),
            bounds.width,
            bounds.height,
            if self.double_sided {
                "double-sided"
            } else {
                "single-sided"
            },
            self.quality
        );

        let mut placer = Placer::new(self, bounds);
        let total = ordered.len();

        for (index, card) in ordered.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return placer.cancelled(index, total);
            }
            progress.progress(index, total);
            progress.status(&format!("placing {}", card.name));

            if placer.place_card(card, index).is_err() {
                return placer.cancelled(index, total);
            }
        }

        placer.center_pages();
        progress.progress(total, total);
        log::info!(
            "Layout complete: {} cards on {} pages",
            total,
            placer.deck.page_count()
        );

        LayoutRun {
            outcome: LayoutOutcome::Completed,
            deck: placer.deck,
        }
    }
}

/// State owned by a single run
struct Placer<'a> {
    layout: &'a CardLayout,
    bounds: Bounds,
    area: AreaMap,
    deck: Deck,
}

impl<'a> Placer<'a> {
    fn new(layout: &'a CardLayout, bounds: Bounds) -> Self {
        Self {
            layout,
            bounds,
            area: AreaMap::new(),
            deck: Deck::new(),
        }
    }

    /// Fronts go on every page, or on every other page when backs follow them
    fn page_step(&self) -> usize {
        if self.layout.is_double_sided() { 2 } else { 1 }
    }

    fn place_card(&mut self, card: &Card, order: usize) -> std::result::Result<(), Cancelled> {
        let layout = self.layout;
        let request = FitRequest {
            width: card.width(),
            height: card.height(),
            bounds: self.bounds,
            quality: layout.quality,
        };
        let strategy = layout.strategy.as_ref();
        let step = self.page_step();
        let pages = self.deck.page_count();

        for page in (0..pages).step_by(step) {
            if let Some(at) = strategy.try_fast_fit(self.area.page(page), &request) {
                self.commit(card, order, page, at, "fast fit");
                return Ok(());
            }
        }

        let hole_limit = AGGRESSIVE_FIT_RATIO * AGGRESSIVE_FIT_RATIO * self.bounds.area();
        if card.area() < hole_limit {
            for page in (0..pages).step_by(step) {
                let found =
                    strategy.try_aggressive_fit(self.area.page(page), &request, &layout.cancel)?;
                if let Some(at) = found {
                    self.commit(card, order, page, at, "aggressive fit");
                    return Ok(());
                }
            }
        }

        let page = self.open_page();
        self.commit(card, order, page, Point::ORIGIN, "new page");
        Ok(())
    }

    /// Index of a blank page for a card that fit nowhere else
    fn open_page(&mut self) -> usize {
        let step = self.page_step();
        let mut index = self.deck.page_count();
        if index % step != 0 {
            index += step - index % step;
        }
        while !self.area.page(index).is_empty() {
            index += step;
        }
        self.deck.ensure_page(index);
        index
    }

    fn commit(&mut self, card: &Card, order: usize, page: usize, at: Point, how: &str) {
        let (front_w, front_h) = card.face_size(&card.front);
        let group = match card.back {
            Some(_) if !self.layout.double_sided && self.layout.grouping => {
                Some(self.deck.next_group_id())
            }
            _ => None,
        };

        let front_rect = Rect::at(at, front_w, front_h);
        self.record(page, PlacedFace::new(card, order, &card.front, front_rect, group));

        if let Some(back) = &card.back {
            let (back_w, back_h) = card.face_size(back);
            if self.layout.double_sided {
                // Mirrored so the faces line up once the sheet is flipped
                let x = self.bounds.width - at.x - back_w;
                let back_rect = Rect::new(x, at.y, back_w, back_h);
                self.record(page + 1, PlacedFace::new(card, order, back, back_rect, None));
            } else {
                let back_rect = Rect::new(at.x + front_w, at.y, back_w, back_h);
                self.record(page, PlacedFace::new(card, order, back, back_rect, group));
            }
        }

        log::debug!(
            "Placed '{}' on page {} at ({:.2}, {:.2}) by {}",
            card.name,
            page,
            at.x,
            at.y,
            how
        );
    }

    fn record(&mut self, page: usize, face: PlacedFace) {
        self.area.page_mut(page).add(face.rect);
        self.deck.place(page, face);
    }

    /// Center each page's content within the usable area.
    ///
    /// Back pages take the mirrored horizontal offset of their front page so
    /// paired faces stay aligned.
    fn center_pages(&mut self) {
        let step = self.page_step();
        for page in (0..self.deck.page_count()).step_by(step) {
            let Some(content) = self.deck.page_bounds(page) else {
                continue;
            };
            let dx = (self.bounds.width - content.width) / 2.0 - content.x;
            let dy = (self.bounds.height - content.height) / 2.0 - content.y;
            self.shift_page(page, dx, dy);
            if self.layout.double_sided {
                self.shift_page(page + 1, -dx, dy);
            }
        }
    }

    fn shift_page(&mut self, page: usize, dx: f32, dy: f32) {
        self.deck.translate_page(page, dx, dy);
        self.area.page_mut(page).translate(dx, dy);
    }

    fn cancelled(self, index: usize, total: usize) -> LayoutRun {
        log::info!("Layout cancelled after {} of {} cards", index, total);
        LayoutRun {
            outcome: LayoutOutcome::Cancelled,
            deck: self.deck,
        }
    }
}
