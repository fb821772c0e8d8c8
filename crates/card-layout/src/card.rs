//! Card records
//!
//! A card is the unit the engine places: a front face and, optionally, a back
//! face of identical size. Its layout size depends on the layout mode, so it
//! is computed by [`Card::prepare`] right before ordering rather than at
//! construction.

use crate::types::{LayoutError, Result};

/// Which face of a printed sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Front,
    Back,
}

/// A single printable rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Face {
    pub side: Side,
    /// Trimmed width in points
    pub width: f32,
    /// Trimmed height in points
    pub height: f32,
    /// Bleed allowance on each edge in points
    pub bleed: f32,
}

impl Face {
    pub fn new(side: Side, width: f32, height: f32) -> Self {
        Self {
            side,
            width,
            height,
            bleed: 0.0,
        }
    }

    pub fn with_bleed(mut self, bleed: f32) -> Self {
        self.bleed = bleed;
        self
    }

    /// Size the face occupies on the page
    pub fn layout_size(&self, bleed_margin: bool) -> (f32, f32) {
        if bleed_margin {
            (self.width + 2.0 * self.bleed, self.height + 2.0 * self.bleed)
        } else {
            (self.width, self.height)
        }
    }

    fn validate(&self) -> Result<()> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(LayoutError::InvalidFace(format!(
                "{:?} face must have positive size, got {}x{}",
                self.side, self.width, self.height
            )));
        }
        if !(self.bleed >= 0.0) {
            return Err(LayoutError::InvalidFace(format!(
                "{:?} face bleed must not be negative, got {}",
                self.side, self.bleed
            )));
        }
        Ok(())
    }
}

/// One placeable unit
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Card {
    /// Display name used in status messages and output
    pub name: String,
    pub front: Face,
    pub back: Option<Face>,
    /// Class identifier, used only for tie-breaking
    pub group_key: String,
    /// Originating component, used only for tie-breaking
    pub source_id: Option<String>,
    /// Index of this sheet within its component
    pub face_index: usize,
    #[cfg_attr(feature = "serde", serde(skip))]
    size: PreparedSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct PreparedSize {
    width: f32,
    height: f32,
    area: f32,
    bleed_margin: bool,
}

impl Card {
    /// A card with only a front face
    pub fn single(name: impl Into<String>, front: Face) -> Result<Self> {
        front.validate()?;
        Ok(Self {
            name: name.into(),
            front,
            back: None,
            group_key: String::new(),
            source_id: None,
            face_index: 0,
            size: PreparedSize::default(),
        })
    }

    /// A card with matching front and back faces
    pub fn paired(name: impl Into<String>, front: Face, back: Face) -> Result<Self> {
        front.validate()?;
        back.validate()?;
        if back.width != front.width || back.height != front.height || back.bleed != front.bleed
        {
            return Err(LayoutError::InvalidFace(format!(
                "Back face ({}x{}) does not match front face ({}x{})",
                back.width, back.height, front.width, front.height
            )));
        }
        let mut card = Self::single(name, front)?;
        card.back = Some(back);
        Ok(card)
    }

    pub fn with_group_key(mut self, group_key: impl Into<String>) -> Self {
        self.group_key = group_key.into();
        self
    }

    pub fn with_source(mut self, source_id: impl Into<String>, face_index: usize) -> Self {
        self.source_id = Some(source_id.into());
        self.face_index = face_index;
        self
    }

    /// Compute the layout size for the given mode.
    ///
    /// In single-sided mode an unsplit pair is laid out side by side, so its
    /// width covers both faces.
    pub fn prepare(&mut self, double_sided: bool, bleed_margin: bool) {
        let (front_w, front_h) = self.front.layout_size(bleed_margin);
        let width = match self.back {
            Some(back) if !double_sided => front_w + back.layout_size(bleed_margin).0,
            _ => front_w,
        };
        self.size = PreparedSize {
            width,
            height: front_h,
            area: width * front_h,
            bleed_margin,
        };
    }

    /// Split a pair into two independent single-face cards.
    ///
    /// Returns the card unchanged (as the only element) when it has no back.
    pub fn split(self) -> Vec<Card> {
        let Some(back) = self.back else {
            return vec![self];
        };
        let front_card = Card {
            back: None,
            ..self.clone()
        };
        let back_card = Card {
            front: back,
            back: None,
            ..self
        };
        vec![front_card, back_card]
    }

    /// Layout width after [`Card::prepare`]
    pub fn width(&self) -> f32 {
        self.size.width
    }

    /// Layout height after [`Card::prepare`]
    pub fn height(&self) -> f32 {
        self.size.height
    }

    /// Layout area after [`Card::prepare`]
    pub fn area(&self) -> f32 {
        self.size.area
    }

    /// Page size of one face, honoring the bleed mode of the last preparation
    pub(crate) fn face_size(&self, face: &Face) -> (f32, f32) {
        face.layout_size(self.size.bleed_margin)
    }
}

/// One sheet produced by the component loader
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sheet {
    pub front: Face,
    pub back: Option<Face>,
}

/// A loaded component: its sheets in generation order
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Component {
    pub source_id: String,
    pub class: String,
    pub name: String,
    pub sheets: Vec<Sheet>,
    pub copies: usize,
}

impl Component {
    /// Enumerate the component's sheets as cards, `copies` times over.
    pub fn cards(&self) -> Result<Vec<Card>> {
        let mut cards = Vec::with_capacity(self.sheets.len() * self.copies);
        for _ in 0..self.copies {
            for (index, sheet) in self.sheets.iter().enumerate() {
                let name = if self.sheets.len() > 1 {
                    format!("{} [{}]", self.name, index + 1)
                } else {
                    self.name.clone()
                };
                let card = match sheet.back {
                    Some(back) => Card::paired(name, sheet.front, back)?,
                    None => Card::single(name, sheet.front)?,
                };
                cards.push(
                    card.with_group_key(self.class.clone())
                        .with_source(self.source_id.clone(), index),
                );
            }
        }
        Ok(cards)
    }
}
