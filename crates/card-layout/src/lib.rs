//! Automatic card layout for printing.
//!
//! Packs rectangular card faces onto as few fixed-size pages as possible,
//! keeping front/back pairs together (side by side) or mirrored on
//! consecutive pages for duplex printing.

mod area;
mod card;
pub mod constants;
mod deck;
mod geometry;
mod io;
mod layout;
mod options;
mod ordering;
pub mod placement;
mod progress;
mod stats;
mod types;

pub use area::{AreaMap, PageArea};
pub use card::{Card, Component, Face, Sheet, Side};
pub use deck::{Deck, GroupId, Page, PlacedFace};
pub use geometry::{Bounds, Point, Rect};
#[cfg(feature = "serde")]
pub use io::{load_layout, save_layout};
pub use io::{load_manifest, parse_manifest};
pub use layout::{CardLayout, LayoutRun};
pub use options::*;
pub use ordering::{compare_cards, order_cards};
pub use placement::{FitRequest, PlacementStrategy, SilhouetteStrategy};
pub use progress::{CancelToken, Cancelled, ProgressSink};
pub use stats::calculate_statistics;
pub use types::*;
