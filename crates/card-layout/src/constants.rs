//! Shared constants for card layout
//!
//! This module centralizes the tuning tables and tolerances used by the
//! placement algorithms.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4; // ≈ 2.83465

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

/// Convert points to millimeters
#[inline]
pub fn pt_to_mm(pt: f32) -> f32 {
    pt / POINTS_PER_MM
}

// =============================================================================
// Defaults
// =============================================================================

/// Default sheet margin in millimeters
pub const DEFAULT_MARGIN_MM: f32 = 5.0;

/// Default layout quality
pub const DEFAULT_QUALITY: u8 = 7;

/// Highest accepted layout quality
pub const MAX_QUALITY: u8 = 9;

// =============================================================================
// Ordering
// =============================================================================

/// Heights and areas closer than this (points) sort as equal.
pub const ORDER_EPSILON: f32 = 0.01;

// =============================================================================
// Placement
// =============================================================================

/// Fast-fit scan step in points, indexed by quality (0 = coarsest)
pub const FAST_FIT_GRANULARITY: [f32; 10] =
    [128.0, 64.0, 32.0, 16.0, 8.0, 4.0, 2.0, 1.0, 0.5, 0.25];

/// Aggressive-fit scan step in points, indexed by quality (0 = coarsest)
pub const AGGRESSIVE_FIT_GRANULARITY: [f32; 10] =
    [32.0, 24.0, 16.0, 12.0, 8.0, 6.0, 4.0, 2.0, 1.0, 0.5];

/// Side ratio for the aggressive-fit gate. Cards covering at least
/// `ratio² × usable area` skip the hole search.
pub const AGGRESSIVE_FIT_RATIO: f32 = 0.66;

/// Overlaps thinner than this (points) are treated as touching edges.
pub const GEOMETRY_EPSILON: f32 = 1e-3;

/// Granularity for a quality level, capped at the card height so that a
/// short card is never stepped over a gap it would fit in.
#[inline]
pub fn granularity(table: &[f32; 10], quality: u8, card_height: f32) -> f32 {
    let index = usize::from(quality.min(MAX_QUALITY));
    table[index].min(card_height)
}
