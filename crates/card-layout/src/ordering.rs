//! Processing order for cards
//!
//! Paired cards go first, then taller, then larger cards; the remaining keys
//! only make the order deterministic.

use crate::card::Card;
use crate::constants::ORDER_EPSILON;
use std::cmp::Ordering;

/// Prepare, split and sort cards into the order they are placed in.
///
/// Splitting only happens in single-sided mode, for pairs whose combined
/// width exceeds `usable_width` while the front alone still fits.
pub fn order_cards(
    cards: &[Card],
    double_sided: bool,
    bleed_margin: bool,
    usable_width: f32,
) -> Vec<Card> {
    let mut ordered = Vec::with_capacity(cards.len());
    for card in cards {
        let mut card = card.clone();
        card.prepare(double_sided, bleed_margin);

        if !double_sided && needs_split(&card, usable_width) {
            log::debug!("Splitting '{}': pair is wider than the page", card.name);
            for mut part in card.split() {
                part.prepare(double_sided, bleed_margin);
                ordered.push(part);
            }
        } else {
            ordered.push(card);
        }
    }

    insertion_sort_by(&mut ordered, compare_cards);
    ordered
}

fn needs_split(card: &Card, usable_width: f32) -> bool {
    match card.back {
        Some(_) => card.width() > usable_width && card.face_size(&card.front).0 <= usable_width,
        None => false,
    }
}

/// Total order over prepared cards; `Less` means placed earlier.
pub fn compare_cards(a: &Card, b: &Card) -> Ordering {
    // Cards without a back sort after those with one
    match (a.back.is_some(), b.back.is_some()) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }

    descending_with_tolerance(a.height(), b.height())
        .then_with(|| descending_with_tolerance(a.area(), b.area()))
        .then_with(|| a.group_key.cmp(&b.group_key))
        .then_with(|| a.source_id.cmp(&b.source_id))
        .then_with(|| a.face_index.cmp(&b.face_index))
}

fn descending_with_tolerance(a: f32, b: f32) -> Ordering {
    if (a - b).abs() < ORDER_EPSILON {
        Ordering::Equal
    } else if a > b {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

// The tolerance comparison is not transitive, which `slice::sort_by` is
// allowed to reject with a panic. Insertion sort is stable and only ever
// compares neighbours.
fn insertion_sort_by<T>(items: &mut [T], mut compare: impl FnMut(&T, &T) -> Ordering) {
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && compare(&items[j - 1], &items[j]) == Ordering::Greater {
            items.swap(j - 1, j);
            j -= 1;
        }
    }
}
