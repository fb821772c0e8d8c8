use crate::deck::Deck;
use crate::types::*;
use std::collections::HashSet;

/// Calculate statistics for a finished layout
pub fn calculate_statistics(deck: &Deck, paper: &Paper) -> LayoutStatistics {
    let usable_area = paper.usable_width() * paper.usable_height();

    let page_utilization: Vec<f32> = deck
        .pages
        .iter()
        .map(|page| {
            let covered: f32 = page.items.iter().map(|item| item.rect.area()).sum();
            covered / usable_area
        })
        .collect();

    let average_utilization = if page_utilization.is_empty() {
        0.0
    } else {
        page_utilization.iter().sum::<f32>() / page_utilization.len() as f32
    };

    let faces_placed = deck.items().count();
    let cards: HashSet<_> = deck.items().map(|(_, item)| item.order).collect();
    let groups: HashSet<_> = deck.items().filter_map(|(_, item)| item.group).collect();

    LayoutStatistics {
        cards_placed: cards.len(),
        faces_placed,
        pages: deck.page_count(),
        groups: groups.len(),
        page_utilization,
        average_utilization,
    }
}
