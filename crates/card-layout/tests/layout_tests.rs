use card_layout::*;
use std::cell::RefCell;
use std::sync::{Arc, Mutex};

fn single(name: &str, w: f32, h: f32) -> Card {
    Card::single(name, Face::new(Side::Front, w, h)).unwrap()
}

fn pair(name: &str, w: f32, h: f32) -> Card {
    Card::paired(
        name,
        Face::new(Side::Front, w, h),
        Face::new(Side::Back, w, h),
    )
    .unwrap()
}

fn engine(width: f32, height: f32) -> CardLayout {
    let mut layout = CardLayout::new();
    layout.set_paper_size(width, height, 0.0).unwrap();
    layout
}

/// Deterministic mix of card sizes
fn mixed_cards(count: usize, with_backs: bool) -> Vec<Card> {
    let mut seed: u32 = 12345;
    let mut next = move |range: u32| {
        seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        (seed >> 16) % range
    };
    (0..count)
        .map(|i| {
            let w = 40.0 + next(120) as f32;
            let h = 40.0 + next(160) as f32;
            let name = format!("card {}", i);
            let card = if with_backs && next(2) == 0 {
                pair(&name, w, h)
            } else {
                single(&name, w, h)
            };
            card.with_group_key(format!("class {}", next(3)))
                .with_source(format!("source {}", i / 4), i % 4)
        })
        .collect()
}

fn assert_no_overlap(deck: &Deck) {
    for (index, page) in deck.pages.iter().enumerate() {
        for (i, a) in page.items.iter().enumerate() {
            for b in &page.items[i + 1..] {
                assert!(
                    !a.rect.intersects(&b.rect),
                    "'{}' overlaps '{}' on page {}",
                    a.name,
                    b.name,
                    index
                );
            }
        }
    }
}

#[test]
fn test_three_squares_share_one_page() {
    let mut layout = engine(250.0, 250.0);
    for i in 0..3 {
        layout.add_card(single(&format!("square {}", i), 100.0, 100.0));
    }

    let run = layout.run(&());
    assert_eq!(run.outcome, LayoutOutcome::Completed);
    assert_eq!(run.deck.page_count(), 1);

    // Content is centered afterwards; compare positions relative to it
    let origin = run.deck.page_bounds(0).unwrap();
    let mut positions: Vec<(f32, f32)> = run.deck.pages[0]
        .items
        .iter()
        .map(|item| (item.rect.x - origin.x, item.rect.y - origin.y))
        .collect();
    positions.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(positions, vec![(0.0, 0.0), (0.0, 100.0), (100.0, 0.0)]);

    assert_eq!(origin.x, 25.0);
    assert_eq!(origin.y, 25.0);
}

#[test]
fn test_new_page_when_full() {
    let mut layout = engine(250.0, 250.0);
    for i in 0..5 {
        layout.add_card(single(&format!("big {}", i), 200.0, 200.0));
    }
    let run = layout.run(&());
    assert_eq!(run.deck.page_count(), 5);
    for page in &run.deck.pages {
        assert_eq!(page.items.len(), 1);
        // A lone card is centered
        assert_eq!(page.items[0].rect, Rect::new(25.0, 25.0, 200.0, 200.0));
    }
}

#[test]
fn test_double_sided_backs_are_mirrored() {
    let mut layout = engine(400.0, 300.0);
    layout.set_double_sided(true);
    for i in 0..7 {
        layout.add_card(pair(&format!("pair {}", i), 100.0, 150.0));
    }
    layout.add_card(single("loose", 60.0, 60.0));

    let run = layout.run(&());
    let width = 400.0;

    for (page, front) in run.deck.items().filter(|(_, i)| i.side == Side::Front) {
        if front.name == "loose" {
            continue;
        }
        let back = run.deck.pages[page + 1]
            .items
            .iter()
            .find(|b| b.order == front.order)
            .expect("back on the following page");
        let expected_x = width - front.rect.x - back.rect.width;
        assert!((back.rect.x - expected_x).abs() < 1e-3);
        assert_eq!(back.rect.y, front.rect.y);
    }
}

#[test]
fn test_single_sided_backs_are_adjacent_and_grouped() {
    let mut layout = engine(500.0, 500.0);
    for i in 0..6 {
        layout.add_card(pair(&format!("pair {}", i), 80.0, 100.0));
    }

    let run = layout.run(&());
    assert_eq!(run.deck.page_count(), 1);

    let stats = calculate_statistics(&run.deck, &layout.paper());
    assert_eq!(stats.groups, 6);
    assert_eq!(stats.cards_placed, 6);

    for (page, front) in run.deck.items().filter(|(_, i)| i.side == Side::Front) {
        let group = front.group.expect("paired faces are grouped");
        let members: Vec<_> = run.deck.group_members(group).collect();
        assert_eq!(members.len(), 2);
        let (back_page, back) = members
            .iter()
            .find(|(_, m)| m.side == Side::Back)
            .copied()
            .unwrap();
        assert_eq!(back_page, page);
        assert!((back.rect.x - (front.rect.x + front.rect.width)).abs() < 1e-3);
        assert_eq!(back.rect.y, front.rect.y);
    }
}

#[test]
fn test_grouping_disabled() {
    let mut layout = engine(500.0, 500.0);
    layout.set_grouping(false);
    layout.add_card(pair("pair", 80.0, 100.0));
    let run = layout.run(&());
    assert!(run.deck.items().all(|(_, item)| item.group.is_none()));
}

#[test]
fn test_wide_pair_is_split() {
    let mut layout = engine(250.0, 400.0);
    layout.add_card(pair("wide", 200.0, 100.0));

    let run = layout.run(&());
    let items: Vec<_> = run.deck.items().collect();
    assert_eq!(items.len(), 2);
    assert_ne!(items[0].1.order, items[1].1.order);
    assert!(items.iter().all(|(_, item)| item.group.is_none()));
    assert!(items.iter().all(|(_, item)| item.rect.width == 200.0));
    assert_no_overlap(&run.deck);
}

#[test]
fn test_deterministic() {
    let cards = mixed_cards(40, true);
    let mut layout = engine(612.0, 792.0);
    layout.add_cards(cards);
    let first = layout.run(&());
    let second = layout.run(&());
    assert_eq!(first, second);
}

#[test]
fn test_cancel_before_run() {
    let mut layout = engine(250.0, 250.0);
    layout.add_card(single("a", 100.0, 100.0));
    layout.cancel();
    assert!(layout.is_cancelled());

    let run = layout.run(&());
    assert_eq!(run.outcome, LayoutOutcome::Cancelled);
    assert_eq!(run.deck.page_count(), 0);

    layout.cancel_token().reset();
    assert_eq!(layout.run(&()).outcome, LayoutOutcome::Completed);
}

/// Cancels its token when progress reaches a given card
struct CancelAt {
    token: CancelToken,
    at: usize,
    messages: RefCell<Vec<String>>,
}

impl ProgressSink for CancelAt {
    fn progress(&self, current: usize, _max: usize) {
        if current == self.at {
            self.token.cancel();
        }
    }

    fn status(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

#[test]
fn test_cancel_during_run_keeps_committed_cards() {
    let mut layout = engine(250.0, 250.0);
    for i in 0..6 {
        layout.add_card(single(&format!("card {}", i), 100.0, 100.0));
    }
    let sink = CancelAt {
        token: layout.cancel_token(),
        at: 2,
        messages: RefCell::new(Vec::new()),
    };

    let run = layout.run(&sink);
    assert_eq!(run.outcome, LayoutOutcome::Cancelled);
    // The card being reported when the flag was raised still completes
    assert_eq!(run.deck.items().count(), 3);
    // No centering on a cancelled run
    assert_eq!(run.deck.page_bounds(0).unwrap().x, 0.0);
    assert_eq!(sink.messages.borrow().len(), 3);
    assert_eq!(sink.messages.borrow()[0], "placing card 0");
}

/// Never finds room, so every card lands on its own page
struct NoFit;

impl PlacementStrategy for NoFit {
    fn try_fast_fit(&self, _area: &PageArea, _request: &FitRequest) -> Option<Point> {
        None
    }

    fn try_aggressive_fit(
        &self,
        _area: &PageArea,
        _request: &FitRequest,
        _cancel: &CancelToken,
    ) -> std::result::Result<Option<Point>, Cancelled> {
        Ok(None)
    }
}

#[test]
fn test_custom_strategy() {
    let mut layout = engine(250.0, 250.0);
    layout.set_strategy(NoFit);
    for i in 0..3 {
        layout.add_card(single(&format!("card {}", i), 10.0, 10.0));
    }
    assert_eq!(layout.run(&()).deck.page_count(), 3);
}

#[test]
fn test_double_sided_new_pages_are_front_pages() {
    let mut layout = engine(250.0, 250.0);
    layout.set_double_sided(true);
    layout.set_strategy(NoFit);
    layout.add_card(single("a", 100.0, 100.0));
    layout.add_card(single("b", 100.0, 100.0));

    let run = layout.run(&());
    // Page 1 is left blank as the back of page 0
    assert_eq!(run.deck.page_count(), 3);
    assert!(run.deck.pages[1].is_empty());
    assert_eq!(run.deck.pages[2].items[0].name, "b");
}

#[test]
fn test_quality_rejected_eagerly() {
    let mut layout = CardLayout::new();
    assert!(layout.set_quality(9).is_ok());
    assert!(matches!(layout.set_quality(10), Err(LayoutError::Config(_))));
    assert_eq!(layout.quality(), 9);
}

#[test]
fn test_bad_paper_rejected() {
    let mut layout = CardLayout::new();
    assert!(layout.set_paper_size(100.0, 100.0, 50.0).is_err());
    assert!(layout.set_paper_size(-1.0, 100.0, 0.0).is_err());
    assert!(layout.set_paper_size(100.0, 100.0, 10.0).is_ok());
    assert_eq!(layout.paper().usable_width(), 80.0);
}

#[test]
fn test_bleed_margin_enlarges_faces() {
    let mut layout = engine(250.0, 250.0);
    layout.set_bleed_margin(true);
    let face = Face::new(Side::Front, 100.0, 100.0).with_bleed(9.0);
    layout.add_card(Card::single("bleed", face).unwrap());
    let run = layout.run(&());
    assert_eq!(run.deck.pages[0].items[0].rect.width, 118.0);
}

#[test]
fn test_add_component() {
    let component = Component {
        source_id: "monsters.csv".into(),
        class: "Monster".into(),
        name: "Goblin".into(),
        sheets: vec![Sheet {
            front: Face::new(Side::Front, 100.0, 140.0),
            back: Some(Face::new(Side::Back, 100.0, 140.0)),
        }],
        copies: 3,
    };
    let mut layout = engine(612.0, 792.0);
    assert_eq!(layout.add_component(&component).unwrap(), 3);
    let run = layout.run(&());
    assert_eq!(run.deck.items().count(), 6);
}

/// Never fast-fits; records the card sizes handed to the aggressive search
struct RecordingStrategy {
    aggressive_calls: Arc<Mutex<Vec<(f32, f32)>>>,
    cancel_in_search: bool,
}

impl PlacementStrategy for RecordingStrategy {
    fn try_fast_fit(&self, _area: &PageArea, _request: &FitRequest) -> Option<Point> {
        None
    }

    fn try_aggressive_fit(
        &self,
        _area: &PageArea,
        request: &FitRequest,
        cancel: &CancelToken,
    ) -> std::result::Result<Option<Point>, Cancelled> {
        self.aggressive_calls
            .lock()
            .unwrap()
            .push((request.width, request.height));
        if self.cancel_in_search {
            cancel.cancel();
        }
        cancel.check()?;
        Ok(None)
    }
}

#[test]
fn test_aggressive_fit_gated_by_card_area() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let mut layout = engine(100.0, 100.0);
    layout.set_strategy(RecordingStrategy {
        aggressive_calls: calls.clone(),
        cancel_in_search: false,
    });
    // 0.66² of 100x100 is 4356: 66x66.1 is above it, 66x65.9 below
    layout.add_card(single("above", 66.0, 66.1));
    layout.add_card(single("below", 66.0, 65.9));
    layout.add_card(single("small", 10.0, 10.0));

    let run = layout.run(&());
    assert_eq!(run.outcome, LayoutOutcome::Completed);
    assert_eq!(run.deck.page_count(), 3);

    let calls = calls.lock().unwrap();
    assert!(calls.iter().all(|&(_, h)| h != 66.1), "{:?}", calls);
    // "below" probes page 0, "small" probes pages 0 and 1
    assert_eq!(calls.as_slice(), &[(66.0, 65.9), (10.0, 10.0), (10.0, 10.0)]);
}

#[test]
fn test_cancel_inside_aggressive_search() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let mut layout = engine(100.0, 100.0);
    layout.set_strategy(RecordingStrategy {
        aggressive_calls: calls.clone(),
        cancel_in_search: true,
    });
    layout.add_card(single("first", 50.0, 50.0));
    layout.add_card(single("second", 20.0, 20.0));
    layout.add_card(single("third", 10.0, 10.0));

    let run = layout.run(&());
    assert_eq!(run.outcome, LayoutOutcome::Cancelled);
    assert_eq!(run.deck.items().count(), 1);
    assert_eq!(calls.lock().unwrap().len(), 1);
}
