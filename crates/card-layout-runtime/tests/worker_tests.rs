use card_layout::{Face, Side};
use card_layout_runtime::*;
use tokio::sync::mpsc;

fn squares(count: usize, size: f32) -> Vec<Card> {
    (0..count)
        .map(|i| Card::single(format!("card {}", i), Face::new(Side::Front, size, size)).unwrap())
        .collect()
}

fn spawn_worker(
    cancel: CancelToken,
) -> (
    mpsc::UnboundedSender<LayoutCommand>,
    mpsc::UnboundedReceiver<LayoutUpdate>,
) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, update_rx) = mpsc::unbounded_channel();
    tokio::spawn(worker_task(command_rx, update_tx, cancel));
    (command_tx, update_rx)
}

/// Skips progress chatter and returns the next result-bearing update
async fn next_result(update_rx: &mut mpsc::UnboundedReceiver<LayoutUpdate>) -> LayoutUpdate {
    loop {
        match update_rx.recv().await {
            Some(LayoutUpdate::Progress { .. }) | Some(LayoutUpdate::Status { .. }) => continue,
            Some(update) => return update,
            None => panic!("Worker closed the update channel"),
        }
    }
}

#[tokio::test]
async fn test_layout_completes() {
    let (command_tx, mut update_rx) = spawn_worker(CancelToken::new());
    command_tx
        .send(LayoutCommand::Layout {
            cards: squares(5, 144.0),
            options: LayoutOptions::default(),
        })
        .unwrap();

    match next_result(&mut update_rx).await {
        LayoutUpdate::LayoutComplete { deck, stats } => {
            assert_eq!(deck.items().count(), 5);
            assert_eq!(stats.cards_placed, 5);
            assert_eq!(stats.pages, deck.page_count());
        }
        other => panic!("Expected LayoutComplete, got {:?}", other),
    }
}

#[tokio::test]
async fn test_layout_reports_progress() {
    let (command_tx, mut update_rx) = spawn_worker(CancelToken::new());
    command_tx
        .send(LayoutCommand::Layout {
            cards: squares(3, 72.0),
            options: LayoutOptions::default(),
        })
        .unwrap();

    let mut progress = Vec::new();
    loop {
        match update_rx.recv().await {
            Some(LayoutUpdate::Progress { current, total, .. }) => progress.push((current, total)),
            Some(LayoutUpdate::Status { .. }) => {}
            Some(LayoutUpdate::LayoutComplete { .. }) => break,
            other => panic!("Unexpected update {:?}", other),
        }
    }
    assert!(!progress.is_empty());
    assert!(progress.iter().all(|&(_, total)| total == 3));
}

#[tokio::test]
async fn test_cancelled_layout_then_recovers() {
    let cancel = CancelToken::new();
    cancel.cancel();
    let (command_tx, mut update_rx) = spawn_worker(cancel.clone());

    command_tx
        .send(LayoutCommand::Layout {
            cards: squares(4, 72.0),
            options: LayoutOptions::default(),
        })
        .unwrap();
    match next_result(&mut update_rx).await {
        LayoutUpdate::LayoutCancelled { deck } => assert_eq!(deck.items().count(), 0),
        other => panic!("Expected LayoutCancelled, got {:?}", other),
    }

    // The flag is cleared once the cancelled run has reported back
    assert!(!cancel.is_cancelled());
    command_tx
        .send(LayoutCommand::Layout {
            cards: squares(4, 72.0),
            options: LayoutOptions::default(),
        })
        .unwrap();
    assert!(matches!(
        next_result(&mut update_rx).await,
        LayoutUpdate::LayoutComplete { .. }
    ));
}

#[tokio::test]
async fn test_invalid_options_report_error() {
    let (command_tx, mut update_rx) = spawn_worker(CancelToken::new());
    command_tx
        .send(LayoutCommand::Layout {
            cards: squares(1, 72.0),
            options: LayoutOptions {
                quality: 15,
                ..Default::default()
            },
        })
        .unwrap();

    match next_result(&mut update_rx).await {
        LayoutUpdate::Error { message } => assert!(message.contains("Quality")),
        other => panic!("Expected Error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_load_manifest() {
    use tempfile::NamedTempFile;

    let temp = NamedTempFile::new().unwrap();
    std::fs::write(
        temp.path(),
        "source,name,width_mm,height_mm,double_sided,copies\n\
         deck.eon,Scout,63.5,88.9,true,2\n",
    )
    .unwrap();

    let (command_tx, mut update_rx) = spawn_worker(CancelToken::new());
    command_tx
        .send(LayoutCommand::LoadManifest {
            path: temp.path().to_path_buf(),
        })
        .unwrap();

    match next_result(&mut update_rx).await {
        LayoutUpdate::ManifestLoaded { cards } => {
            assert_eq!(cards.len(), 2);
            assert!(cards.iter().all(|card| card.back.is_some()));
        }
        other => panic!("Expected ManifestLoaded, got {:?}", other),
    }
}

#[tokio::test]
async fn test_load_missing_options_reports_error() {
    let (command_tx, mut update_rx) = spawn_worker(CancelToken::new());
    command_tx
        .send(LayoutCommand::LoadOptions {
            path: "/nonexistent/layout.json".into(),
        })
        .unwrap();

    assert!(matches!(
        next_result(&mut update_rx).await,
        LayoutUpdate::Error { .. }
    ));
}

#[tokio::test]
async fn test_save_layout() {
    use tempfile::NamedTempFile;

    let (command_tx, mut update_rx) = spawn_worker(CancelToken::new());
    command_tx
        .send(LayoutCommand::Layout {
            cards: squares(2, 100.0),
            options: LayoutOptions::default(),
        })
        .unwrap();
    let deck = match next_result(&mut update_rx).await {
        LayoutUpdate::LayoutComplete { deck, .. } => deck,
        other => panic!("Expected LayoutComplete, got {:?}", other),
    };

    let temp = NamedTempFile::new().unwrap();
    command_tx
        .send(LayoutCommand::SaveLayout {
            deck: deck.clone(),
            path: temp.path().to_path_buf(),
        })
        .unwrap();
    match next_result(&mut update_rx).await {
        LayoutUpdate::Saved { path } => assert_eq!(path, temp.path()),
        other => panic!("Expected Saved, got {:?}", other),
    }

    let loaded = card_layout::load_layout(temp.path()).await.unwrap();
    assert_eq!(loaded, deck);
}
