use card_layout::{
    CancelToken, Card, CardLayout, LayoutOptions, LayoutOutcome, ProgressSink,
    calculate_statistics, load_manifest, save_layout,
};
use std::path::PathBuf;
use tokio::sync::mpsc;

use crate::{LayoutCommand, LayoutUpdate};

/// Forwards engine progress over the update channel
#[derive(Clone)]
pub struct ChannelProgress {
    update_tx: mpsc::UnboundedSender<LayoutUpdate>,
}

impl ChannelProgress {
    pub fn new(update_tx: mpsc::UnboundedSender<LayoutUpdate>) -> Self {
        Self { update_tx }
    }
}

impl ProgressSink for ChannelProgress {
    fn progress(&self, current: usize, max: usize) {
        let _ = self.update_tx.send(LayoutUpdate::Progress {
            operation: "Laying out cards".to_string(),
            current,
            total: max,
        });
    }

    fn status(&self, message: &str) {
        let _ = self.update_tx.send(LayoutUpdate::Status {
            message: message.to_string(),
        });
    }
}

/// Async worker task that processes layout commands and sends updates.
///
/// `cancel` is shared with the front end; setting it stops the layout in
/// progress, and it is cleared again once that layout has reported back.
pub async fn worker_task(
    mut command_rx: mpsc::UnboundedReceiver<LayoutCommand>,
    update_tx: mpsc::UnboundedSender<LayoutUpdate>,
    cancel: CancelToken,
) {
    while let Some(cmd) = command_rx.recv().await {
        process_command(cmd, &mut command_rx, &update_tx, &cancel).await;
    }
}

async fn process_command(
    cmd: LayoutCommand,
    command_rx: &mut mpsc::UnboundedReceiver<LayoutCommand>,
    update_tx: &mpsc::UnboundedSender<LayoutUpdate>,
    cancel: &CancelToken,
) {
    match cmd {
        LayoutCommand::LoadManifest { path } => {
            handle_load_manifest(path, update_tx).await;
        }
        LayoutCommand::LoadOptions { path } => {
            handle_load_options(path, update_tx).await;
        }
        LayoutCommand::Layout {
            mut cards,
            mut options,
        } => {
            // Drain any queued layout commands, keeping only the most recent
            while let Ok(next_cmd) = command_rx.try_recv() {
                if let LayoutCommand::Layout {
                    cards: new_cards,
                    options: new_options,
                } = next_cmd
                {
                    log::debug!("Discarding queued layout, using newer request");
                    cards = new_cards;
                    options = new_options;
                } else {
                    // Since we can't put it back, process it now before the layout
                    Box::pin(process_command(next_cmd, command_rx, update_tx, cancel)).await;
                }
            }

            handle_layout(cards, options, update_tx, cancel).await;
        }
        LayoutCommand::SaveLayout { deck, path } => {
            if let Err(e) = save_layout(&deck, &path).await {
                let _ = update_tx.send(LayoutUpdate::Error {
                    message: format!("Failed to save layout: {}", e),
                });
                return;
            }
            let _ = update_tx.send(LayoutUpdate::Saved { path });
        }
    }
}

async fn handle_load_manifest(path: PathBuf, update_tx: &mpsc::UnboundedSender<LayoutUpdate>) {
    let components = match load_manifest(&path).await {
        Ok(components) => components,
        Err(e) => {
            let _ = update_tx.send(LayoutUpdate::Error {
                message: format!("Failed to load manifest: {}", e),
            });
            return;
        }
    };

    let mut cards = Vec::new();
    for component in &components {
        match component.cards() {
            Ok(more) => cards.extend(more),
            Err(e) => {
                let _ = update_tx.send(LayoutUpdate::Error {
                    message: format!("Invalid component '{}': {}", component.name, e),
                });
                return;
            }
        }
    }

    log::info!(
        "Loaded {} cards from {} components in {}",
        cards.len(),
        components.len(),
        path.display()
    );
    let _ = update_tx.send(LayoutUpdate::ManifestLoaded { cards });
}

async fn handle_load_options(path: PathBuf, update_tx: &mpsc::UnboundedSender<LayoutUpdate>) {
    match LayoutOptions::load(&path).await {
        Ok(options) => {
            let _ = update_tx.send(LayoutUpdate::OptionsLoaded { options });
        }
        Err(e) => {
            let _ = update_tx.send(LayoutUpdate::Error {
                message: format!("Failed to load configuration: {}", e),
            });
        }
    }
}

async fn handle_layout(
    cards: Vec<Card>,
    options: LayoutOptions,
    update_tx: &mpsc::UnboundedSender<LayoutUpdate>,
    cancel: &CancelToken,
) {
    let mut layout = match CardLayout::with_options(&options) {
        Ok(layout) => layout,
        Err(e) => {
            let _ = update_tx.send(LayoutUpdate::Error {
                message: format!("Invalid layout options: {}", e),
            });
            return;
        }
    };
    layout.set_cancel_token(cancel.clone());
    layout.add_cards(cards);

    // Layout is CPU-bound, spawn blocking
    let sink = ChannelProgress::new(update_tx.clone());
    let result = tokio::task::spawn_blocking(move || {
        let run = layout.run(&sink);
        let stats = calculate_statistics(&run.deck, &layout.paper());
        (run, stats)
    })
    .await;
    cancel.reset();

    match result {
        Ok((run, stats)) => {
            let update = match run.outcome {
                LayoutOutcome::Completed => LayoutUpdate::LayoutComplete {
                    deck: run.deck,
                    stats,
                },
                LayoutOutcome::Cancelled => LayoutUpdate::LayoutCancelled { deck: run.deck },
            };
            let _ = update_tx.send(update);
        }
        Err(e) => {
            let _ = update_tx.send(LayoutUpdate::Error {
                message: format!("Layout task failed: {}", e),
            });
        }
    }
}
