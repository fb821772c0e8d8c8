use std::path::PathBuf;

mod worker;

// Re-export types from library crates
pub use card_layout::{CancelToken, Card, Deck, LayoutOptions, LayoutStatistics};
pub use worker::{ChannelProgress, worker_task};

/// Commands sent from a front end to the worker
#[derive(Debug)]
pub enum LayoutCommand {
    LoadManifest {
        path: PathBuf,
    },
    LoadOptions {
        path: PathBuf,
    },
    /// Lay out cards; queued layout requests collapse to the newest one
    Layout {
        cards: Vec<Card>,
        options: LayoutOptions,
    },
    SaveLayout {
        deck: Deck,
        path: PathBuf,
    },
}

/// Updates sent from the worker back to the front end
#[derive(Debug, Clone)]
pub enum LayoutUpdate {
    Progress {
        operation: String,
        current: usize,
        total: usize,
    },
    Status {
        message: String,
    },
    ManifestLoaded {
        cards: Vec<Card>,
    },
    OptionsLoaded {
        options: LayoutOptions,
    },
    LayoutComplete {
        deck: Deck,
        stats: LayoutStatistics,
    },
    /// The run was cancelled; `deck` holds the cards placed before it stopped
    LayoutCancelled {
        deck: Deck,
    },
    Saved {
        path: PathBuf,
    },
    Error {
        message: String,
    },
}
