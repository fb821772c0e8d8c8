mod logger;

use anyhow::{Context, Result, bail};
use card_layout::constants::pt_to_mm;
use card_layout::{Deck, LayoutStatistics, Orientation, PaperSize};
use card_layout_runtime::{
    CancelToken, LayoutCommand, LayoutOptions, LayoutUpdate, worker_task,
};
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use std::path::PathBuf;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "cardlay", about = "Pack game cards onto printable pages", version)]
struct Cli {
    /// Log debug output (every placement) to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lay out the cards of a manifest
    Layout {
        /// Card manifest CSV (columns: source, class, name, width_mm, height_mm,
        /// double_sided, bleed_mm, copies)
        #[arg(short, long)]
        manifest: PathBuf,

        /// Output layout JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Options JSON file; flags below override its values
        #[arg(long)]
        options: Option<PathBuf>,

        /// Paper size
        #[arg(long, value_enum)]
        paper: Option<PaperArg>,

        /// Paper orientation
        #[arg(long, value_enum)]
        orientation: Option<OrientationArg>,

        /// Page margin in mm (uniform on all sides)
        #[arg(long)]
        margin: Option<f32>,

        /// Put backs on their own mirrored pages
        #[arg(long, overrides_with = "single_sided")]
        double_sided: bool,

        /// Put backs beside their fronts
        #[arg(long)]
        single_sided: bool,

        /// Placement quality, 0 (coarse) to 9 (fine)
        #[arg(short, long)]
        quality: Option<u8>,

        /// Tag side-by-side fronts and backs as groups
        #[arg(long, overrides_with = "no_grouping")]
        grouping: bool,

        /// Don't tag fronts and backs as groups
        #[arg(long)]
        no_grouping: bool,

        /// Reserve each face's bleed around it
        #[arg(long, overrides_with = "no_bleed")]
        bleed: bool,

        /// Lay out faces at their trimmed size
        #[arg(long)]
        no_bleed: bool,

        /// Print every face's page and sheet position in mm
        #[arg(long)]
        list: bool,

        /// Show statistics only, don't write the layout
        #[arg(long)]
        stats_only: bool,
    },

    /// Write a default options file
    Options {
        /// Output JSON file
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
}

impl From<PaperArg> for PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A3 => Self::A3,
            PaperArg::A4 => Self::A4,
            PaperArg::A5 => Self::A5,
            PaperArg::Letter => Self::Letter,
            PaperArg::Legal => Self::Legal,
            PaperArg::Tabloid => Self::Tabloid,
        }
    }
}

impl From<OrientationArg> for Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Self::Portrait,
            OrientationArg::Landscape => Self::Landscape,
        }
    }
}

/// Settings given on the command line, applied over the loaded options
struct Overrides {
    paper: Option<PaperArg>,
    orientation: Option<OrientationArg>,
    margin: Option<f32>,
    double_sided: Option<bool>,
    quality: Option<u8>,
    grouping: Option<bool>,
    bleed: Option<bool>,
}

/// Collapse an `--x` / `--no-x` flag pair; `None` keeps the loaded value
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

impl Overrides {
    fn apply(&self, options: &mut LayoutOptions) {
        if let Some(paper) = self.paper {
            options.paper_size = paper.into();
        }
        if let Some(orientation) = self.orientation {
            options.orientation = orientation.into();
        }
        if let Some(margin) = self.margin {
            options.margin_mm = margin;
        }
        if let Some(quality) = self.quality {
            options.quality = quality;
        }
        if let Some(double_sided) = self.double_sided {
            options.double_sided = double_sided;
        }
        if let Some(grouping) = self.grouping {
            options.grouping = grouping;
        }
        if let Some(bleed) = self.bleed {
            options.bleed_margin = bleed;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logger::StderrLogger::new(level).init()?;

    match cli.command {
        Commands::Layout {
            manifest,
            output,
            options,
            paper,
            orientation,
            margin,
            double_sided,
            single_sided,
            quality,
            grouping,
            no_grouping,
            bleed,
            no_bleed,
            list,
            stats_only,
        } => {
            let overrides = Overrides {
                paper,
                orientation,
                margin,
                double_sided: switch(double_sided, single_sided),
                quality,
                grouping: switch(grouping, no_grouping),
                bleed: switch(bleed, no_bleed),
            };
            let output = if stats_only { None } else { output };
            run_layout(manifest, options, overrides, output, list).await?;
        }

        Commands::Options { output } => {
            LayoutOptions::default()
                .save(&output)
                .await
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Default options written to {}", output.display());
        }
    }

    Ok(())
}

async fn run_layout(
    manifest: PathBuf,
    options_path: Option<PathBuf>,
    overrides: Overrides,
    output: Option<PathBuf>,
    list: bool,
) -> Result<()> {
    let cancel = CancelToken::new();
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, mut update_rx) = mpsc::unbounded_channel();
    tokio::spawn(worker_task(command_rx, update_tx, cancel.clone()));

    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, cancelling layout");
            interrupt.cancel();
        }
    });

    let mut options = match options_path {
        Some(path) => {
            command_tx.send(LayoutCommand::LoadOptions { path })?;
            match next_update(&mut update_rx).await? {
                LayoutUpdate::OptionsLoaded { options } => options,
                other => bail!("Unexpected update while loading options: {:?}", other),
            }
        }
        None => LayoutOptions::default(),
    };
    overrides.apply(&mut options);
    options.validate()?;
    let margin = options.paper()?.margin();

    command_tx.send(LayoutCommand::LoadManifest { path: manifest })?;
    let cards = match next_update(&mut update_rx).await? {
        LayoutUpdate::ManifestLoaded { cards } => cards,
        other => bail!("Unexpected update while loading manifest: {:?}", other),
    };
    if cards.is_empty() {
        bail!("Manifest contains no cards");
    }

    println!("Laying out {} cards...", cards.len());
    command_tx.send(LayoutCommand::Layout { cards, options })?;
    let (deck, stats) = match next_update(&mut update_rx).await? {
        LayoutUpdate::LayoutComplete { deck, stats } => (deck, stats),
        LayoutUpdate::LayoutCancelled { deck } => {
            bail!(
                "Layout cancelled after placing {} faces on {} pages",
                deck.items().count(),
                deck.page_count()
            );
        }
        other => bail!("Unexpected update during layout: {:?}", other),
    };

    print_statistics(&stats);
    if list {
        print_placements(&deck, margin);
    }

    if let Some(path) = output {
        command_tx.send(LayoutCommand::SaveLayout { deck, path })?;
        match next_update(&mut update_rx).await? {
            LayoutUpdate::Saved { path } => println!("Layout written to {}", path.display()),
            other => bail!("Unexpected update while saving: {:?}", other),
        }
    }

    Ok(())
}

/// Wait for the next result from the worker, logging progress on the way
async fn next_update(
    update_rx: &mut mpsc::UnboundedReceiver<LayoutUpdate>,
) -> Result<LayoutUpdate> {
    loop {
        match update_rx.recv().await {
            Some(LayoutUpdate::Progress {
                operation,
                current,
                total,
            }) => log::debug!("{}: {}/{}", operation, current, total),
            Some(LayoutUpdate::Status { message }) => log::debug!("{}", message),
            Some(LayoutUpdate::Error { message }) => bail!(message),
            Some(update) => return Ok(update),
            None => bail!("Layout worker stopped unexpectedly"),
        }
    }
}

fn print_statistics(stats: &LayoutStatistics) {
    println!("Layout Statistics:");
    println!("  Cards placed: {}", stats.cards_placed);
    println!("  Faces placed: {}", stats.faces_placed);
    println!("  Pages: {}", stats.pages);
    println!("  Groups: {}", stats.groups);
    for (page, utilization) in stats.page_utilization.iter().enumerate() {
        println!("    Page {}: {:.1}% used", page + 1, utilization * 100.0);
    }
    println!(
        "  Average utilization: {:.1}%",
        stats.average_utilization * 100.0
    );
}

fn print_placements(deck: &Deck, margin: f32) {
    println!("Placements (mm from the sheet's top-left corner):");
    for (page, item) in deck.items() {
        let rect = item.sheet_rect(margin);
        println!(
            "  Page {}: {} ({:?}) at ({:.1}, {:.1}), {:.1} x {:.1}",
            page + 1,
            item.name,
            item.side,
            pt_to_mm(rect.x),
            pt_to_mm(rect.y),
            pt_to_mm(rect.width),
            pt_to_mm(rect.height)
        );
    }
}
