//! Loads a replay and either plays it in real time or exports frames as PNG.
//!
//! ```text
//! cargo run --example render_replay -- --dir replays --match-id match_123 play --speed 2
//! cargo run --example render_replay -- --file replay.json export --out frames --every 30
//! ```

use arena_replay::prelude::*;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use web_time::{Duration, Instant};

#[derive(Parser)]
struct Opt {
    /// Directory holding `<match id>.json` replays.
    #[arg(short, long, requires = "match_id", conflicts_with = "file")]
    dir: Option<PathBuf>,
    /// Match to load from `--dir`.
    #[arg(short, long)]
    match_id: Option<String>,
    /// A single replay file.
    #[arg(short, long)]
    file: Option<PathBuf>,
    /// Surface width in pixels.
    #[arg(long, default_value_t = 800)]
    width: u32,
    /// Surface height in pixels.
    #[arg(long, default_value_t = 450)]
    height: u32,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play on a timer thread, logging progress and saving the last frame.
    Play {
        /// Speed multiplier; one of 0.5, 1 or 2.
        #[arg(short, long, default_value_t = 1.0)]
        speed: f64,
        /// Where to save the final frame.
        #[arg(short, long, default_value = "last_frame.png")]
        out: PathBuf,
    },
    /// Step through the replay on a virtual clock and save every n-th frame.
    Export {
        /// Output directory.
        #[arg(short, long, default_value = "frames")]
        out: PathBuf,
        /// Save one frame out of this many.
        #[arg(short, long, default_value_t = 30)]
        every: usize,
    },
}

fn load(controller: &ReplayController, opt: &Opt) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(file) = &opt.file {
        let document = ReplayDocument::from_reader(std::fs::File::open(file)?)?;
        controller.load(document);
        return Ok(());
    }
    let (Some(dir), Some(id)) = (&opt.dir, &opt.match_id) else {
        return Err("pass --file, or --dir together with --match-id".into());
    };
    let loader = DirectoryLoader::new(dir);
    controller.load_from(&loader, &id.parse::<MatchId>()?)?;
    Ok(())
}

fn play(opt: &Opt, speed: f64, out: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let scheduler = Arc::new(ThreadScheduler::new());
    let controller = ReplayController::new(scheduler);
    load(&controller, opt)?;
    controller.set_speed(speed)?;

    let mut viewer = ReplayViewer::new(RasterSurface::new(opt.width, opt.height)?);
    let started = Instant::now();
    controller.play();

    while controller.is_playing() {
        if viewer.refresh(&controller) {
            let snapshot = controller.snapshot();
            if snapshot.current_index % 30 == 0 {
                tracing::info!(
                    frame = snapshot.current_index,
                    total = snapshot.total_frames,
                    "playing"
                );
            }
        }
        thread::sleep(Duration::from_millis(5));
    }
    viewer.refresh(&controller);

    let summary = controller
        .metadata()
        .and_then(|metadata| metadata.summary())
        .unwrap_or_else(|| "none".to_owned());
    tracing::info!(
        elapsed = ?started.elapsed(),
        frame = controller.current_index(),
        metadata = %summary,
        "playback finished"
    );
    viewer.surface().save_png(out)?;
    Ok(())
}

fn export(opt: &Opt, out: &Path, every: usize) -> Result<(), Box<dyn std::error::Error>> {
    let scheduler = Arc::new(ManualScheduler::new());
    let controller = ReplayController::new(scheduler.clone());
    load(&controller, opt)?;
    std::fs::create_dir_all(out)?;

    let renderer = FrameRenderer::default();
    let mut surface = RasterSurface::new(opt.width, opt.height)?;
    let every = every.max(1);
    let mut saved = 0;
    let mut last_saved = None;

    controller.play();
    loop {
        let index = controller.current_index();
        if last_saved != Some(index) && (index % every == 0 || controller.is_at_end()) {
            let frame = controller.current_frame();
            let outcome = renderer.render_indexed(index, frame.as_ref(), &mut surface);
            surface.save_png(out.join(format!("frame_{:05}.png", index)))?;
            tracing::debug!(index, ?outcome, "saved frame");
            saved += 1;
            last_saved = Some(index);
        }
        if !controller.is_playing() {
            break;
        }
        scheduler.tick_all();
    }

    tracing::info!(saved, dir = %out.display(), "export finished");
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(tracing::Level::INFO)
            .finish(),
    )?;

    let opt = Opt::parse();
    match &opt.command {
        Command::Play { speed, out } => play(&opt, *speed, out),
        Command::Export { out, every } => export(&opt, out, *every),
    }
}
