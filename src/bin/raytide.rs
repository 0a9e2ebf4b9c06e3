use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;

use raytide::{
    Canvas, ControllerOpts, FrameRgba, PixelSource, ProgressSink, RaytideError,
    RenderController, Tracer, TracerOpts, WorkerPool,
};

#[derive(Parser, Debug)]
#[command(name = "raytide", version, about = "Render the demo scene to a PNG")]
struct Cli {
    /// Image width in pixels.
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Image height in pixels.
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Worker threads to render with; defaults to the host's hardware
    /// parallelism and is clamped to it.
    #[arg(long)]
    concurrency: Option<usize>,

    /// Output PNG path.
    #[arg(long, default_value = "render.png")]
    out: PathBuf,

    /// Progress tick interval in milliseconds.
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,

    /// Forward an in-progress snapshot every Nth tick.
    #[arg(long, default_value_t = 3)]
    snapshot_every: u32,

    /// Optional tracer settings JSON (samples_per_pixel, max_bounces, seed).
    #[arg(long)]
    settings: Option<PathBuf>,
}

/// Streams progress lines to the log and hands the terminal result back to
/// `main` over a channel.
struct CliSink {
    done_tx: crossbeam_channel::Sender<Result<FrameRgba, RaytideError>>,
}

impl ProgressSink for CliSink {
    fn on_progress(&mut self, elapsed: Duration, snapshot: Option<&FrameRgba>) {
        if snapshot.is_some() {
            tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "render in progress (snapshot)");
        } else {
            tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "render in progress");
        }
    }

    fn on_complete(&mut self, result: Result<FrameRgba, RaytideError>) {
        let _ = self.done_tx.send(result);
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let canvas = Canvas::new(cli.width, cli.height)?;

    let opts = match &cli.settings {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading settings {}", path.display()))?;
            serde_json::from_str::<TracerOpts>(&text)
                .with_context(|| format!("parsing settings {}", path.display()))?
        }
        None => TracerOpts::default(),
    };

    let max = WorkerPool::max_concurrency();
    let concurrency = cli.concurrency.unwrap_or(max).clamp(1, max);
    let pool = Arc::new(WorkerPool::new(max)?);
    tracing::info!(concurrency, pool_size = max, "starting render");

    let mut controller = RenderController::new(
        pool,
        ControllerOpts {
            tick_interval: Duration::from_millis(cli.tick_ms),
            snapshot_every: cli.snapshot_every,
        },
    )?;

    let source: Arc<dyn PixelSource> = Arc::new(Tracer::demo(canvas, opts));
    let (done_tx, done_rx) = crossbeam_channel::bounded(1);
    let accepted = controller.start_render(canvas, concurrency, source, Box::new(CliSink { done_tx }))?;
    anyhow::ensure!(accepted, "controller rejected the render");

    let frame = done_rx
        .recv()
        .context("render finished without a completion event")??;
    controller.join();

    let img = image::RgbaImage::from_raw(frame.width, frame.height, frame.data)
        .context("framebuffer size mismatch")?;
    img.save(&cli.out)
        .with_context(|| format!("writing {}", cli.out.display()))?;
    tracing::info!(out = %cli.out.display(), "render written");
    Ok(())
}
