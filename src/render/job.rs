use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crossbeam_channel::{Receiver, Sender};

use crate::foundation::core::{Canvas, FrameRgba, Rgba8};
use crate::foundation::error::{RaytideError, RaytideResult, RenderFailure};
use crate::render::framebuffer::{BandWriter, Framebuffer};
use crate::render::partition::{RowBand, partition_rows};
use crate::render::pool::WorkerPool;

/// Seam through which the orchestration core asks the external collaborator
/// for pixel colors.
///
/// One `shade` call is made per framebuffer cell, concurrently from multiple
/// workers. An error fails the whole band the cell belongs to.
pub trait PixelSource: Send + Sync {
    /// Color for the pixel at `(x, y)`.
    fn shade(&self, x: u32, y: u32) -> RaytideResult<Rgba8>;
}

/// State shared between the job handle and its dispatched band tasks.
///
/// `outstanding` counts bands still writing; the last band to retire sends the
/// completion message. `signaled` makes the send exactly-once even if the
/// retire accounting is ever driven twice.
struct JobState {
    outstanding: AtomicUsize,
    failed: Mutex<Vec<usize>>,
    signaled: AtomicBool,
    done_tx: Sender<Result<(), RenderFailure>>,
}

impl JobState {
    fn record_failure(&self, band: usize) {
        self.failed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(band);
    }

    fn band_retired(&self) {
        // AcqRel so the retiring band's framebuffer stores happen-before the
        // completion message on the last decrement.
        if self.outstanding.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.signal();
        }
    }

    fn signal(&self) {
        if self.signaled.swap(true, Ordering::AcqRel) {
            return;
        }
        let mut failed = std::mem::take(
            &mut *self.failed.lock().unwrap_or_else(PoisonError::into_inner),
        );
        let message = if failed.is_empty() {
            Ok(())
        } else {
            failed.sort_unstable();
            failed.dedup();
            Err(RenderFailure { bands: failed })
        };
        // The receiver may already be gone when the job handle was dropped
        // mid-flight; nothing to signal then.
        let _ = self.done_tx.send(message);
    }
}

/// One in-flight render: a partition schedule dispatched across the worker
/// pool, a shared framebuffer the bands write into, and a completion signal
/// that fires exactly once.
pub struct RenderJob {
    framebuffer: Framebuffer,
    done_rx: Receiver<Result<(), RenderFailure>>,
    bands: usize,
}

impl RenderJob {
    /// Partition `canvas` into exactly `concurrency` disjoint row bands and
    /// dispatch one band per pool worker.
    ///
    /// `concurrency` must be in `1..=pool.size()` and the canvas non-empty;
    /// anything else is a [`RaytideError::Validation`].
    #[tracing::instrument(skip(pool, source))]
    pub fn start(
        canvas: Canvas,
        concurrency: usize,
        pool: &WorkerPool,
        source: Arc<dyn PixelSource>,
    ) -> RaytideResult<Self> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(RaytideError::validation("canvas dimensions must be > 0"));
        }
        if concurrency == 0 {
            return Err(RaytideError::validation("concurrency must be >= 1"));
        }
        if concurrency > pool.size() {
            return Err(RaytideError::validation(format!(
                "concurrency {concurrency} exceeds pool size {}",
                pool.size()
            )));
        }

        let framebuffer = Framebuffer::new(canvas);
        let schedule = partition_rows(canvas.height, concurrency);
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        let state = Arc::new(JobState {
            outstanding: AtomicUsize::new(schedule.len()),
            failed: Mutex::new(Vec::new()),
            signaled: AtomicBool::new(false),
            done_tx,
        });

        for band in schedule {
            let writer = framebuffer.writer(band.clone());
            let state = Arc::clone(&state);
            let source = Arc::clone(&source);
            let width = canvas.width;
            pool.spawn(move || {
                if let Err(e) = render_band(&band, width, &writer, source.as_ref()) {
                    tracing::debug!(band = band.index, error = %e, "band failed");
                    state.record_failure(band.index);
                }
                state.band_retired();
            });
        }

        Ok(Self {
            framebuffer,
            done_rx,
            bands: concurrency,
        })
    }

    /// The job's completion channel.
    ///
    /// Receives exactly one message per job: `Ok(())` after every band has
    /// finished writing its region, or `Err(RenderFailure)` once all bands
    /// have retired and at least one reported an error. The signal never fires
    /// while any dispatched band is still outstanding.
    pub fn completion(&self) -> &Receiver<Result<(), RenderFailure>> {
        &self.done_rx
    }

    /// Read-safe copy of whatever has been rendered so far; safe to call
    /// concurrently with in-progress band writes. Unwritten regions show the
    /// clear color.
    pub fn snapshot_so_far(&self) -> FrameRgba {
        self.framebuffer.snapshot()
    }

    /// Number of bands in the job's schedule.
    pub fn band_count(&self) -> usize {
        self.bands
    }
}

fn render_band(
    band: &RowBand,
    width: u32,
    writer: &BandWriter,
    source: &dyn PixelSource,
) -> RaytideResult<()> {
    for y in band.rows.clone() {
        for x in 0..width {
            writer.set(x, y, source.shade(x, y)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Fills every pixel with a color derived from the row's band, optionally
    /// slowly, optionally failing whole bands.
    struct BandFill {
        band_of_row: Box<dyn Fn(u32) -> usize + Send + Sync>,
        fail_bands: Vec<usize>,
        delay_per_row: Duration,
    }

    impl BandFill {
        fn new(height: u32, bands: usize) -> Self {
            let schedule = partition_rows(height, bands);
            let band_of_row = move |y: u32| {
                schedule
                    .iter()
                    .find(|b| b.rows.contains(&y))
                    .map(|b| b.index)
                    .unwrap_or(usize::MAX)
            };
            Self {
                band_of_row: Box::new(band_of_row),
                fail_bands: Vec::new(),
                delay_per_row: Duration::ZERO,
            }
        }

        fn color_for_band(band: usize) -> Rgba8 {
            Rgba8::opaque(band as u8 + 1, band as u8 + 1, band as u8 + 1)
        }
    }

    impl PixelSource for BandFill {
        fn shade(&self, x: u32, y: u32) -> RaytideResult<Rgba8> {
            let band = (self.band_of_row)(y);
            if self.fail_bands.contains(&band) {
                return Err(RaytideError::validation(format!("injected failure in band {band}")));
            }
            if x == 0 && !self.delay_per_row.is_zero() {
                std::thread::sleep(self.delay_per_row);
            }
            Ok(Self::color_for_band(band))
        }
    }

    fn canvas(w: u32, h: u32) -> Canvas {
        Canvas::new(w, h).unwrap()
    }

    #[test]
    fn start_validates_arguments() {
        let pool = WorkerPool::new(2).unwrap();
        let source: Arc<dyn PixelSource> = Arc::new(BandFill::new(8, 2));

        let err = RenderJob::start(canvas(8, 8), 0, &pool, Arc::clone(&source));
        assert!(matches!(err, Err(RaytideError::Validation(_))));

        let err = RenderJob::start(canvas(8, 8), 3, &pool, Arc::clone(&source));
        assert!(matches!(err, Err(RaytideError::Validation(_))));
    }

    #[test]
    fn completion_fires_exactly_once_on_success() {
        let pool = WorkerPool::new(4).unwrap();
        let source: Arc<dyn PixelSource> = Arc::new(BandFill::new(16, 4));
        let job = RenderJob::start(canvas(8, 16), 4, &pool, source).unwrap();

        let msg = job
            .completion()
            .recv_timeout(Duration::from_secs(10))
            .unwrap();
        assert_eq!(msg, Ok(()));

        // No duplicate signal.
        assert!(
            job.completion()
                .recv_timeout(Duration::from_millis(100))
                .is_err()
        );
    }

    #[test]
    fn finished_frame_has_every_band_color() {
        let pool = WorkerPool::new(4).unwrap();
        let source: Arc<dyn PixelSource> = Arc::new(BandFill::new(16, 4));
        let job = RenderJob::start(canvas(8, 16), 4, &pool, source).unwrap();
        job.completion()
            .recv_timeout(Duration::from_secs(10))
            .unwrap()
            .unwrap();

        let frame = job.snapshot_so_far();
        let schedule = partition_rows(16, 4);
        for band in &schedule {
            for y in band.rows.clone() {
                for x in 0..8 {
                    assert_eq!(frame.pixel(x, y), BandFill::color_for_band(band.index));
                }
            }
        }
    }

    #[test]
    fn snapshots_never_show_torn_or_foreign_pixels() {
        let pool = WorkerPool::new(4).unwrap();
        let mut fill = BandFill::new(64, 4);
        fill.delay_per_row = Duration::from_millis(1);
        let source: Arc<dyn PixelSource> = Arc::new(fill);
        let job = RenderJob::start(canvas(16, 64), 4, &pool, source).unwrap();

        let schedule = partition_rows(64, 4);
        // Poll snapshots while workers are mid-flight: every cell is either
        // still the clear color or exactly its band's fill — never a blend.
        loop {
            let snap = job.snapshot_so_far();
            for band in &schedule {
                let expected = BandFill::color_for_band(band.index);
                for y in band.rows.clone() {
                    for x in 0..16 {
                        let px = snap.pixel(x, y);
                        assert!(
                            px == Rgba8::BLACK || px == expected,
                            "torn/foreign pixel {px:?} at ({x}, {y})"
                        );
                    }
                }
            }
            if job.completion().try_recv().is_ok() {
                break;
            }
        }
    }

    #[test]
    fn failed_bands_aggregate_into_one_failure_signal() {
        let pool = WorkerPool::new(4).unwrap();
        let mut fill = BandFill::new(16, 4);
        fill.fail_bands = vec![3, 1];
        let source: Arc<dyn PixelSource> = Arc::new(fill);
        let job = RenderJob::start(canvas(8, 16), 4, &pool, source).unwrap();

        let msg = job
            .completion()
            .recv_timeout(Duration::from_secs(10))
            .unwrap();
        assert_eq!(msg, Err(RenderFailure { bands: vec![1, 3] }));
    }
}
