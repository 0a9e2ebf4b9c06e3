use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::select;

use crate::foundation::core::{Canvas, FrameRgba};
use crate::foundation::error::{RaytideError, RaytideResult};
use crate::render::job::{PixelSource, RenderJob};
use crate::render::pool::WorkerPool;

/// Observer boundary for render progress and completion; the presentation
/// layer implements this.
///
/// For one render the controller calls `on_progress` once per tick (with a
/// snapshot only on snapshot ticks, plus a final snapshot on success) and then
/// `on_complete` exactly once. No events are delivered after `on_complete`.
pub trait ProgressSink: Send {
    /// Elapsed time since the render started; `snapshot` is present only on
    /// snapshot ticks.
    fn on_progress(&mut self, elapsed: Duration, snapshot: Option<&FrameRgba>);

    /// Terminal event: the finished framebuffer, or the job's failure. No
    /// framebuffer is presented on the failure path.
    fn on_complete(&mut self, result: Result<FrameRgba, RaytideError>);
}

/// Options controlling the controller's poll cadence.
#[derive(Clone, Debug)]
pub struct ControllerOpts {
    /// Interval between progress ticks.
    pub tick_interval: Duration,
    /// Forward a framebuffer snapshot on every Nth tick. Must be >= 2:
    /// snapshot extraction is much more expensive than the elapsed-time
    /// update, so elapsed time always updates more often than the image.
    pub snapshot_every: u32,
}

impl Default for ControllerOpts {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(100),
            snapshot_every: 3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Running,
    Completing,
}

/// Orchestrates at most one [`RenderJob`] at a time: starts it on demand,
/// polls it on a fixed cadence to feed an observer with in-progress imagery
/// and elapsed time, and finalizes it exactly once when the completion signal
/// fires.
///
/// The caller's thread never blocks: ticking and completion handling run on a
/// dedicated monitor thread that multiplexes a timer against the job's
/// completion channel and exits when the render reaches a terminal state.
pub struct RenderController {
    pool: Arc<WorkerPool>,
    opts: ControllerOpts,
    phase: Arc<Mutex<Phase>>,
    monitor: Option<JoinHandle<()>>,
}

impl RenderController {
    /// Create a controller over `pool`.
    pub fn new(pool: Arc<WorkerPool>, opts: ControllerOpts) -> RaytideResult<Self> {
        if opts.tick_interval.is_zero() {
            return Err(RaytideError::validation("tick_interval must be > 0"));
        }
        if opts.snapshot_every < 2 {
            return Err(RaytideError::validation(
                "snapshot_every must be >= 2 so elapsed time updates more often than snapshots",
            ));
        }
        Ok(Self {
            pool,
            opts,
            phase: Arc::new(Mutex::new(Phase::Idle)),
            monitor: None,
        })
    }

    /// Start a render if the controller is idle.
    ///
    /// Returns `Ok(false)` — the defined ignore-until-idle policy, not an
    /// error — while a previous render is still running or completing. On
    /// `Ok(true)` the job has been dispatched and `sink` will receive progress
    /// events until its single `on_complete`.
    pub fn start_render(
        &mut self,
        canvas: Canvas,
        concurrency: usize,
        source: Arc<dyn PixelSource>,
        sink: Box<dyn ProgressSink>,
    ) -> RaytideResult<bool> {
        {
            let mut phase = lock(&self.phase);
            if *phase != Phase::Idle {
                return Ok(false);
            }
            *phase = Phase::Running;
        }

        let started = Instant::now();
        let job = match RenderJob::start(canvas, concurrency, &self.pool, source) {
            Ok(job) => job,
            Err(e) => {
                *lock(&self.phase) = Phase::Idle;
                return Err(e);
            }
        };

        // The previous monitor has already exited (phase was Idle); reap its
        // handle so they don't accumulate across renders.
        if let Some(handle) = self.monitor.take() {
            let _ = handle.join();
        }

        let phase = Arc::clone(&self.phase);
        let ticks = crossbeam_channel::tick(self.opts.tick_interval);
        let snapshot_every = self.opts.snapshot_every;
        let handle = std::thread::Builder::new()
            .name("raytide-monitor".to_owned())
            .spawn(move || run_monitor(job, ticks, snapshot_every, started, sink, phase))
            .map_err(|e| {
                *lock(&self.phase) = Phase::Idle;
                RaytideError::Other(anyhow::anyhow!("failed to spawn monitor thread: {e}"))
            })?;
        self.monitor = Some(handle);
        Ok(true)
    }

    /// Whether a new render would currently be accepted.
    pub fn is_idle(&self) -> bool {
        *lock(&self.phase) == Phase::Idle
    }

    /// Block until the in-flight render, if any, has finalized.
    pub fn join(&mut self) {
        if let Some(handle) = self.monitor.take() {
            let _ = handle.join();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Tick/completion multiplex loop for one render.
///
/// The timer is the `ticks` channel; dropping it on loop exit stops ticking,
/// and because only this thread observes both channels the stop happens
/// exactly once no matter which terminal path fired.
fn run_monitor(
    job: RenderJob,
    ticks: crossbeam_channel::Receiver<Instant>,
    snapshot_every: u32,
    started: Instant,
    mut sink: Box<dyn ProgressSink>,
    phase: Arc<Mutex<Phase>>,
) {
    let mut counter: u32 = 0;
    loop {
        select! {
            recv(ticks) -> _ => {
                counter += 1;
                let elapsed = started.elapsed();
                if counter % snapshot_every == 0 {
                    let snap = job.snapshot_so_far();
                    sink.on_progress(elapsed, Some(&snap));
                } else {
                    sink.on_progress(elapsed, None);
                }
            }
            recv(job.completion()) -> msg => {
                *lock(&phase) = Phase::Completing;
                let elapsed = started.elapsed();
                let result = match msg {
                    Ok(Ok(())) => {
                        // Success: one final elapsed/snapshot update, then the
                        // finished framebuffer.
                        let frame = job.snapshot_so_far();
                        sink.on_progress(elapsed, Some(&frame));
                        Ok(frame)
                    }
                    Ok(Err(failure)) => Err(RaytideError::RenderFailed(failure)),
                    Err(_) => Err(RaytideError::Other(anyhow::anyhow!(
                        "completion channel disconnected before signaling"
                    ))),
                };
                tracing::debug!(elapsed_ms = elapsed.as_millis() as u64, ok = result.is_ok(), "render finalized");
                sink.on_complete(result);
                break;
            }
        }
    }
    drop(job);
    *lock(&phase) = Phase::Idle;
}

/// In-memory [`ProgressSink`] that records every event; shared handles let
/// tests and demos inspect what was delivered.
#[derive(Clone, Default)]
pub struct RecordingSink {
    inner: Arc<Mutex<RecordedEvents>>,
}

/// Events captured by a [`RecordingSink`].
#[derive(Default)]
pub struct RecordedEvents {
    /// One entry per `on_progress` call, in delivery order.
    pub progress: Vec<(Duration, Option<FrameRgba>)>,
    /// One entry per `on_complete` call (exactly one per render).
    pub completions: Vec<Result<FrameRgba, RaytideError>>,
}

impl RecordingSink {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of progress events delivered so far.
    pub fn progress_len(&self) -> usize {
        lock(&self.inner).progress.len()
    }

    /// Number of completion events delivered so far.
    pub fn completion_len(&self) -> usize {
        lock(&self.inner).completions.len()
    }

    /// Take everything recorded so far.
    pub fn take(&self) -> RecordedEvents {
        std::mem::take(&mut *lock(&self.inner))
    }
}

impl ProgressSink for RecordingSink {
    fn on_progress(&mut self, elapsed: Duration, snapshot: Option<&FrameRgba>) {
        lock(&self.inner).progress.push((elapsed, snapshot.cloned()));
    }

    fn on_complete(&mut self, result: Result<FrameRgba, RaytideError>) {
        lock(&self.inner).completions.push(result);
    }
}
