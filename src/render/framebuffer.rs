use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::foundation::core::{Canvas, FrameRgba, Rgba8};
use crate::render::partition::RowBand;

/// Shared framebuffer written by render workers and snapshotted by observers.
///
/// Each cell is one packed RGBA8 pixel in an `AtomicU32`. Bands write disjoint
/// rows so writes never contend, and because every load/store moves a whole
/// cell, a snapshot can never observe a torn pixel — no per-pixel locking is
/// needed. Cell ordering is `Relaxed`: cells are independent and no cross-cell
/// ordering is claimed; the job's completion path establishes the final
/// happens-before edge.
pub struct Framebuffer {
    canvas: Canvas,
    cells: Arc<[AtomicU32]>,
}

impl Framebuffer {
    /// Allocate a framebuffer cleared to [`Rgba8::BLACK`].
    pub fn new(canvas: Canvas) -> Self {
        let clear = Rgba8::BLACK.pack();
        let cells: Arc<[AtomicU32]> = (0..canvas.pixel_count())
            .map(|_| AtomicU32::new(clear))
            .collect();
        Self { canvas, cells }
    }

    /// Canvas dimensions of this framebuffer.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Create a write handle scoped to one band's rows.
    pub fn writer(&self, band: RowBand) -> BandWriter {
        debug_assert!(band.rows.end <= self.canvas.height);
        BandWriter {
            canvas: self.canvas,
            rows: band.rows,
            cells: Arc::clone(&self.cells),
        }
    }

    /// Read-safe copy of the current contents, valid while workers keep
    /// writing other cells. Unwritten regions show the clear color.
    pub fn snapshot(&self) -> FrameRgba {
        let mut data = Vec::with_capacity(4 * self.cells.len());
        for cell in self.cells.iter() {
            data.extend_from_slice(&cell.load(Ordering::Relaxed).to_le_bytes());
        }
        FrameRgba {
            width: self.canvas.width,
            height: self.canvas.height,
            data,
        }
    }
}

/// Write handle for one band; writes outside the band are a bug in the
/// schedule and trip an assertion.
pub struct BandWriter {
    canvas: Canvas,
    rows: std::ops::Range<u32>,
    cells: Arc<[AtomicU32]>,
}

impl BandWriter {
    /// Row range this writer owns.
    pub fn rows(&self) -> std::ops::Range<u32> {
        self.rows.clone()
    }

    /// Store one pixel. `(x, y)` must be inside the canvas and `y` inside the
    /// writer's band.
    pub fn set(&self, x: u32, y: u32, px: Rgba8) {
        assert!(x < self.canvas.width, "x out of bounds");
        assert!(self.rows.contains(&y), "row outside owned band");
        let i = (y as usize) * (self.canvas.width as usize) + (x as usize);
        self.cells[i].store(px.pack(), Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::partition::partition_rows;

    fn canvas(w: u32, h: u32) -> Canvas {
        Canvas::new(w, h).unwrap()
    }

    #[test]
    fn fresh_snapshot_is_clear_color() {
        let fb = Framebuffer::new(canvas(4, 3));
        let snap = fb.snapshot();
        assert_eq!(snap.width, 4);
        assert_eq!(snap.height, 3);
        assert_eq!(snap.data.len(), 4 * 4 * 3);
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(snap.pixel(x, y), Rgba8::BLACK);
            }
        }
    }

    #[test]
    fn band_writes_are_visible_in_snapshots() {
        let fb = Framebuffer::new(canvas(2, 4));
        let bands = partition_rows(4, 2);
        let writer = fb.writer(bands[1].clone());
        writer.set(1, 3, Rgba8::opaque(10, 20, 30));

        let snap = fb.snapshot();
        assert_eq!(snap.pixel(1, 3), Rgba8::opaque(10, 20, 30));
        assert_eq!(snap.pixel(0, 0), Rgba8::BLACK);
    }

    #[test]
    #[should_panic(expected = "row outside owned band")]
    fn writing_outside_the_band_panics() {
        let fb = Framebuffer::new(canvas(2, 4));
        let bands = partition_rows(4, 2);
        fb.writer(bands[0].clone()).set(0, 3, Rgba8::BLACK);
    }
}
