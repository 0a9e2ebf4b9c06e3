use std::ops::Range;

/// A contiguous band of framebuffer rows owned by exactly one worker for one
/// render job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowBand {
    /// Position of this band in the job's schedule, `0..concurrency`.
    pub index: usize,
    /// Half-open row range `[start, end)` owned by this band.
    pub rows: Range<u32>,
}

impl RowBand {
    /// Number of rows in the band. Bands may be empty when the schedule has
    /// more bands than the image has rows.
    pub fn height(&self) -> u32 {
        self.rows.end - self.rows.start
    }
}

/// Split `height` rows into exactly `bands` contiguous, disjoint row bands
/// whose union covers `[0, height)` exactly once.
///
/// Band `i` owns rows `[i*height/bands, (i+1)*height/bands)`. The schedule is
/// a pure function of its inputs, so the same `(height, bands)` always yields
/// the same partitioning.
pub fn partition_rows(height: u32, bands: usize) -> Vec<RowBand> {
    let n = bands as u64;
    let h = u64::from(height);
    (0..bands)
        .map(|i| {
            let start = ((i as u64) * h / n) as u32;
            let end = ((i as u64 + 1) * h / n) as u32;
            RowBand {
                index: i,
                rows: start..end,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_bands_of_600_rows() {
        let bands = partition_rows(600, 4);
        let rows: Vec<_> = bands.iter().map(|b| b.rows.clone()).collect();
        assert_eq!(rows, vec![0..150, 150..300, 300..450, 450..600]);
    }

    #[test]
    fn schedule_covers_every_row_exactly_once() {
        for height in [1, 2, 3, 17, 599, 600, 1080] {
            for n in 1..=8usize {
                let bands = partition_rows(height, n);
                assert_eq!(bands.len(), n);

                let mut next = 0u32;
                for (i, band) in bands.iter().enumerate() {
                    assert_eq!(band.index, i);
                    assert_eq!(band.rows.start, next, "gap/overlap at h={height} n={n}");
                    next = band.rows.end;
                }
                assert_eq!(next, height, "uncovered rows at h={height} n={n}");
            }
        }
    }

    #[test]
    fn more_bands_than_rows_yields_empty_bands_but_full_coverage() {
        let bands = partition_rows(2, 5);
        let total: u32 = bands.iter().map(|b| b.height()).sum();
        assert_eq!(total, 2);
        assert!(bands.iter().any(|b| b.height() == 0));
    }

    #[test]
    fn schedule_is_deterministic() {
        assert_eq!(partition_rows(601, 4), partition_rows(601, 4));
    }
}
