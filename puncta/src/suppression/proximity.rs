//! Greedy cylinder-based duplicate removal.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::blob::{retain_kept, sort_by_intensity, Blob};

/// Below this many blobs the direct pairwise scan is used.
const GRID_CUTOFF: usize = 100;

/// Keeps the brightest blob of every local neighborhood.
///
/// Two blobs are neighbors when they are at most `z_window` slices apart and
/// within `radius_xy` pixels in XY.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximitySuppressor {
    pub radius_xy: f32,
    pub z_window: usize,
}

impl Default for ProximitySuppressor {
    fn default() -> Self {
        Self {
            radius_xy: 10.0,
            z_window: 2,
        }
    }
}

impl ProximitySuppressor {
    pub fn new(radius_xy: f32, z_window: usize) -> Self {
        Self { radius_xy, z_window }
    }

    pub fn validate(&self) {
        assert!(
            self.radius_xy >= 0.0,
            "radius_xy must be non-negative, got {}",
            self.radius_xy
        );
    }

    /// Remove every blob that has a brighter kept neighbor.
    ///
    /// On return `blobs` is sorted by descending intensity (stable on ties).
    /// Returns the number of blobs removed.
    pub fn suppress(&self, blobs: &mut Vec<Blob>) -> usize {
        self.validate();
        sort_by_intensity(blobs);
        if blobs.len() < 2 {
            return 0;
        }

        let kept = if blobs.len() < GRID_CUTOFF || self.radius_xy <= 0.0 {
            self.scan_pairs(blobs)
        } else {
            self.scan_grid(blobs)
        };

        let removed = retain_kept(blobs, &kept);
        tracing::debug!(
            "Proximity suppression removed {} blobs, {} remain",
            removed,
            blobs.len()
        );
        removed
    }

    pub(super) fn scan_pairs(&self, blobs: &[Blob]) -> Vec<bool> {
        let mut kept = vec![true; blobs.len()];
        for i in 0..blobs.len() {
            if !kept[i] {
                continue;
            }
            for j in (i + 1)..blobs.len() {
                if kept[j] && blobs[i].within_cylinder(&blobs[j], self.radius_xy, self.z_window) {
                    kept[j] = false;
                }
            }
        }
        kept
    }

    /// Same keep set as [`Self::scan_pairs`]: a blob goes iff an earlier kept
    /// blob lies within its cylinder, so only kept blobs need indexing.
    ///
    /// Falls back to the pairwise scan when a cell index is not representable
    /// (radius tiny relative to the coordinates).
    pub(super) fn scan_grid(&self, blobs: &[Blob]) -> Vec<bool> {
        let cell_size = self.radius_xy;
        let cells: Option<Vec<(i64, i64)>> = blobs
            .iter()
            .map(|blob| Some((cell_index(blob.y, cell_size)?, cell_index(blob.x, cell_size)?)))
            .collect();
        let Some(cells) = cells else {
            tracing::debug!(
                "Cell size {} too small for blob coordinates, using pairwise scan",
                cell_size
            );
            return self.scan_pairs(blobs);
        };

        let min_z = blobs.iter().map(|b| b.z).min().unwrap_or(0);
        let max_z = blobs.iter().map(|b| b.z).max().unwrap_or(0);

        let mut grid: HashMap<(usize, i64, i64), Vec<usize>> = HashMap::new();
        let mut kept = vec![true; blobs.len()];

        for (j, (blob, &(cell_y, cell_x))) in blobs.iter().zip(&cells).enumerate() {
            let z_lo = blob.z.saturating_sub(self.z_window).max(min_z);
            let z_hi = blob.z.saturating_add(self.z_window).min(max_z);

            let mut is_duplicate = false;
            'outer: for z in z_lo..=z_hi {
                for ny in (cell_y - 1)..=(cell_y + 1) {
                    for nx in (cell_x - 1)..=(cell_x + 1) {
                        let Some(cell) = grid.get(&(z, ny, nx)) else {
                            continue;
                        };
                        if cell
                            .iter()
                            .any(|&i| blobs[i].within_cylinder(blob, self.radius_xy, self.z_window))
                        {
                            is_duplicate = true;
                            break 'outer;
                        }
                    }
                }
            }

            if is_duplicate {
                kept[j] = false;
            } else {
                grid.entry((blob.z, cell_y, cell_x)).or_default().push(j);
            }
        }
        kept
    }
}

/// Grid cell of coordinate `v`, or `None` when it is not finite or too large
/// for the neighbor offsets to stay in range.
fn cell_index(v: f32, cell_size: f32) -> Option<i64> {
    const MAX_CELL: f64 = (1u64 << 52) as f64;
    let cell = (v as f64 / cell_size as f64).floor();
    (cell.is_finite() && cell.abs() < MAX_CELL).then_some(cell as i64)
}
