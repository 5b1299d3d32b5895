//! Blob record shared by every stage.

use glam::I64Vec3;
use serde::{Deserialize, Serialize};

/// A detected punctum candidate.
///
/// `z` is the slice the blob was found in; `y`/`x` are in pixels within that
/// slice. Stages keep or drop whole records and never rewrite fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Blob {
    pub z: usize,
    pub y: f32,
    pub x: f32,
    /// Gaussian sigma of the scale the blob was detected at.
    pub scale: f32,
    /// Mean intensity of the 3×3 XY window around the blob center.
    pub intensity: f32,
}

impl Blob {
    pub fn new(z: usize, y: f32, x: f32, scale: f32, intensity: f32) -> Self {
        Self {
            z,
            y,
            x,
            scale,
            intensity,
        }
    }

    /// Nearest voxel as `(x, y, z)`, rounding halves to even.
    #[inline]
    pub fn voxel(&self) -> I64Vec3 {
        I64Vec3::new(
            self.x.round_ties_even() as i64,
            self.y.round_ties_even() as i64,
            self.z as i64,
        )
    }

    /// Squared XY distance to another blob.
    #[inline]
    pub fn distance_xy_sq(&self, other: &Blob) -> f32 {
        let dy = self.y - other.y;
        let dx = self.x - other.x;
        dy * dy + dx * dx
    }

    /// True when `other` lies inside the cylinder of XY radius `radius_xy`
    /// spanning `z_window` slices above and below this blob. Both bounds are
    /// inclusive.
    #[inline]
    pub fn within_cylinder(&self, other: &Blob, radius_xy: f32, z_window: usize) -> bool {
        self.z.abs_diff(other.z) <= z_window && self.distance_xy_sq(other) <= radius_xy * radius_xy
    }
}

/// Sort blobs by descending intensity. Stable, so equal intensities keep
/// their input order.
pub(crate) fn sort_by_intensity(blobs: &mut [Blob]) {
    blobs.sort_by(|a, b| b.intensity.total_cmp(&a.intensity));
}

/// Compact `blobs` to the entries whose `kept` flag is set, preserving order.
/// Returns the number removed.
pub(crate) fn retain_kept(blobs: &mut Vec<Blob>, kept: &[bool]) -> usize {
    debug_assert_eq!(blobs.len(), kept.len());

    let mut write_idx = 0;
    for read_idx in 0..blobs.len() {
        if kept[read_idx] {
            if write_idx != read_idx {
                blobs[write_idx] = blobs[read_idx];
            }
            write_idx += 1;
        }
    }
    let removed = blobs.len() - write_idx;
    blobs.truncate(write_idx);
    removed
}
