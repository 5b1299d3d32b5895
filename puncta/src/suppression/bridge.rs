//! Removal of detections joined by a bright bridge.
//!
//! Diffuse signal can produce two detections on one structure. For every
//! nearby pair the volume is sampled along the straight line between the two
//! centers; if the darkest sample is still a large fraction of the peaks'
//! mean intensity there is no valley between them and the weaker one goes.

use serde::{Deserialize, Serialize};

use super::line::line_voxels;
use crate::blob::{retain_kept, sort_by_intensity, Blob};
use crate::volume::Volume;

/// Pairwise scans above this many blobs are logged as a scaling risk.
const SCALING_LIMIT: usize = 20_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeSuppressor {
    pub radius_xy: f32,
    pub z_window: usize,
    /// Pairs whose dip ratio exceeds this are treated as one structure.
    pub dip_threshold: f32,
}

impl Default for BridgeSuppressor {
    fn default() -> Self {
        Self {
            radius_xy: 20.0,
            z_window: 4,
            dip_threshold: 0.5,
        }
    }
}

impl BridgeSuppressor {
    pub fn new(radius_xy: f32, z_window: usize, dip_threshold: f32) -> Self {
        Self {
            radius_xy,
            z_window,
            dip_threshold,
        }
    }

    pub fn validate(&self) {
        assert!(
            self.radius_xy >= 0.0,
            "radius_xy must be non-negative, got {}",
            self.radius_xy
        );
        assert!(
            self.dip_threshold > 0.0 && self.dip_threshold <= 1.0,
            "dip_threshold must be in (0, 1], got {}",
            self.dip_threshold
        );
    }

    /// Drop the weaker member of every bridged pair.
    ///
    /// Pairs are visited in descending-intensity order. When the weaker member
    /// is the outer blob `i` (equal intensities), `i` is dropped and compared
    /// against nothing further. On return `blobs` is intensity-descending.
    /// Returns the number of blobs removed.
    pub fn suppress(&self, volume: &Volume, blobs: &mut Vec<Blob>) -> usize {
        self.validate();
        sort_by_intensity(blobs);
        if blobs.len() < 2 {
            return 0;
        }
        if blobs.len() > SCALING_LIMIT {
            tracing::warn!(
                "Bridge suppression over {} blobs is a quadratic scan; expect a long run",
                blobs.len()
            );
        }

        let mut kept = vec![true; blobs.len()];
        for i in 0..blobs.len() {
            if !kept[i] {
                continue;
            }
            for j in (i + 1)..blobs.len() {
                if !kept[j] || !blobs[i].within_cylinder(&blobs[j], self.radius_xy, self.z_window) {
                    continue;
                }
                let Some(ratio) = dip_ratio(volume, &blobs[i], &blobs[j]) else {
                    continue;
                };
                if ratio <= self.dip_threshold {
                    continue;
                }

                if blobs[i].intensity > blobs[j].intensity {
                    kept[j] = false;
                } else {
                    kept[i] = false;
                    break;
                }
            }
        }

        let removed = retain_kept(blobs, &kept);
        tracing::debug!(
            "Bridge suppression removed {} blobs, {} remain",
            removed,
            blobs.len()
        );
        removed
    }
}

/// Darkest sample on the line between two blobs over their mean intensity.
///
/// `None` when no line voxel lies inside the volume.
pub(crate) fn dip_ratio(volume: &Volume, a: &Blob, b: &Blob) -> Option<f32> {
    let min_val = line_voxels(a.voxel(), b.voxel())
        .into_iter()
        .filter_map(|p| volume.checked_get(p.x, p.y, p.z).copied())
        .reduce(f32::min)?;

    let avg_peak = (a.intensity + b.intensity) / 2.0;
    Some(min_val / avg_peak)
}
