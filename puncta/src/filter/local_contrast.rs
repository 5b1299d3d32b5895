use serde::{Deserialize, Serialize};

use crate::blob::Blob;
use crate::math::mean_f32;
use crate::volume::Volume;

/// Keeps blobs clearly brighter than the square region around them.
///
/// The region spans `region_size` pixels on each side of the rounded center in
/// the blob's own slice. Blobs closer than `region_size` to an XY edge are
/// dropped without being measured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalContrastFilter {
    pub region_size: usize,
    pub ratio_threshold: f32,
}

impl Default for LocalContrastFilter {
    fn default() -> Self {
        Self {
            region_size: 10,
            ratio_threshold: 2.0,
        }
    }
}

impl LocalContrastFilter {
    pub fn new(region_size: usize, ratio_threshold: f32) -> Self {
        Self {
            region_size,
            ratio_threshold,
        }
    }

    pub fn validate(&self) {
        assert!(
            self.ratio_threshold >= 0.0,
            "ratio_threshold must be non-negative, got {}",
            self.ratio_threshold
        );
    }

    /// Mean of the blob's region, or `None` when the region leaves the slice.
    pub fn local_mean(&self, volume: &Volume, blob: &Blob) -> Option<f32> {
        let p = blob.voxel();
        let r = self.region_size as i64;
        let (width, height) = (volume.width() as i64, volume.height() as i64);

        let inside = (r..height - r).contains(&p.y)
            && (r..width - r).contains(&p.x)
            && (0..volume.depth() as i64).contains(&p.z);
        if !inside {
            return None;
        }

        let plane = volume.slice(p.z as usize);
        let mean = mean_f32(((p.y - r)..=(p.y + r)).flat_map(move |y| {
            let row = (y * width) as usize;
            plane[row + (p.x - r) as usize..=row + (p.x + r) as usize]
                .iter()
                .copied()
        }));
        Some(mean)
    }

    pub fn accepts(&self, volume: &Volume, blob: &Blob) -> bool {
        self.local_mean(volume, blob)
            .is_some_and(|mean| blob.intensity > self.ratio_threshold * mean)
    }

    /// Drop blobs that fail [`Self::accepts`]. Returns the number removed.
    pub fn filter(&self, volume: &Volume, blobs: &mut Vec<Blob>) -> usize {
        self.validate();
        let before = blobs.len();
        blobs.retain(|blob| self.accepts(volume, blob));

        let removed = before - blobs.len();
        tracing::debug!(
            "Local contrast filter removed {} of {} blobs",
            removed,
            before
        );
        removed
    }
}
