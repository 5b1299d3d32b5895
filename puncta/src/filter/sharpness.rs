use serde::{Deserialize, Serialize};

use crate::blob::Blob;
use crate::math::mean_f32;
use crate::volume::Volume;

/// Keeps blobs whose center voxel stands out from its 3×3×3 neighborhood.
///
/// Blobs on any outer face of the volume are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharpnessFilter {
    pub drop_factor: f32,
}

impl Default for SharpnessFilter {
    fn default() -> Self {
        Self { drop_factor: 1.4 }
    }
}

impl SharpnessFilter {
    pub fn new(drop_factor: f32) -> Self {
        Self { drop_factor }
    }

    pub fn validate(&self) {
        assert!(
            self.drop_factor >= 0.0,
            "drop_factor must be non-negative, got {}",
            self.drop_factor
        );
    }

    pub fn accepts(&self, volume: &Volume, blob: &Blob) -> bool {
        let p = blob.voxel();
        let interior = |v: i64, size: usize| v > 0 && v < size as i64 - 1;
        if !(interior(p.x, volume.width())
            && interior(p.y, volume.height())
            && interior(p.z, volume.depth()))
        {
            return false;
        }

        let (x, y, z) = (p.x as usize, p.y as usize, p.z as usize);
        let neighborhood = mean_f32((z - 1..=z + 1).flat_map(move |nz| {
            (y - 1..=y + 1).flat_map(move |ny| (x - 1..=x + 1).map(move |nx| volume[(nx, ny, nz)]))
        }));

        volume[(x, y, z)] > self.drop_factor * neighborhood
    }

    /// Drop blobs that fail [`Self::accepts`]. Returns the number removed.
    pub fn filter(&self, volume: &Volume, blobs: &mut Vec<Blob>) -> usize {
        self.validate();
        let before = blobs.len();
        blobs.retain(|blob| self.accepts(volume, blob));

        let removed = before - blobs.len();
        tracing::debug!("Sharpness filter removed {} of {} blobs", removed, before);
        removed
    }
}
