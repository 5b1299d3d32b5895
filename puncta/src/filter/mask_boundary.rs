use serde::{Deserialize, Serialize};

use crate::blob::Blob;
use crate::morphology::erode_mask;
use crate::volume::Mask;

/// Drops blobs in the band between a mask and its erosion.
///
/// Segmentation masks are least reliable at their edges; puncta found there
/// are often membrane or neighboring-cell signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskBoundaryFilter {
    /// Number of 6-connected erosion steps; 0 erodes until nothing changes.
    pub erosion_iterations: usize,
}

impl Default for MaskBoundaryFilter {
    fn default() -> Self {
        Self {
            erosion_iterations: 10,
        }
    }
}

impl MaskBoundaryFilter {
    pub fn new(erosion_iterations: usize) -> Self {
        Self { erosion_iterations }
    }

    /// Erode `mask` and build the boundary ring.
    pub fn ring(&self, mask: &Mask) -> BoundaryRing {
        BoundaryRing::new(mask, self.erosion_iterations)
    }

    /// Drop ring and out-of-bounds blobs.
    ///
    /// Returns the number removed and the eroded mask, which callers can keep
    /// to avoid eroding the same mask again.
    pub fn filter(&self, mask: &Mask, blobs: &mut Vec<Blob>) -> (usize, Mask) {
        let ring = self.ring(mask);
        let removed = ring.filter(blobs);
        (removed, ring.into_eroded())
    }
}

/// A mask's eroded interior and the ring it leaves behind.
#[derive(Debug, Clone)]
pub struct BoundaryRing {
    eroded: Mask,
    ring: Mask,
}

impl BoundaryRing {
    pub fn new(mask: &Mask, erosion_iterations: usize) -> Self {
        let eroded = erode_mask(mask, erosion_iterations);
        let ring = mask.and_not(&eroded);
        tracing::debug!(
            "Mask boundary ring: {} of {} mask voxels after {} erosion steps",
            ring.count_ones(),
            mask.count_ones(),
            erosion_iterations
        );
        Self { eroded, ring }
    }

    pub fn eroded(&self) -> &Mask {
        &self.eroded
    }

    pub fn into_eroded(self) -> Mask {
        self.eroded
    }

    /// True iff the blob's rounded voxel is inside the grid and not in the ring.
    pub fn keeps(&self, blob: &Blob) -> bool {
        let p = blob.voxel();
        let in_bounds = |v: i64, size: usize| v >= 0 && (v as usize) < size;
        in_bounds(p.x, self.ring.width())
            && in_bounds(p.y, self.ring.height())
            && in_bounds(p.z, self.ring.depth())
            && !self.ring.get_xyz(p.x as usize, p.y as usize, p.z as usize)
    }

    /// Drop blobs that fail [`Self::keeps`]. Returns the number removed.
    pub fn filter(&self, blobs: &mut Vec<Blob>) -> usize {
        let before = blobs.len();
        blobs.retain(|blob| self.keeps(blob));

        let removed = before - blobs.len();
        tracing::debug!(
            "Mask boundary filter removed {} of {} blobs",
            removed,
            before
        );
        removed
    }
}
