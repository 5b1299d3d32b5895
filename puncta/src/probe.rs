//! Intensity measurement that refuses to clip at slice edges.

use crate::blob::Blob;
use crate::math::mean_f32;
use crate::volume::Volume;

/// Mean of the full 3×3 XY window at the blob's rounded voxel.
///
/// `None` unless the whole window lies inside the slice, i.e.
/// `1 <= y < height - 1`, `1 <= x < width - 1` and `0 <= z < depth`.
pub fn measure_interior_intensity(volume: &Volume, blob: &Blob) -> Option<f32> {
    let p = blob.voxel();
    let interior = |v: i64, size: usize| v >= 1 && v < size as i64 - 1;
    if !(interior(p.y, volume.height())
        && interior(p.x, volume.width())
        && (0..volume.depth() as i64).contains(&p.z))
    {
        return None;
    }

    let (x, y, z) = (p.x as usize, p.y as usize, p.z as usize);
    Some(mean_f32(
        (y - 1..=y + 1).flat_map(move |ny| (x - 1..=x + 1).map(move |nx| volume[(nx, ny, z)])),
    ))
}

/// Re-measure every blob, dropping those without a full interior window.
///
/// Returns the number of blobs dropped.
pub fn remeasure_interior(volume: &Volume, blobs: &mut Vec<Blob>) -> usize {
    let before = blobs.len();
    blobs.retain_mut(|blob| match measure_interior_intensity(volume, blob) {
        Some(intensity) => {
            blob.intensity = intensity;
            true
        }
        None => false,
    });
    before - blobs.len()
}
