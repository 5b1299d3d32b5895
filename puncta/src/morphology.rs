//! Binary erosion of 3D masks.

use common::BitBuffer3;
use rayon::prelude::*;

/// Face neighbors: the 6-connected structuring element minus its center.
const FACE_OFFSETS: [(i64, i64, i64); 6] = [
    (-1, 0, 0),
    (1, 0, 0),
    (0, -1, 0),
    (0, 1, 0),
    (0, 0, -1),
    (0, 0, 1),
];

/// One erosion step with the 6-connected structuring element.
///
/// A voxel survives iff it and all six face neighbors are set. Voxels outside
/// the grid count as unset, so the outer faces erode too.
pub fn erode_once(mask: &BitBuffer3) -> BitBuffer3 {
    let (width, height, depth) = (mask.width(), mask.height(), mask.depth());
    let plane = width * height;
    if plane == 0 || depth == 0 {
        return mask.clone();
    }

    let bits: Vec<bool> = (0..depth)
        .into_par_iter()
        .flat_map_iter(|z| {
            (0..plane).map(move |i| {
                let (x, y) = (i % width, i / width);
                mask.get_xyz(x, y, z)
                    && FACE_OFFSETS.iter().all(|&(dx, dy, dz)| {
                        let nx = x as i64 + dx;
                        let ny = y as i64 + dy;
                        let nz = z as i64 + dz;
                        nx >= 0
                            && ny >= 0
                            && nz >= 0
                            && (nx as usize) < width
                            && (ny as usize) < height
                            && (nz as usize) < depth
                            && mask.get_xyz(nx as usize, ny as usize, nz as usize)
                    })
            })
        })
        .collect();

    BitBuffer3::from_slice(width, height, depth, &bits)
}

/// Erode `mask` `iterations` times.
///
/// `iterations == 0` repeats until the mask stops changing, which for a
/// finite grid empties it. Stops early once a fixed point is reached.
pub fn erode_mask(mask: &BitBuffer3, iterations: usize) -> BitBuffer3 {
    let limit = if iterations == 0 { usize::MAX } else { iterations };

    let mut current = mask.clone();
    for step in 0..limit {
        let next = erode_once(&current);
        if next == current {
            tracing::trace!("Erosion reached a fixed point after {} steps", step);
            break;
        }
        current = next;
    }
    current
}
