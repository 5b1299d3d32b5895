//! Voxel rasterization of straight 3D segments.

use glam::{DVec3, I64Vec3};

/// Voxels on the segment from `start` towards `stop`.
///
/// The segment is sampled at `n` evenly spaced points, where `n` is the
/// largest absolute per-axis delta; `start` is included and `stop` is not.
/// Sample coordinates are rounded half to even. Coincident endpoints give the
/// single shared voxel.
pub(crate) fn line_voxels(start: I64Vec3, stop: I64Vec3) -> Vec<I64Vec3> {
    let delta = stop - start;
    let steps = delta.abs().max_element();
    if steps == 0 {
        return vec![start];
    }

    let origin = start.as_dvec3();
    let step = delta.as_dvec3() / steps as f64;
    (0..steps)
        .map(|k| {
            let p: DVec3 = origin + step * k as f64;
            I64Vec3::new(
                p.x.round_ties_even() as i64,
                p.y.round_ties_even() as i64,
                p.z.round_ties_even() as i64,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: i64, y: i64, z: i64) -> I64Vec3 {
        I64Vec3::new(x, y, z)
    }

    #[test]
    fn test_axis_aligned_line_excludes_endpoint() {
        let line = line_voxels(v(2, 5, 1), v(6, 5, 1));
        assert_eq!(line, vec![v(2, 5, 1), v(3, 5, 1), v(4, 5, 1), v(5, 5, 1)]);
    }

    #[test]
    fn test_coincident_endpoints_give_single_voxel() {
        assert_eq!(line_voxels(v(3, 3, 3), v(3, 3, 3)), vec![v(3, 3, 3)]);
    }

    #[test]
    fn test_diagonal_with_shallow_axis_rounds_half_to_even() {
        // x steps 0..4, y advances 0.5 per step: 0, 0.5, 1.0, 1.5 -> 0, 0, 1, 2
        let line = line_voxels(v(0, 0, 0), v(4, 2, 0));
        assert_eq!(line, vec![v(0, 0, 0), v(1, 0, 0), v(2, 1, 0), v(3, 2, 0)]);
    }

    #[test]
    fn test_reverse_direction_and_z_steps() {
        let line = line_voxels(v(0, 0, 3), v(0, 0, 0));
        assert_eq!(line, vec![v(0, 0, 3), v(0, 0, 2), v(0, 0, 1)]);
    }

    #[test]
    fn test_length_is_largest_axis_delta() {
        let line = line_voxels(v(10, 40, 2), v(17, 10, 5));
        assert_eq!(line.len(), 30);
        assert_eq!(line[0], v(10, 40, 2));
        // every consecutive pair moves exactly one voxel along y
        for pair in line.windows(2) {
            assert_eq!(pair[1].y - pair[0].y, -1);
        }
    }
}
