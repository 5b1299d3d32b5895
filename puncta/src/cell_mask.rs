//! Cell label planes and the masks derived from them.
//!
//! Segmentation yields one 2D label plane per field of view: `0` is
//! background, `1..=N` are cells. The detection mask is the union of the
//! cells a reviewer kept, repeated through every slice of the volume.

use common::BitBuffer3;
use hashbrown::HashSet;
use num_traits::AsPrimitive;

use crate::error::{Error, Result};
use crate::volume::Mask;

/// A 2D cell label plane, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellLabels {
    labels: Vec<u32>,
    width: usize,
    height: usize,
}

impl CellLabels {
    /// Build from row-major labels; `shape` is `[height, width]`.
    pub fn from_shape_vec<T>(shape: &[usize], labels: &[T]) -> Result<Self>
    where
        T: AsPrimitive<u32>,
    {
        let &[height, width] = shape else {
            return Err(Error::InvalidImageShape {
                shape: shape.to_vec(),
                reason: format!("expected 2 dimensions (y, x), got {}", shape.len()),
            });
        };
        let Some(expected) = height.checked_mul(width) else {
            return Err(Error::InvalidImageShape {
                shape: shape.to_vec(),
                reason: "label count overflows usize".to_string(),
            });
        };
        if expected != labels.len() {
            return Err(Error::InvalidImageShape {
                shape: shape.to_vec(),
                reason: format!(
                    "shape holds {} labels but {} were given",
                    expected,
                    labels.len()
                ),
            });
        }

        Ok(Self {
            labels: labels.iter().map(|&v| v.as_()).collect(),
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn label(&self, x: usize, y: usize) -> u32 {
        self.labels[y * self.width + x]
    }

    /// Highest label in the plane, i.e. the number of cells when ids are dense.
    pub fn cell_count(&self) -> u32 {
        self.labels.iter().copied().max().unwrap_or(0)
    }

    /// Ids of cells with at least one pixel on the outer edge of the plane.
    pub fn labels_touching_border(&self) -> HashSet<u32> {
        let mut touching = HashSet::new();
        if self.width == 0 || self.height == 0 {
            return touching;
        }

        let (last_x, last_y) = (self.width - 1, self.height - 1);
        let top_bottom = (0..self.width).flat_map(|x| [(x, 0), (x, last_y)]);
        let left_right = (0..self.height).flat_map(|y| [(0, y), (last_x, y)]);
        for (x, y) in top_bottom.chain(left_right) {
            let label = self.label(x, y);
            if label != 0 {
                touching.insert(label);
            }
        }
        touching
    }

    /// Single-slice mask of every labelled pixel whose cell is not excluded.
    pub fn include_mask(&self, excluded: &HashSet<u32>) -> Mask {
        self.extrude(excluded, 1)
    }

    /// [`Self::include_mask`] repeated through `depth` slices.
    pub fn extrude(&self, excluded: &HashSet<u32>, depth: usize) -> Mask {
        let plane: Vec<bool> = self
            .labels
            .iter()
            .map(|&label| label != 0 && !excluded.contains(&label))
            .collect();

        let bits: Vec<bool> = (0..depth).flat_map(|_| plane.iter().copied()).collect();
        let mask = BitBuffer3::from_slice(self.width, self.height, depth, &bits);
        tracing::debug!(
            "Cell mask: {} cells, {} excluded, {} voxels over {} slices",
            self.cell_count(),
            excluded.len(),
            mask.count_ones(),
            depth
        );
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 0 0 0 0 2
    // 0 1 1 0 2
    // 0 1 1 0 0
    // 3 0 0 4 0
    fn sample_labels() -> CellLabels {
        #[rustfmt::skip]
        let labels: [u8; 20] = [
            0, 0, 0, 0, 2,
            0, 1, 1, 0, 2,
            0, 1, 1, 0, 0,
            3, 0, 0, 4, 0,
        ];
        CellLabels::from_shape_vec(&[4, 5], &labels).unwrap()
    }

    #[test]
    fn test_rejects_bad_shapes() {
        assert!(matches!(
            CellLabels::from_shape_vec(&[2, 2, 2], &[0u32; 8]),
            Err(Error::InvalidImageShape { .. })
        ));
        assert!(matches!(
            CellLabels::from_shape_vec(&[3, 3], &[0u32; 8]),
            Err(Error::InvalidImageShape { .. })
        ));
        // Wraps to 0 without the overflow check
        assert!(matches!(
            CellLabels::from_shape_vec::<u32>(&[1 << 32, 1 << 32], &[]),
            Err(Error::InvalidImageShape { .. })
        ));
    }

    #[test]
    fn test_border_cells() {
        let labels = sample_labels();
        let touching = labels.labels_touching_border();
        assert_eq!(touching, HashSet::from_iter([2, 3, 4]));
        assert_eq!(labels.cell_count(), 4);
    }

    #[test]
    fn test_include_mask_skips_background_and_excluded() {
        let labels = sample_labels();
        let mask = labels.include_mask(&HashSet::from_iter([2]));

        assert_eq!(mask.shape(), [1, 4, 5]);
        assert_eq!(mask.count_ones(), 6);
        assert!(mask.get_xyz(1, 1, 0));
        assert!(!mask.get_xyz(4, 0, 0));
        assert!(!mask.get_xyz(0, 0, 0));
    }

    #[test]
    fn test_extrude_repeats_plane() {
        let labels = sample_labels();
        let excluded = labels.labels_touching_border();
        let mask = labels.extrude(&excluded, 3);

        assert_eq!(mask.shape(), [3, 4, 5]);
        assert_eq!(mask.count_ones(), 12);
        for z in 0..3 {
            assert!(mask.get_xyz(2, 2, z));
            assert!(!mask.get_xyz(3, 3, z));
        }
    }
}
