//! Volume and mask construction from flat sample arrays.

use common::{BitBuffer3, Buffer3};
use num_traits::{AsPrimitive, Zero};

use crate::error::{Error, Result};

/// Dense intensity grid, `[depth, height, width]`.
pub type Volume = Buffer3<f32>;

/// Dense binary grid with the same layout as [`Volume`].
pub type Mask = BitBuffer3;

fn check_shape(shape: &[usize], len: usize) -> Result<(usize, usize, usize)> {
    let &[depth, height, width] = shape else {
        return Err(Error::InvalidImageShape {
            shape: shape.to_vec(),
            reason: format!("expected 3 dimensions (z, y, x), got {}", shape.len()),
        });
    };

    let Some(expected) = depth.checked_mul(height).and_then(|n| n.checked_mul(width)) else {
        return Err(Error::InvalidImageShape {
            shape: shape.to_vec(),
            reason: "sample count overflows usize".to_string(),
        });
    };
    if expected != len {
        return Err(Error::InvalidImageShape {
            shape: shape.to_vec(),
            reason: format!("shape holds {} samples but {} were given", expected, len),
        });
    }

    Ok((depth, height, width))
}

/// Build a [`Volume`] from row-major samples of any primitive numeric type.
///
/// `shape` is `[depth, height, width]`.
pub fn volume_from_shape_vec<T>(shape: &[usize], samples: &[T]) -> Result<Volume>
where
    T: AsPrimitive<f32>,
{
    let (depth, height, width) = check_shape(shape, samples.len())?;
    let voxels = samples.iter().map(|&v| v.as_()).collect();
    Ok(Buffer3::new(width, height, depth, voxels))
}

/// Build a [`Mask`] from row-major samples; any non-zero sample is set.
pub fn mask_from_shape_vec<T>(shape: &[usize], samples: &[T]) -> Result<Mask>
where
    T: Zero + PartialEq,
{
    let (depth, height, width) = check_shape(shape, samples.len())?;
    let bits: Vec<bool> = samples.iter().map(|v| !v.is_zero()).collect();
    Ok(BitBuffer3::from_slice(width, height, depth, &bits))
}

/// Fails with [`Error::InvalidImageShape`] unless the mask matches the volume.
pub fn ensure_same_shape(volume: &Volume, mask: &Mask) -> Result<()> {
    if volume.shape() != mask.shape() {
        return Err(Error::InvalidImageShape {
            shape: mask.shape().to_vec(),
            reason: format!("mask shape does not match volume shape {:?}", volume.shape()),
        });
    }
    Ok(())
}

/// Largest sample, or `None` for an empty volume.
pub(crate) fn global_max(volume: &Volume) -> Option<f32> {
    volume.iter().copied().reduce(f32::max)
}
