//! Scale-normalized Laplacian of Gaussian over a single XY plane.
//!
//! The LoG is built from separable 1D Gaussian kernels: the second derivative
//! along one axis times the plain Gaussian along the other, summed over both
//! axes. Borders use half-sample symmetric reflection (`d c b a | a b c d`).

use rayon::prelude::*;

/// Kernel half-width in units of sigma.
const TRUNCATE: f64 = 4.0;

/// 1D Gaussian kernel (`order == 0`) or its second derivative (`order == 2`).
///
/// The Gaussian is normalized to sum to 1 before the derivative polynomial is
/// applied. Radius is `round(4 * sigma)`.
pub(crate) fn gaussian_kernel_1d(sigma: f32, order: u8) -> Vec<f32> {
    assert!(sigma > 0.0, "Sigma must be positive");
    assert!(order == 0 || order == 2, "Only orders 0 and 2 are supported");

    let sigma = sigma as f64;
    let sigma2 = sigma * sigma;
    let radius = (TRUNCATE * sigma + 0.5) as i64;

    let phi: Vec<f64> = (-radius..=radius)
        .map(|x| (-0.5 / sigma2 * (x * x) as f64).exp())
        .collect();
    let sum: f64 = phi.iter().sum();

    (-radius..=radius)
        .zip(&phi)
        .map(|(x, &p)| {
            let p = p / sum;
            let value = if order == 0 {
                p
            } else {
                let x = x as f64;
                p * (x * x / (sigma2 * sigma2) - 1.0 / sigma2)
            };
            value as f32
        })
        .collect()
}

/// Map a possibly out-of-range index back into `0..len` by mirroring about
/// the edges, repeating the edge sample.
#[inline]
fn reflect_index(i: isize, len: usize) -> usize {
    let n = len as isize;
    let m = i.rem_euclid(2 * n);
    (if m < n { m } else { 2 * n - 1 - m }) as usize
}

fn correlate_rows(input: &[f32], output: &mut [f32], width: usize, kernel: &[f32]) {
    let radius = (kernel.len() / 2) as isize;

    output
        .par_chunks_mut(width)
        .zip(input.par_chunks(width))
        .for_each(|(out_row, in_row)| {
            for (x, out) in out_row.iter_mut().enumerate() {
                let mut sum = 0.0f32;
                for (k, &kval) in kernel.iter().enumerate() {
                    let sx = reflect_index(x as isize + k as isize - radius, width);
                    sum += in_row[sx] * kval;
                }
                *out = sum;
            }
        });
}

fn correlate_cols(input: &[f32], output: &mut [f32], width: usize, height: usize, kernel: &[f32]) {
    let radius = (kernel.len() / 2) as isize;

    output
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, out_row)| {
            for (x, out) in out_row.iter_mut().enumerate() {
                let mut sum = 0.0f32;
                for (k, &kval) in kernel.iter().enumerate() {
                    let sy = reflect_index(y as isize + k as isize - radius, height);
                    sum += input[sy * width + x] * kval;
                }
                *out = sum;
            }
        });
}

/// Separable 2D filter: `row_kernel` along x, then `col_kernel` along y.
fn separable(
    plane: &[f32],
    width: usize,
    height: usize,
    row_kernel: &[f32],
    col_kernel: &[f32],
) -> Vec<f32> {
    let mut temp = vec![0.0f32; width * height];
    correlate_rows(plane, &mut temp, width, row_kernel);
    let mut output = vec![0.0f32; width * height];
    correlate_cols(&temp, &mut output, width, height, col_kernel);
    output
}

/// Laplacian of Gaussian of a row-major plane.
pub(crate) fn gaussian_laplace(plane: &[f32], width: usize, height: usize, sigma: f32) -> Vec<f32> {
    assert_eq!(plane.len(), width * height, "Pixel count mismatch");
    if plane.is_empty() {
        return Vec::new();
    }

    let smooth = gaussian_kernel_1d(sigma, 0);
    let second = gaussian_kernel_1d(sigma, 2);

    let d2x = separable(plane, width, height, &second, &smooth);
    let d2y = separable(plane, width, height, &smooth, &second);

    d2x.iter().zip(&d2y).map(|(a, b)| a + b).collect()
}

/// Blob response at one scale: `-sigma² · LoG`, so bright blobs are positive
/// and responses are comparable across scales.
pub(crate) fn scale_normalized_response(
    plane: &[f32],
    width: usize,
    height: usize,
    sigma: f32,
) -> Vec<f32> {
    let norm = -sigma * sigma;
    let mut response = gaussian_laplace(plane, width, height, sigma);
    for v in &mut response {
        *v *= norm;
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaussian_kernel_normalization_and_radius() {
        for sigma in [0.5f32, 1.0, 2.0, 3.3] {
            let kernel = gaussian_kernel_1d(sigma, 0);
            let sum: f32 = kernel.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5, "sigma={} sum={}", sigma, sum);

            let radius = (4.0 * sigma as f64 + 0.5) as usize;
            assert_eq!(kernel.len(), 2 * radius + 1);
        }
    }

    #[test]
    fn test_second_derivative_kernel_shape() {
        let kernel = gaussian_kernel_1d(2.0, 2);
        let center = kernel.len() / 2;

        // Negative at the center, symmetric, and (nearly) zero-sum.
        assert!(kernel[center] < 0.0);
        for i in 0..center {
            assert!((kernel[i] - kernel[kernel.len() - 1 - i]).abs() < 1e-7);
        }
        let sum: f32 = kernel.iter().sum();
        assert!(sum.abs() < 1e-3, "sum={}", sum);
    }

    #[test]
    fn test_reflect_index() {
        // len 4: ... 1 0 | 0 1 2 3 | 3 2 ...
        assert_eq!(reflect_index(-1, 4), 0);
        assert_eq!(reflect_index(-2, 4), 1);
        assert_eq!(reflect_index(0, 4), 0);
        assert_eq!(reflect_index(3, 4), 3);
        assert_eq!(reflect_index(4, 4), 3);
        assert_eq!(reflect_index(5, 4), 2);
        // Kernel wider than the signal keeps bouncing.
        assert_eq!(reflect_index(8, 4), 0);
        assert_eq!(reflect_index(-5, 4), 3);
        assert_eq!(reflect_index(7, 1), 0);
    }

    #[test]
    fn test_laplace_of_constant_is_zero() {
        // Only the kernel truncation at 4 sigma leaves a small residual.
        let plane = vec![1.0f32; 20 * 15];
        let lap = gaussian_laplace(&plane, 20, 15, 1.5);
        assert!(lap.iter().all(|v| v.abs() < 1e-2));
    }

    #[test]
    fn test_response_peaks_on_bright_spot() {
        let (width, height) = (21, 21);
        let mut plane = vec![0.0f32; width * height];
        plane[10 * width + 10] = 1.0;

        let response = scale_normalized_response(&plane, width, height, 1.5);
        let (argmax, &max) = response
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .unwrap();

        assert_eq!(argmax, 10 * width + 10);
        assert!(max > 0.0);
    }
}
