//! Local maxima in a `(scale, y, x)` response stack.

/// A scale-space peak before overlap pruning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Peak {
    pub y: usize,
    pub x: usize,
    pub scale_idx: usize,
    pub response: f32,
}

/// Find samples that equal the maximum of their 3×3×3 neighborhood (clamped
/// at the stack borders) and strictly exceed `threshold`.
///
/// A stack where every sample is its own neighborhood maximum is flat and
/// yields nothing. Peaks come back brightest first; ties keep `(y, x, scale)`
/// raster order.
pub(crate) fn find_peaks(
    stack: &[Vec<f32>],
    width: usize,
    height: usize,
    threshold: f32,
) -> Vec<Peak> {
    let num_scales = stack.len();
    if num_scales == 0 || width == 0 || height == 0 {
        return Vec::new();
    }

    let mut peaks = Vec::new();
    let mut every_sample_is_max = true;

    for y in 0..height {
        let y_range = y.saturating_sub(1)..=(y + 1).min(height - 1);
        for x in 0..width {
            let x_range = x.saturating_sub(1)..=(x + 1).min(width - 1);
            for s in 0..num_scales {
                let s_range = s.saturating_sub(1)..=(s + 1).min(num_scales - 1);
                let value = stack[s][y * width + x];

                let mut is_max = true;
                'neighborhood: for ns in s_range {
                    let layer = &stack[ns];
                    for ny in y_range.clone() {
                        let row = &layer[ny * width..(ny + 1) * width];
                        for nx in x_range.clone() {
                            if row[nx] > value {
                                is_max = false;
                                break 'neighborhood;
                            }
                        }
                    }
                }

                if !is_max {
                    every_sample_is_max = false;
                } else if value > threshold {
                    peaks.push(Peak {
                        y,
                        x,
                        scale_idx: s,
                        response: value,
                    });
                }
            }
        }
    }

    if every_sample_is_max {
        return Vec::new();
    }

    peaks.sort_by(|a, b| b.response.total_cmp(&a.response));
    peaks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_stack(num_scales: usize, width: usize, height: usize, value: f32) -> Vec<Vec<f32>> {
        vec![vec![value; width * height]; num_scales]
    }

    #[test]
    fn test_single_peak_found_at_its_scale() {
        let (w, h) = (7, 5);
        let mut stack = flat_stack(3, w, h, 0.0);
        stack[1][2 * w + 4] = 1.0;

        let peaks = find_peaks(&stack, w, h, 0.5);
        assert_eq!(
            peaks,
            vec![Peak {
                y: 2,
                x: 4,
                scale_idx: 1,
                response: 1.0
            }]
        );
    }

    #[test]
    fn test_threshold_is_strict() {
        let (w, h) = (5, 5);
        let mut stack = flat_stack(1, w, h, 0.0);
        stack[0][2 * w + 2] = 0.5;

        assert!(find_peaks(&stack, w, h, 0.5).is_empty());
        assert_eq!(find_peaks(&stack, w, h, 0.49).len(), 1);
    }

    #[test]
    fn test_flat_stack_has_no_peaks() {
        let stack = flat_stack(2, 6, 6, 3.0);
        assert!(find_peaks(&stack, 6, 6, 0.0).is_empty());
    }

    #[test]
    fn test_weaker_neighbor_across_scale_is_suppressed() {
        let (w, h) = (5, 5);
        let mut stack = flat_stack(3, w, h, 0.0);
        stack[0][2 * w + 2] = 0.8;
        stack[1][2 * w + 3] = 1.0;

        let peaks = find_peaks(&stack, w, h, 0.1);
        assert_eq!(peaks.len(), 1);
        assert_eq!((peaks[0].y, peaks[0].x, peaks[0].scale_idx), (2, 3, 1));
    }

    #[test]
    fn test_peaks_sorted_brightest_first_with_raster_ties() {
        let (w, h) = (9, 9);
        let mut stack = flat_stack(1, w, h, 0.0);
        stack[0][w + 1] = 0.6;
        stack[0][4 * w + 4] = 0.9;
        stack[0][7 * w + 7] = 0.6;

        let peaks = find_peaks(&stack, w, h, 0.1);
        let coords: Vec<(usize, usize)> = peaks.iter().map(|p| (p.y, p.x)).collect();
        assert_eq!(coords, vec![(4, 4), (1, 1), (7, 7)]);
    }

    #[test]
    fn test_border_peak_uses_clamped_neighborhood() {
        let (w, h) = (4, 4);
        let mut stack = flat_stack(1, w, h, 0.0);
        stack[0][0] = 2.0;

        let peaks = find_peaks(&stack, w, h, 1.0);
        assert_eq!(peaks.len(), 1);
        assert_eq!((peaks[0].y, peaks[0].x), (0, 0));
    }
}
