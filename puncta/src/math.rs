//! Small statistics helpers.

/// Percentile with linear interpolation between closest ranks.
///
/// `q` is in percent, `[0, 100]`. Mutates the input (partial sort via
/// quickselect). Panics on empty input.
pub fn percentile_f32_mut(data: &mut [f32], q: f32) -> f32 {
    assert!(!data.is_empty(), "percentile of empty data");
    assert!(
        (0.0..=100.0).contains(&q),
        "percentile must be in [0, 100], got {}",
        q
    );

    let rank = q as f64 / 100.0 * (data.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let frac = rank - lo as f64;

    let (_, lo_value, upper) = data.select_nth_unstable_by(lo, f32::total_cmp);
    let lo_value = *lo_value;
    if frac == 0.0 || upper.is_empty() {
        return lo_value;
    }

    // Everything right of the pivot is >= it, so the next rank is their minimum.
    let hi_value = upper.iter().copied().reduce(f32::min).unwrap_or(lo_value);
    (lo_value as f64 + (hi_value as f64 - lo_value as f64) * frac) as f32
}

/// Arithmetic mean; `NaN` for empty input.
#[inline]
pub fn mean_f32(values: impl IntoIterator<Item = f32>) -> f32 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0f64, 0usize), |(sum, count), v| (sum + v as f64, count + 1));
    (sum / count as f64) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_endpoints() {
        let mut data = vec![5.0, 1.0, 3.0, 2.0, 4.0];
        assert_eq!(percentile_f32_mut(&mut data, 0.0), 1.0);
        assert_eq!(percentile_f32_mut(&mut data, 100.0), 5.0);
        assert_eq!(percentile_f32_mut(&mut data, 50.0), 3.0);
    }

    #[test]
    fn test_percentile_interpolates() {
        // rank = 0.995 * 9 = 8.955 => 9 + 0.955 * (10 - 9)
        let mut data: Vec<f32> = (1..=10).map(|v| v as f32).collect();
        let p = percentile_f32_mut(&mut data, 99.5);
        assert!((p - 9.955).abs() < 1e-4, "got {}", p);

        // rank = 0.25 * 3 = 0.75 => 10 + 0.75 * (20 - 10)
        let mut data = vec![40.0, 10.0, 30.0, 20.0];
        assert!((percentile_f32_mut(&mut data, 25.0) - 17.5).abs() < 1e-5);
    }

    #[test]
    fn test_percentile_single_value() {
        let mut data = vec![7.0];
        assert_eq!(percentile_f32_mut(&mut data, 99.5), 7.0);
    }

    #[test]
    #[should_panic(expected = "percentile must be in [0, 100]")]
    fn test_percentile_rejects_out_of_range() {
        percentile_f32_mut(&mut [1.0, 2.0], 101.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean_f32([1.0, 2.0, 3.0, 6.0]), 3.0);
        assert!(mean_f32(std::iter::empty()).is_nan());
    }
}
