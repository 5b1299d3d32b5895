//! Removal of same-slice peaks whose disks overlap too much.
//!
//! A peak at scale `sigma` covers a disk of radius `sigma * sqrt(2)`. When two
//! disks overlap by more than a fraction of the smaller disk's area, the
//! smaller-scale peak goes.

use std::f64::consts::{PI, SQRT_2};

/// Peak position and scale, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ScaledPeak {
    pub y: f32,
    pub x: f32,
    pub sigma: f32,
}

/// Area of intersection of two circles at distance `d`, radii `r1`, `r2`,
/// as a fraction of the smaller circle's area.
fn disk_overlap(d: f64, r1: f64, r2: f64) -> f64 {
    let ratio1 = ((d * d + r1 * r1 - r2 * r2) / (2.0 * d * r1)).clamp(-1.0, 1.0);
    let ratio2 = ((d * d + r2 * r2 - r1 * r1) / (2.0 * d * r2)).clamp(-1.0, 1.0);
    let acos1 = ratio1.acos();
    let acos2 = ratio2.acos();

    let a = -d + r2 + r1;
    let b = d - r2 + r1;
    let c = d + r2 - r1;
    let e = d + r2 + r1;
    let area = r1 * r1 * acos1 + r2 * r2 * acos2 - 0.5 * (a * b * c * e).abs().sqrt();

    area / (PI * r1.min(r2).powi(2))
}

/// Overlap fraction of two peaks, in `[0, 1]`.
///
/// Distances are measured in units of the larger disk's radius, so the larger
/// disk has radius 1.
pub(crate) fn peak_overlap(a: &ScaledPeak, b: &ScaledPeak) -> f64 {
    let (s1, s2) = (a.sigma as f64, b.sigma as f64);
    if s1 <= 0.0 && s2 <= 0.0 {
        return 0.0;
    }

    let (max_sigma, r1, r2) = if s1 > s2 {
        (s1, 1.0, s2 / s1)
    } else {
        (s2, s1 / s2, 1.0)
    };

    let unit = max_sigma * SQRT_2;
    let dy = (a.y as f64 - b.y as f64) / unit;
    let dx = (a.x as f64 - b.x as f64) / unit;
    let d = (dy * dy + dx * dx).sqrt();

    if d > r1 + r2 {
        return 0.0;
    }
    if d <= (r1 - r2).abs() {
        return 1.0;
    }
    disk_overlap(d, r1, r2)
}

/// Drop peaks that overlap a kept peak by more than `overlap`.
///
/// Candidate pairs are those within `2 * sqrt(2) * max_sigma` of each other,
/// visited in index order; on equal scales the earlier peak of the pair goes.
/// Surviving peaks keep their input order.
pub(crate) fn prune_overlapping(peaks: Vec<ScaledPeak>, overlap: f32) -> Vec<ScaledPeak> {
    if peaks.len() < 2 {
        return peaks;
    }

    let max_sigma = peaks.iter().map(|p| p.sigma).fold(0.0f32, f32::max) as f64;
    let reach = 2.0 * max_sigma * SQRT_2;
    let reach_sq = reach * reach;

    let mut alive = vec![true; peaks.len()];
    for i in 0..peaks.len() {
        for j in (i + 1)..peaks.len() {
            if !alive[i] {
                break;
            }
            if !alive[j] {
                continue;
            }
            let dy = peaks[i].y as f64 - peaks[j].y as f64;
            let dx = peaks[i].x as f64 - peaks[j].x as f64;
            if dy * dy + dx * dx > reach_sq {
                continue;
            }

            if peak_overlap(&peaks[i], &peaks[j]) > overlap as f64 {
                if peaks[i].sigma > peaks[j].sigma {
                    alive[j] = false;
                } else {
                    alive[i] = false;
                }
            }
        }
    }

    peaks
        .into_iter()
        .zip(alive)
        .filter_map(|(peak, keep)| keep.then_some(peak))
        .collect()
}
