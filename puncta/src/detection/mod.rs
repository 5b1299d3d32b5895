//! Per-slice scale-space blob detection.
//!
//! # Algorithm Overview
//!
//! 1. **Threshold resolution**: the configured threshold (a percentile of the
//!    whole volume, or a literal value) is divided by the volume's global
//!    maximum.
//!
//! 2. **Scale space**: every Z slice, normalized by the same global maximum,
//!    is filtered with a scale-normalized Laplacian of Gaussian at each
//!    configured sigma, giving a `(scale, y, x)` response stack.
//!
//! 3. **Peaks**: local maxima of the stack above the threshold become
//!    candidates; same-slice candidates whose disks overlap too much are
//!    pruned in favor of the larger scale.
//!
//! 4. **Intensity**: each candidate is measured as the mean of the 3×3 XY
//!    window around it in its own slice, shrinking at the slice edges.
//!
//! Slices are independent and run in parallel; the output is concatenated in
//! slice order so it matches a sequential run exactly.

mod laplacian;
mod peaks;
mod prune;


use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::blob::Blob;
use crate::error::{Error, Result};
use crate::math::{mean_f32, percentile_f32_mut};
use crate::volume::{global_max, Volume};

use peaks::find_peaks;
use prune::{prune_overlapping, ScaledPeak};

// ============================================================================
// Configuration
// ============================================================================

/// How `threshold_value` is interpreted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ThresholdMode {
    /// `threshold_value` is a percentile (0-100) of all voxel values.
    #[default]
    Percentile,
    /// `threshold_value` is an intensity in volume units.
    Absolute,
}

impl ThresholdMode {
    /// Parse a mode name, failing with [`Error::InvalidThresholdMode`].
    pub fn parse(name: &str) -> Result<Self> {
        name.parse()
            .map_err(|_| Error::InvalidThresholdMode(name.to_string()))
    }
}

impl TryFrom<String> for ThresholdMode {
    type Error = Error;

    fn try_from(name: String) -> Result<Self> {
        Self::parse(&name)
    }
}

/// Spacing of the sampled sigmas between `min_scale` and `max_scale`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ScaleSpacing {
    #[default]
    Linear,
    /// Evenly spaced in log10.
    Logarithmic,
}

/// Detection threshold in normalized units, with the maximum it was
/// normalized by (always positive).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedThreshold {
    pub relative: f32,
    pub max: f32,
}

/// Parameters of the scale-space detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Smallest Gaussian sigma, in pixels.
    pub min_scale: f32,
    /// Largest Gaussian sigma, in pixels.
    pub max_scale: f32,
    /// Number of sigmas sampled in `[min_scale, max_scale]`.
    pub num_scales: usize,
    pub scale_spacing: ScaleSpacing,
    pub threshold_mode: ThresholdMode,
    /// Percentile in `[0, 100]` or an absolute intensity, per `threshold_mode`.
    pub threshold_value: f32,
    /// Maximum tolerated disk overlap between same-slice peaks, `[0, 1]`.
    pub overlap: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_scale: 1.0,
            max_scale: 3.0,
            num_scales: 6,
            scale_spacing: ScaleSpacing::Linear,
            threshold_mode: ThresholdMode::Percentile,
            threshold_value: 99.5,
            overlap: 0.5,
        }
    }
}

impl DetectorConfig {
    /// Validate the configuration, panicking if invalid.
    pub fn validate(&self) {
        assert!(
            self.min_scale > 0.0,
            "min_scale must be positive, got {}",
            self.min_scale
        );
        assert!(
            self.max_scale >= self.min_scale,
            "max_scale ({}) must be >= min_scale ({})",
            self.max_scale,
            self.min_scale
        );
        assert!(
            self.num_scales >= 1,
            "num_scales must be at least 1, got {}",
            self.num_scales
        );
        if self.threshold_mode == ThresholdMode::Percentile {
            assert!(
                (0.0..=100.0).contains(&self.threshold_value),
                "percentile threshold must be in [0, 100], got {}",
                self.threshold_value
            );
        }
        assert!(
            (0.0..=1.0).contains(&self.overlap),
            "overlap must be in [0, 1], got {}",
            self.overlap
        );
    }

    /// The sampled sigmas, ascending. Endpoints are exact.
    pub fn scales(&self) -> Vec<f32> {
        let (lo, hi) = match self.scale_spacing {
            ScaleSpacing::Linear => (self.min_scale as f64, self.max_scale as f64),
            ScaleSpacing::Logarithmic => (
                (self.min_scale as f64).log10(),
                (self.max_scale as f64).log10(),
            ),
        };

        let n = self.num_scales;
        (0..n)
            .map(|i| {
                let t = if n == 1 {
                    lo
                } else if i == n - 1 {
                    hi
                } else {
                    lo + (hi - lo) * i as f64 / (n - 1) as f64
                };
                match self.scale_spacing {
                    ScaleSpacing::Linear => t as f32,
                    ScaleSpacing::Logarithmic => 10f64.powf(t) as f32,
                }
            })
            .collect()
    }
}

// ============================================================================
// Detector
// ============================================================================

/// Scale-space punctum detector.
///
/// ```rust,ignore
/// let detector = Detector::from_config(DetectorConfig {
///     threshold_mode: ThresholdMode::Absolute,
///     threshold_value: 400.0,
///     ..Default::default()
/// });
/// let blobs = detector.detect(&volume)?;
/// ```
#[derive(Debug, Default)]
pub struct Detector {
    config: DetectorConfig,
}

impl Detector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Threshold relative to the volume's global maximum.
    ///
    /// Fails with [`Error::DegenerateImage`] when the maximum is zero (or the
    /// volume is empty), since no finite relative threshold exists.
    pub fn resolve_threshold(&self, volume: &Volume) -> Result<ResolvedThreshold> {
        let max = global_max(volume).unwrap_or(0.0);
        if max <= 0.0 {
            return Err(Error::DegenerateImage { max });
        }

        let threshold = match self.config.threshold_mode {
            ThresholdMode::Percentile => {
                let mut values = volume.to_vec();
                percentile_f32_mut(&mut values, self.config.threshold_value)
            }
            ThresholdMode::Absolute => self.config.threshold_value,
        };

        tracing::debug!(
            "Detection threshold {:.3} ({} {}), relative {:.5}",
            threshold,
            self.config.threshold_mode,
            self.config.threshold_value,
            threshold / max
        );

        Ok(ResolvedThreshold {
            relative: threshold / max,
            max,
        })
    }

    /// Detect blobs in every Z slice.
    ///
    /// Output is ordered by slice, then by descending detector response within
    /// a slice.
    pub fn detect(&self, volume: &Volume) -> Result<Vec<Blob>> {
        self.config.validate();

        let ResolvedThreshold {
            relative: threshold,
            max,
        } = self.resolve_threshold(volume)?;
        let scales = self.config.scales();

        let per_slice: Vec<Vec<Blob>> = (0..volume.depth())
            .into_par_iter()
            .map(|z| detect_slice(volume, z, &scales, threshold, max, self.config.overlap))
            .collect();

        let blobs: Vec<Blob> = per_slice.into_iter().flatten().collect();
        tracing::debug!(
            "Detected {} blobs in {} slices",
            blobs.len(),
            volume.depth()
        );
        Ok(blobs)
    }
}

fn detect_slice(
    volume: &Volume,
    z: usize,
    scales: &[f32],
    threshold: f32,
    max: f32,
    overlap: f32,
) -> Vec<Blob> {
    let (width, height) = (volume.width(), volume.height());
    let plane: Vec<f32> = volume.slice(z).iter().map(|v| v / max).collect();

    let stack: Vec<Vec<f32>> = scales
        .iter()
        .map(|&sigma| laplacian::scale_normalized_response(&plane, width, height, sigma))
        .collect();

    let peaks: Vec<ScaledPeak> = find_peaks(&stack, width, height, threshold)
        .into_iter()
        .map(|p| ScaledPeak {
            y: p.y as f32,
            x: p.x as f32,
            sigma: scales[p.scale_idx],
        })
        .collect();

    prune_overlapping(peaks, overlap)
        .into_iter()
        .map(|p| Blob::new(z, p.y, p.x, p.sigma, window_mean_3x3(volume, z, p.y, p.x)))
        .collect()
}

/// Mean of the 3×3 XY window at the rounded `(y, x)` in slice `z`, clipped to
/// the slice.
pub(crate) fn window_mean_3x3(volume: &Volume, z: usize, y: f32, x: f32) -> f32 {
    let (width, height) = (volume.width() as i64, volume.height() as i64);
    let cy = y.round_ties_even() as i64;
    let cx = x.round_ties_even() as i64;

    let y0 = (cy - 1).max(0);
    let y1 = (cy + 2).min(height);
    let x0 = (cx - 1).max(0);
    let x1 = (cx + 2).min(width);

    let plane = volume.slice(z);
    mean_f32((y0..y1).flat_map(|yy| (x0..x1).map(move |xx| plane[(yy * width + xx) as usize])))
}
