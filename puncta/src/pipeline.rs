//! End-to-end driver: detection, suppression, then the optional filters.

use common::FileFormat;
use serde::{Deserialize, Serialize};

use crate::blob::Blob;
use crate::detection::{Detector, DetectorConfig};
use crate::error::Result;
use crate::filter::{LocalContrastFilter, MaskBoundaryFilter, SharpnessFilter};
use crate::suppression::{BridgeSuppressor, ProximitySuppressor};
use crate::volume::{ensure_same_shape, Mask, Volume};

/// Parameters of every stage.
///
/// Detection, proximity and bridge suppression always run. The filters run
/// only when present, in field order.
///
/// ```yaml
/// detector:
///   threshold_mode: absolute
///   threshold_value: 400
/// local_contrast: {}        # enabled with defaults
/// mask_boundary:
///   erosion_iterations: 5
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub detector: DetectorConfig,
    pub proximity: ProximitySuppressor,
    pub bridge: BridgeSuppressor,
    pub local_contrast: Option<LocalContrastFilter>,
    pub sharpness: Option<SharpnessFilter>,
    pub mask_boundary: Option<MaskBoundaryFilter>,
}

impl PipelineConfig {
    /// Parse YAML or JSON; missing fields take their defaults.
    pub fn from_text(text: &str, format: FileFormat) -> Result<Self> {
        Ok(common::deserialize(text, format)?)
    }

    pub fn to_text(&self, format: FileFormat) -> Result<String> {
        Ok(common::serialize(self, format)?)
    }

    pub fn validate(&self) {
        self.detector.validate();
        self.proximity.validate();
        self.bridge.validate();
        if let Some(local_contrast) = &self.local_contrast {
            local_contrast.validate();
        }
        if let Some(sharpness) = &self.sharpness {
            sharpness.validate();
        }
    }
}

/// Blob counts after each stage. Filters that did not run are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub detected: usize,
    pub proximity_removed: usize,
    pub bridge_removed: usize,
    pub local_contrast_removed: Option<usize>,
    pub sharpness_removed: Option<usize>,
    pub mask_boundary_removed: Option<usize>,
    pub kept: usize,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Surviving blobs, intensity-descending.
    pub blobs: Vec<Blob>,
    pub diagnostics: Diagnostics,
    /// Eroded mask, when the mask boundary filter ran.
    pub eroded_mask: Option<Mask>,
}

#[derive(Debug, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every configured stage on `volume`.
    ///
    /// Fails with [`crate::Error::InvalidImageShape`] when `mask` does not
    /// match the volume, and with detector errors as [`Detector::detect`].
    pub fn run(&self, volume: &Volume, mask: Option<&Mask>) -> Result<PipelineOutput> {
        self.config.validate();
        if let Some(mask) = mask {
            ensure_same_shape(volume, mask)?;
        }

        let detector = Detector::from_config(self.config.detector.clone());
        let mut blobs = detector.detect(volume)?;

        let mut diagnostics = Diagnostics {
            detected: blobs.len(),
            ..Default::default()
        };

        diagnostics.proximity_removed = self.config.proximity.suppress(&mut blobs);
        diagnostics.bridge_removed = self.config.bridge.suppress(volume, &mut blobs);

        if let Some(filter) = &self.config.local_contrast {
            diagnostics.local_contrast_removed = Some(filter.filter(volume, &mut blobs));
        }
        if let Some(filter) = &self.config.sharpness {
            diagnostics.sharpness_removed = Some(filter.filter(volume, &mut blobs));
        }

        let mut eroded_mask = None;
        match (&self.config.mask_boundary, mask) {
            (Some(filter), Some(mask)) => {
                let (removed, eroded) = filter.filter(mask, &mut blobs);
                diagnostics.mask_boundary_removed = Some(removed);
                eroded_mask = Some(eroded);
            }
            (Some(_), None) => {
                tracing::warn!("Mask boundary filter configured but no mask given, skipping");
            }
            (None, _) => {}
        }

        diagnostics.kept = blobs.len();
        tracing::info!(
            "Pipeline kept {} of {} detected blobs (proximity -{}, bridge -{})",
            diagnostics.kept,
            diagnostics.detected,
            diagnostics.proximity_removed,
            diagnostics.bridge_removed
        );

        Ok(PipelineOutput {
            blobs,
            diagnostics,
            eroded_mask,
        })
    }
}
