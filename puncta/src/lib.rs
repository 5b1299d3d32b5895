//! Punctum detection and curation for 3D fluorescence microscopy volumes.
//!
//! Candidates are found per Z slice with a scale-space Laplacian of Gaussian
//! detector, de-duplicated by two greedy intensity-ordered passes, and then
//! optionally screened by local contrast, sharpness and a cell mask:
//!
//! ```text
//! Detector → ProximitySuppressor → BridgeSuppressor
//!          → [LocalContrastFilter] → [SharpnessFilter] → [MaskBoundaryFilter]
//! ```
//!
//! Every stage consumes and returns a `Vec<Blob>`. [`Pipeline`] wires them
//! together from a [`PipelineConfig`].

pub mod annotation;
pub mod blob;
pub mod cell_mask;
pub mod detection;
pub mod error;
pub mod filter;
pub mod math;
pub mod morphology;
pub mod pipeline;
pub mod prelude;
pub mod probe;
pub mod suppression;
pub mod volume;

#[cfg(test)]
pub(crate) mod test_utils;

pub use blob::Blob;
pub use detection::{Detector, DetectorConfig, ResolvedThreshold, ScaleSpacing, ThresholdMode};
pub use error::{Error, Result};
pub use filter::{BoundaryRing, LocalContrastFilter, MaskBoundaryFilter, SharpnessFilter};
pub use pipeline::{Diagnostics, Pipeline, PipelineConfig, PipelineOutput};
pub use suppression::{BridgeSuppressor, ProximitySuppressor};
pub use volume::{ensure_same_shape, mask_from_shape_vec, volume_from_shape_vec, Mask, Volume};
