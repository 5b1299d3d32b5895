//! Common imports for driving the engine.
//!
//! ```rust,ignore
//! use puncta::prelude::*;
//! ```

pub use crate::annotation::{reconcile, AnnotatedPoint, Comments, Position};
pub use crate::blob::Blob;
pub use crate::cell_mask::CellLabels;
pub use crate::detection::{Detector, DetectorConfig, ScaleSpacing, ThresholdMode};
pub use crate::error::{Error, Result};
pub use crate::filter::{LocalContrastFilter, MaskBoundaryFilter, SharpnessFilter};
pub use crate::pipeline::{Pipeline, PipelineConfig};
pub use crate::probe::measure_interior_intensity;
pub use crate::suppression::{BridgeSuppressor, ProximitySuppressor};
pub use crate::volume::{mask_from_shape_vec, volume_from_shape_vec, Mask, Volume};
