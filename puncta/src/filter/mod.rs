//! Per-blob keep/drop filters.
//!
//! Each filter looks at one blob at a time and preserves the input order of
//! the survivors. Blobs whose neighborhood would leave the volume are
//! dropped; which neighborhood counts differs per filter.

mod local_contrast;
mod mask_boundary;
mod sharpness;


pub use local_contrast::LocalContrastFilter;
pub use mask_boundary::{BoundaryRing, MaskBoundaryFilter};
pub use sharpness::SharpnessFilter;
