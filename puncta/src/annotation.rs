//! Reconciliation of detections with a manually curated point set.
//!
//! After review, every detected position is either confirmed (a curated point
//! lies within tolerance) or rejected, and curated points with no detection
//! are manual additions. The resulting records are the training labels.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::blob::Blob;

/// Per-axis distance at which two positions count as the same punctum.
pub const DEFAULT_MATCH_TOLERANCE: f32 = 1.0;

/// A point in volume coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub z: f32,
    pub y: f32,
    pub x: f32,
}

impl Position {
    pub fn new(z: f32, y: f32, x: f32) -> Self {
        Self { z, y, x }
    }

    /// True iff every axis differs by at most `tolerance`.
    pub fn matches(&self, other: &Position, tolerance: f32) -> bool {
        (self.z - other.z).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.x - other.x).abs() <= tolerance
    }
}

impl From<&Blob> for Position {
    fn from(blob: &Blob) -> Self {
        Self::new(blob.z as f32, blob.y, blob.x)
    }
}

/// Comment lookup key: a position rounded to hundredths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionKey([i64; 3]);

impl From<Position> for PositionKey {
    fn from(p: Position) -> Self {
        let hundredths = |v: f32| (v as f64 * 100.0).round_ties_even() as i64;
        Self([hundredths(p.z), hundredths(p.y), hundredths(p.x)])
    }
}

/// Reviewer comments by position.
pub type Comments = HashMap<PositionKey, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Detected,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Kept,
    Removed,
    Added,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MlLabel {
    TruePositive,
    FalsePositive,
    FalseNegative,
}

/// One reviewed point with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedPoint {
    pub z: f32,
    pub y: f32,
    pub x: f32,
    pub origin: Origin,
    pub status: Status,
    pub label_for_ml: MlLabel,
    pub comment: String,
}

impl AnnotatedPoint {
    fn new(
        position: Position,
        origin: Origin,
        status: Status,
        label: MlLabel,
        comments: &Comments,
    ) -> Self {
        Self {
            z: position.z,
            y: position.y,
            x: position.x,
            origin,
            status,
            label_for_ml: label,
            comment: comments
                .get(&PositionKey::from(position))
                .cloned()
                .unwrap_or_default(),
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.z, self.y, self.x)
    }
}

/// Label detections against the curated point set.
///
/// Detections are matched in order, each to the first unused curated point
/// within `tolerance` on every axis. Output lists all detections first (in
/// input order), then the unmatched curated points (in input order).
pub fn reconcile(
    detected: &[Position],
    curated: &[Position],
    tolerance: f32,
    comments: &Comments,
) -> Vec<AnnotatedPoint> {
    let mut used = vec![false; curated.len()];
    let mut records = Vec::with_capacity(detected.len() + curated.len());

    for det in detected {
        let matched = curated
            .iter()
            .enumerate()
            .position(|(i, cur)| !used[i] && det.matches(cur, tolerance));

        let (status, label) = match matched {
            Some(i) => {
                used[i] = true;
                (Status::Kept, MlLabel::TruePositive)
            }
            None => (Status::Removed, MlLabel::FalsePositive),
        };
        records.push(AnnotatedPoint::new(*det, Origin::Detected, status, label, comments));
    }

    let confirmed = used.iter().filter(|&&u| u).count();
    for (cur, &is_used) in curated.iter().zip(&used) {
        if is_used {
            continue;
        }
        records.push(AnnotatedPoint::new(
            *cur,
            Origin::Manual,
            Status::Added,
            MlLabel::FalseNegative,
            comments,
        ));
    }

    tracing::debug!(
        "Reconciled {} detections against {} curated points: {} kept, {} removed, {} added",
        detected.len(),
        curated.len(),
        confirmed,
        detected.len() - confirmed,
        curated.len() - confirmed
    );
    records
}
