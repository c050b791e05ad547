//! Overlay geometry for a detected hand, reproducing the original
//! `hand_tracking.py::draw_hand_skeleton` dot layout as data rather than
//! drawing calls.
//!
//! The original walks `[thumb_tip, index_tip, middle_tip]` pairwise,
//! collapsing a pair into a single merge-dot at its midpoint once the two
//! points are within the (hysteresis) threshold, and leaving a point dot
//! otherwise. `HandSkeleton` carries exactly that dot list plus which pair
//! (if any) is currently merged, in display-space coordinates, so a real
//! renderer can draw it without recomputing the geometry.

use crate::types::Point;

/// Which landmark pair, if any, collapsed to a single merge-dot this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergedPair {
    /// Thumb tip (4) + index tip (8) merged — the pinch pair.
    ThumbIndex,
    /// Index tip (8) + middle tip (12) merged — the grab pair.
    IndexMiddle,
}

/// Per-hand overlay data: a dot per landmark of interest, collapsing merged
/// pairs to their midpoint, matching the original's incremental walk.
#[derive(Debug, Clone, Default)]
pub struct HandSkeleton {
    pub dots: Vec<Point>,
    pub merged: Option<MergedPair>,
}

impl HandSkeleton {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from the three tip points and their classified distances,
    /// in display-space (already mirrored) coordinates.
    pub fn build(thumb: Point, index: Point, middle: Point, d48: f32, d812: f32, d48_threshold: f32, d812_threshold: f32) -> Self {
        if d48 <= d48_threshold {
            Self {
                dots: vec![Point::midpoint(thumb, index), middle],
                merged: Some(MergedPair::ThumbIndex),
            }
        } else if d812 <= d812_threshold {
            Self {
                dots: vec![thumb, Point::midpoint(index, middle)],
                merged: Some(MergedPair::IndexMiddle),
            }
        } else {
            Self { dots: vec![thumb, index, middle], merged: None }
        }
    }
}
