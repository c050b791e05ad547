//! Placeholder landmark subsystem.
//!
//! The hand-landmark model is an external collaborator (§1 Non-goals,
//! §6.1) with no vendored implementation in this repo. `NoLandmarkModel`
//! satisfies `LandmarkSource` without ever detecting a hand, so the
//! orchestrator runs end-to-end with an always-idle control surface until
//! a real detector is wired in in its place.

use handdeck_gesture::landmark::LandmarkSource;
use handdeck_gesture::types::RgbFrame;

pub struct NoLandmarkModel;

impl LandmarkSource for NoLandmarkModel {
    fn submit(&self, _frame: RgbFrame, _timestamp_ms: i64) {}
}
