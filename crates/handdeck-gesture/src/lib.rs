//! Gesture classification and control-surface widgets for HandDeck.
//!
//! This crate owns the boundary between the video/control thread and the
//! outside world: it defines [`camera::CameraSource`], [`camera::Display`]
//! and [`landmark::LandmarkSource`] as traits (no vendor camera or ML crate
//! dependency lives here), classifies raw landmark results into per-hand
//! gestures, and drives a set of [`widget::Widget`]s that turn those
//! gestures into [`handdeck_core::engine::EngineCommand`]s.

pub mod camera;
pub mod classifier;
pub mod landmark;
pub mod skeleton;
pub mod types;
pub mod widget;

pub use camera::{CameraSource, Display};
pub use classifier::{Gesture, GestureClassifier};
pub use landmark::{LandmarkSource, Mailbox};
pub use skeleton::HandSkeleton;
pub use widget::{NullOverlaySurface, Widget};
