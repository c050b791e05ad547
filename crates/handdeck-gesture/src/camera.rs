//! Camera and display boundary traits, per §6.1. No vendor camera or
//! windowing crate dependency lives in this crate — only the trait and a
//! deterministic test double ([`FixedFrameCamera`], [`NullDisplay`]).

use crate::types::BgrFrame;

/// Reads frames from a physical or virtual camera.
pub trait CameraSource {
    /// Returns `None` on an empty frame (§7: not an error, just skipped).
    fn read_frame(&mut self) -> Option<BgrFrame>;
}

/// Shows frames to the operator and reports keypresses.
pub trait Display {
    fn show_frame(&mut self, frame: &BgrFrame);

    /// `None` when no key was pressed this poll.
    fn poll_key(&mut self) -> Option<char>;
}

/// Test double that replays a fixed sequence of frames, then `None`.
pub struct FixedFrameCamera {
    frames: std::vec::IntoIter<Option<BgrFrame>>,
}

impl FixedFrameCamera {
    pub fn new(frames: Vec<Option<BgrFrame>>) -> Self {
        Self { frames: frames.into_iter() }
    }
}

impl CameraSource for FixedFrameCamera {
    fn read_frame(&mut self) -> Option<BgrFrame> {
        self.frames.next().flatten()
    }
}

/// Test double that records shown frames and replays a fixed key sequence.
#[derive(Default)]
pub struct NullDisplay {
    pub shown: Vec<BgrFrame>,
    keys: std::collections::VecDeque<char>,
}

impl NullDisplay {
    pub fn with_keys(keys: Vec<char>) -> Self {
        Self { shown: Vec::new(), keys: keys.into() }
    }
}

impl Display for NullDisplay {
    fn show_frame(&mut self, frame: &BgrFrame) {
        self.shown.push(frame.clone());
    }

    fn poll_key(&mut self) -> Option<char> {
        self.keys.pop_front()
    }
}
