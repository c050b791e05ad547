//! Landmark subsystem boundary: the trait the frame loop submits frames
//! through, and the single-slot mailbox that carries results back.
//!
//! Per §5.1, landmark results arrive at camera framerate — tens of Hz, not
//! audio callback rates — so a plain mutex is real-time-safe here even
//! though the audio path (`handdeck_core::engine`) uses atomics and
//! lock-free queues exclusively.

use std::sync::Mutex;

use crate::types::{LandmarkResult, RgbFrame};

/// Submits video frames for hand-landmark detection and delivers results
/// asynchronously via a callback registered at construction. Implementors
/// own whatever async executor or native detector library backs them;
/// this crate depends on no concrete vendor ML crate, only this trait and
/// [`Mailbox`] for test doubles.
pub trait LandmarkSource {
    /// Submit a frame for detection. Non-blocking: the result, if any,
    /// arrives later through the callback passed at construction.
    fn submit(&self, frame: RgbFrame, timestamp_ms: i64);
}

/// Single-slot mailbox: the landmark callback publishes into it, the video
/// thread reads the latest value on demand. Stale reads (the same result
/// read more than once) are expected and harmless — "latest-wins", not
/// "exactly-once".
pub struct Mailbox<T> {
    slot: Mutex<Option<T>>,
}

impl<T> Mailbox<T> {
    pub fn new() -> Self {
        Self { slot: Mutex::new(None) }
    }

    /// Overwrite the slot with a new value, discarding whatever was there.
    pub fn publish(&self, value: T)
    where
        T: Clone,
    {
        *self.slot.lock().expect("mailbox mutex poisoned") = Some(value);
    }

    /// Read the most recently published value without clearing the slot,
    /// so a reader that polls faster than the publisher still gets the
    /// last result rather than `None`.
    pub fn take_latest(&self) -> Option<T>
    where
        T: Clone,
    {
        self.slot.lock().expect("mailbox mutex poisoned").clone()
    }
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HandLandmarks;

    #[test]
    fn test_mailbox_starts_empty() {
        let mailbox: Mailbox<LandmarkResult> = Mailbox::new();
        assert!(mailbox.take_latest().is_none());
    }

    #[test]
    fn test_mailbox_latest_wins() {
        let mailbox: Mailbox<LandmarkResult> = Mailbox::new();
        mailbox.publish(LandmarkResult { hands: vec![] });
        let first = mailbox.take_latest().unwrap();
        assert!(first.hands.is_empty());

        let second_hand: HandLandmarks = HandLandmarks { label: crate::types::HandLabel::Left, landmarks: [(0.0, 0.0, 0.0); crate::types::NUM_LANDMARKS] };
        mailbox.publish(LandmarkResult { hands: vec![second_hand] });
        let second = mailbox.take_latest().unwrap();
        assert_eq!(second.hands.len(), 1);
    }

    #[test]
    fn test_mailbox_repeated_reads_return_same_stale_value() {
        let mailbox: Mailbox<LandmarkResult> = Mailbox::new();
        mailbox.publish(LandmarkResult { hands: vec![] });
        assert!(mailbox.take_latest().is_some());
        assert!(mailbox.take_latest().is_some());
    }
}
