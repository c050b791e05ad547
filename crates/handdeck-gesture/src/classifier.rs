//! Gesture classification: per-hand pinch/grab/idle state from landmark
//! points, with hysteresis to prevent flicker at the threshold boundary.

use crate::skeleton::HandSkeleton;
use crate::types::{HandLabel, LandmarkResult, Point, INDEX_TIP, MIDDLE_TIP, THUMB_TIP};

/// Entry threshold: a hand becomes pinch/grab when its distance drops
/// below this.
pub const MERGE_DIST: f32 = 60.0;
/// Exit threshold: a hand already pinch/grab stays so until its distance
/// rises above this. `MERGE_DIST < UNMERGE_DIST` is what gives the
/// classifier its hysteresis band.
pub const UNMERGE_DIST: f32 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Pinch,
    Grab,
}

/// One hand's classification result for a frame, in display-space
/// (mirrored) coordinates.
#[derive(Debug, Clone)]
pub struct ClassifiedHand {
    pub label: HandLabel,
    pub gesture: Gesture,
    /// Pinch point (gesture = Pinch) or grab point (gesture = Grab); absent
    /// when idle.
    pub point: Option<Point>,
    pub skeleton: HandSkeleton,
}

/// `x_display = width - 1 - x_image`, per §4.5's mirror correction for
/// display-space hit testing.
fn mirror_point(p: Point, width: f32) -> Point {
    Point::new(width - 1.0 - p.x, p.y)
}

/// Per-hand hysteresis memory, carried frame to frame.
#[derive(Debug, Clone, Copy, Default)]
struct HandMemory {
    gesture: Gesture,
}

/// Stateful classifier: holds the previous frame's gesture per hand, which
/// is what drives the hysteresis (entry vs. exit threshold).
#[derive(Debug)]
pub struct GestureClassifier {
    memory: [HandMemory; 2],
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self { memory: [HandMemory::default(); 2] }
    }
}

impl GestureClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn memory_mut(&mut self, label: HandLabel) -> &mut HandMemory {
        &mut self.memory[label_index(label)]
    }

    /// Classify every tracked hand (Left, Right) against this frame's
    /// landmark result. A hand absent from `result` is idle with its
    /// hysteresis memory reset, per §4.5.
    pub fn classify(&mut self, result: &LandmarkResult, width: f32, height: f32) -> Vec<ClassifiedHand> {
        HandLabel::ALL
            .into_iter()
            .map(|label| self.classify_hand(label, result, width, height))
            .collect()
    }

    fn classify_hand(&mut self, label: HandLabel, result: &LandmarkResult, width: f32, height: f32) -> ClassifiedHand {
        let Some(hand) = result.hand(label) else {
            self.memory_mut(label).gesture = Gesture::Idle;
            return ClassifiedHand { label, gesture: Gesture::Idle, point: None, skeleton: HandSkeleton::empty() };
        };

        let thumb = hand.point(THUMB_TIP, width, height);
        let index = hand.point(INDEX_TIP, width, height);
        let middle = hand.point(MIDDLE_TIP, width, height);

        let d48 = Point::manhattan(thumb, index);
        let d812 = Point::manhattan(index, middle);

        let prev = self.memory_mut(label).gesture;
        let pinch_threshold = if prev == Gesture::Pinch { UNMERGE_DIST } else { MERGE_DIST };

        let (gesture, point) = if d48 < pinch_threshold {
            (Gesture::Pinch, Some(Point::midpoint(thumb, index)))
        } else {
            let grab_threshold = if prev == Gesture::Grab { UNMERGE_DIST } else { MERGE_DIST };
            if d812 < grab_threshold {
                (Gesture::Grab, Some(Point::midpoint(index, middle)))
            } else {
                (Gesture::Idle, None)
            }
        };

        self.memory_mut(label).gesture = gesture;

        let skeleton = HandSkeleton::build(
            mirror_point(thumb, width),
            mirror_point(index, width),
            mirror_point(middle, width),
            d48,
            d812,
            pinch_threshold,
            if prev == Gesture::Grab { UNMERGE_DIST } else { MERGE_DIST },
        );

        ClassifiedHand { label, gesture, point: point.map(|p| mirror_point(p, width)), skeleton }
    }
}

fn label_index(label: HandLabel) -> usize {
    match label {
        HandLabel::Left => 0,
        HandLabel::Right => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HandLandmarks, NUM_LANDMARKS};

    fn hand_with_tips(label: HandLabel, thumb: (f32, f32), index: (f32, f32), middle: (f32, f32)) -> HandLandmarks {
        let mut landmarks = [(0.0, 0.0, 0.0); NUM_LANDMARKS];
        landmarks[THUMB_TIP] = (thumb.0, thumb.1, 0.0);
        landmarks[INDEX_TIP] = (index.0, index.1, 0.0);
        landmarks[MIDDLE_TIP] = (middle.0, middle.1, 0.0);
        HandLandmarks { label, landmarks }
    }

    #[test]
    fn test_absent_hand_is_idle() {
        let mut c = GestureClassifier::new();
        let result = LandmarkResult::default();
        let out = c.classify(&result, 640.0, 480.0);
        assert!(out.iter().all(|h| h.gesture == Gesture::Idle && h.point.is_none()));
    }

    #[test]
    fn test_close_thumb_index_is_pinch() {
        let mut c = GestureClassifier::new();
        // normalized coords such that pixel distance is small
        let hand = hand_with_tips(HandLabel::Left, (0.10, 0.10), (0.11, 0.10), (0.50, 0.50));
        let result = LandmarkResult { hands: vec![hand] };
        let out = c.classify(&result, 640.0, 480.0);
        let left = out.iter().find(|h| h.label == HandLabel::Left).unwrap();
        assert_eq!(left.gesture, Gesture::Pinch);
        assert!(left.point.is_some());
    }

    #[test]
    fn test_hysteresis_no_flicker_in_band() {
        // d48 oscillating between 70 and 75 (between MERGE_DIST=60 and
        // UNMERGE_DIST=80) must not flip state once pinch is established.
        let mut c = GestureClassifier::new();
        let width = 1000.0;
        let height = 1000.0;

        // Enter pinch: d48 well below MERGE_DIST.
        let enter = hand_with_tips(HandLabel::Left, (0.0, 0.0), (0.01, 0.0), (0.9, 0.9));
        let result = LandmarkResult { hands: vec![enter] };
        let out = c.classify(&result, width, height);
        assert_eq!(out[0].gesture, Gesture::Pinch);

        // Now oscillate d48 between 70 and 75 pixels; since pinch was
        // active, the exit threshold (80) applies, so it must stay pinch.
        for d in [70.0, 75.0, 70.0, 75.0] {
            let thumb_x = 0.0;
            let index_x = d / width;
            let hand = hand_with_tips(HandLabel::Left, (thumb_x, 0.0), (index_x, 0.0), (0.9, 0.9));
            let result = LandmarkResult { hands: vec![hand] };
            let out = c.classify(&result, width, height);
            assert_eq!(out[0].gesture, Gesture::Pinch, "d48={d} should stay pinch inside hysteresis band");
        }
    }

    #[test]
    fn test_grab_when_not_pinch_and_close_middle() {
        let mut c = GestureClassifier::new();
        let hand = hand_with_tips(HandLabel::Right, (0.0, 0.0), (0.5, 0.5), (0.51, 0.5));
        let result = LandmarkResult { hands: vec![hand] };
        let out = c.classify(&result, 1000.0, 1000.0);
        let right = out.iter().find(|h| h.label == HandLabel::Right).unwrap();
        assert_eq!(right.gesture, Gesture::Grab);
    }
}
