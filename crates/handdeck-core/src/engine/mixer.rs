//! Mixer — sums the two decks' contributions into the master output buffer.
//!
//! No headphone/cue bus and no per-channel EQ: the mixer's entire job is
//! "zero the buffer, ask each deck to add its contribution".

use super::deck::Deck;
use crate::types::{StereoBuffer, NUM_DECKS};

pub struct Mixer;

impl Mixer {
    pub fn new() -> Self {
        Self
    }

    /// Zero `out`, then ask each deck to add its contribution. `out` must
    /// already have length `frames` (the caller sizes it via
    /// `set_len_from_capacity` before calling, per the real-time-safety
    /// contract in §4.3).
    pub fn process(&self, decks: &[Deck; NUM_DECKS], frames: usize, out: &mut StereoBuffer) {
        out.fill_silence();
        for deck in decks {
            deck.process(frames, out);
        }
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}
