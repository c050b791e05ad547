//! Deck — a single side's stem player.
//!
//! Deck state that the audio callback touches (`playing`, `position`,
//! `rate`, `gains`) lives in [`DeckAtomics`], shared via `Arc` with the
//! control thread. The currently-loaded song is held behind a `Mutex`
//! around an `Arc<Song>` pointer: `replace_song()` only holds the lock
//! long enough to swap the pointer, so the callback's `process()` call
//! always sees either the whole old song or the whole new one, never a
//! mix. The song itself is decoded off the callback, on the control
//! thread (see `crate::audio::CommandSender::select`), and handed to
//! `replace_song` already built.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::loader::Song;
use crate::types::{StereoBuffer, StereoSample, Stem, NUM_STEMS, SAMPLE_RATE};

/// Samples per waveform-summary peak (≈1000 samples/peak).
const WAVEFORM_DECIMATION: usize = 1000;

/// Lock-free state the audio callback reads and writes every buffer.
pub struct DeckAtomics {
    playing: AtomicBool,
    position_bits: AtomicU64,
    rate_bits: AtomicU32,
    gain_bits: [AtomicU32; NUM_STEMS],
}

impl DeckAtomics {
    fn new() -> Self {
        Self {
            playing: AtomicBool::new(false),
            position_bits: AtomicU64::new(0.0f64.to_bits()),
            rate_bits: AtomicU32::new(1.0f32.to_bits()),
            gain_bits: std::array::from_fn(|_| AtomicU32::new(1.0f32.to_bits())),
        }
    }

    fn position(&self) -> f64 {
        f64::from_bits(self.position_bits.load(Ordering::Relaxed))
    }

    fn set_position(&self, pos: f64) {
        self.position_bits.store(pos.to_bits(), Ordering::Relaxed);
    }

    fn rate(&self) -> f32 {
        f32::from_bits(self.rate_bits.load(Ordering::Relaxed))
    }

    fn set_rate(&self, rate: f32) {
        self.rate_bits.store(rate.to_bits(), Ordering::Relaxed);
    }

    fn gain(&self, stem: usize) -> f32 {
        f32::from_bits(self.gain_bits[stem].load(Ordering::Relaxed))
    }

    fn set_gain(&self, stem: usize, gain: f32) {
        self.gain_bits[stem].store(gain.to_bits(), Ordering::Relaxed);
    }
}

pub struct Deck {
    atomics: Arc<DeckAtomics>,
    song: Mutex<Option<Arc<Song>>>,
    waveform_summary: Mutex<Vec<f32>>,
}

impl Deck {
    pub fn new() -> Self {
        Self {
            atomics: Arc::new(DeckAtomics::new()),
            song: Mutex::new(None),
            waveform_summary: Mutex::new(Vec::new()),
        }
    }

    /// Shared handle to this deck's lock-free state, for the audio backend
    /// to clone into the callback closure.
    pub fn atomics(&self) -> Arc<DeckAtomics> {
        Arc::clone(&self.atomics)
    }

    pub fn play(&self) {
        self.atomics.playing.store(true, Ordering::Relaxed);
    }

    pub fn pause(&self) {
        self.atomics.playing.store(false, Ordering::Relaxed);
    }

    pub fn is_playing(&self) -> bool {
        self.atomics.playing.load(Ordering::Relaxed)
    }

    pub fn cue(&self) {
        self.atomics.set_position(0.0);
        self.pause();
    }

    pub fn set_rate(&self, rate: f32) {
        self.atomics.set_rate(rate.max(0.0));
    }

    pub fn rate(&self) -> f32 {
        self.atomics.rate()
    }

    pub fn mute(&self, stem: Stem) {
        self.atomics.set_gain(stem as usize, 0.0);
    }

    pub fn unmute(&self, stem: Stem) {
        self.atomics.set_gain(stem as usize, 1.0);
    }

    pub fn gain(&self, stem: Stem) -> f32 {
        self.atomics.gain(stem as usize)
    }

    /// Advance position by `ds * SAMPLE_RATE` samples, clamped to
    /// `[0, max_len - epsilon]`.
    pub fn seek(&self, ds: f64) {
        let max_len = self.max_len() as f64;
        let epsilon = 1.0;
        let new_pos = self.atomics.position() + ds * SAMPLE_RATE as f64;
        let clamped = new_pos.clamp(0.0, (max_len - epsilon).max(0.0));
        self.atomics.set_position(clamped);
    }

    pub fn position(&self) -> f64 {
        self.atomics.position()
    }

    pub fn get_position(&self) -> f64 {
        self.atomics.position() / SAMPLE_RATE as f64
    }

    pub fn get_duration(&self) -> f64 {
        self.max_len() as f64 / SAMPLE_RATE as f64
    }

    pub fn max_len(&self) -> usize {
        self.song.lock().unwrap().as_ref().map(Song::max_len).unwrap_or(0)
    }

    pub fn bpm_native(&self) -> Option<f64> {
        self.song.lock().unwrap().as_ref().map(|s| s.bpm)
    }

    /// Current immutable song snapshot, for BPM sync's resample-in-place.
    pub fn song_snapshot(&self) -> Option<Arc<Song>> {
        self.song.lock().unwrap().clone()
    }

    /// Replace the song snapshot directly (used by BPM sync after resampling
    /// stem buffers) and reset position to zero, per §4.4.
    pub fn replace_song(&self, song: Arc<Song>) {
        let summary = compute_waveform_summary(&song);
        *self.waveform_summary.lock().unwrap() = summary;
        self.atomics.set_position(0.0);
        *self.song.lock().unwrap() = Some(song);
    }

    pub fn waveform_summary(&self) -> Vec<f32> {
        self.waveform_summary.lock().unwrap().clone()
    }

    /// Sample assembly per §4.2 steps 1-5. Adds this deck's contribution
    /// into `out` (which must already be the right length); never
    /// allocates, never blocks on a contended lock (the song pointer clone
    /// is an `Arc` refcount bump, not a decode).
    pub fn process(&self, frames: usize, out: &mut StereoBuffer) {
        let song = match self.song.lock().unwrap().clone() {
            Some(s) => s,
            None => return,
        };

        if !self.is_playing() {
            return;
        }

        let max_len = song.max_len();
        if max_len == 0 {
            return;
        }

        let pos = self.atomics.position();
        let rate = self.atomics.rate();

        if pos >= max_len as f64 {
            self.pause();
            return;
        }

        let gains: [f32; NUM_STEMS] = std::array::from_fn(|i| self.atomics.gain(i));

        for k in 0..frames {
            let read_pos = pos + k as f64 * rate as f64;
            if read_pos >= max_len as f64 {
                break;
            }

            let mut mixed = StereoSample::silence();
            for stem in Stem::ALL {
                let buf = song.stem(stem);
                mixed += sample_at(buf, read_pos).scale(gains[stem as usize]);
            }
            out[k] += mixed;
        }

        self.atomics.set_position(pos + frames as f64 * rate as f64);
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

/// Linearly interpolate a stereo buffer at a fractional sample position.
/// Returns silence past the buffer's own length (a stem may be shorter
/// than `max_len`).
fn sample_at(buf: &StereoBuffer, read_pos: f64) -> StereoSample {
    let len = buf.len();
    if len == 0 || read_pos >= len as f64 {
        return StereoSample::silence();
    }
    let idx = read_pos.floor() as usize;
    let frac = (read_pos - idx as f64) as f32;
    let a = buf[idx.min(len - 1)];
    let b = buf[(idx + 1).min(len - 1)];
    a.lerp(&b, frac)
}

/// Peak magnitudes at `WAVEFORM_DECIMATION`-sample resolution over the
/// mono-sum of all four stems (per §3's `waveform_summary` field).
fn compute_waveform_summary(song: &Song) -> Vec<f32> {
    let max_len = song.max_len();
    if max_len == 0 {
        return Vec::new();
    }
    let num_peaks = max_len.div_ceil(WAVEFORM_DECIMATION);
    let mut summary = Vec::with_capacity(num_peaks);

    for peak_idx in 0..num_peaks {
        let start = peak_idx * WAVEFORM_DECIMATION;
        let end = (start + WAVEFORM_DECIMATION).min(max_len);
        let mut peak = 0.0f32;
        for i in start..end {
            let mut mono = 0.0f32;
            for stem in Stem::ALL {
                let buf = song.stem(stem);
                if i < buf.len() {
                    let s = buf[i];
                    mono += (s.left + s.right) * 0.5;
                }
            }
            peak = peak.max(mono.abs());
        }
        summary.push(peak);
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deck_creation_defaults() {
        let deck = Deck::new();
        assert!(!deck.is_playing());
        assert_eq!(deck.position(), 0.0);
        assert_eq!(deck.rate(), 1.0);
        assert_eq!(deck.max_len(), 0);
    }

    #[test]
    fn test_play_pause() {
        let deck = Deck::new();
        deck.play();
        assert!(deck.is_playing());
        deck.pause();
        assert!(!deck.is_playing());
    }

    #[test]
    fn test_cue_resets_position_and_pauses() {
        let deck = Deck::new();
        deck.play();
        deck.atomics.set_position(12345.0);
        deck.cue();
        assert_eq!(deck.position(), 0.0);
        assert!(!deck.is_playing());
    }

    #[test]
    fn test_set_rate_clamps_negative_to_zero() {
        let deck = Deck::new();
        deck.set_rate(-2.0);
        assert_eq!(deck.rate(), 0.0);
        deck.set_rate(1.5);
        assert_eq!(deck.rate(), 1.5);
    }

    #[test]
    fn test_mute_unmute() {
        let deck = Deck::new();
        assert_eq!(deck.gain(Stem::Bass), 1.0);
        deck.mute(Stem::Bass);
        assert_eq!(deck.gain(Stem::Bass), 0.0);
        deck.unmute(Stem::Bass);
        assert_eq!(deck.gain(Stem::Bass), 1.0);
    }

    #[test]
    fn test_process_with_no_song_contributes_silence() {
        let deck = Deck::new();
        deck.play();
        let mut out = StereoBuffer::silence(16);
        deck.process(16, &mut out);
        assert_eq!(out.peak(), 0.0);
    }

    #[test]
    fn test_process_while_paused_contributes_silence() {
        let deck = Deck::new();
        let mut out = StereoBuffer::silence(16);
        deck.process(16, &mut out);
        assert_eq!(out.peak(), 0.0);
    }

    #[test]
    fn test_sample_at_linear_interpolation() {
        let buf = StereoBuffer::from_interleaved(&[0.0, 0.0, 2.0, 2.0]);
        let mid = sample_at(&buf, 0.5);
        assert_eq!(mid.left, 1.0);
        assert_eq!(mid.right, 1.0);
    }

    #[test]
    fn test_sample_at_past_end_is_silence() {
        let buf = StereoBuffer::from_interleaved(&[1.0, 1.0]);
        assert_eq!(sample_at(&buf, 5.0), StereoSample::silence());
    }
}
