//! `AudioEngine` — ties the two decks and the mixer together, applies
//! queued control-thread commands, and implements BPM sync (§4.4).

use std::path::PathBuf;
use std::sync::Arc;

use crate::loader::Song;
use crate::types::{NUM_DECKS, Side, StereoBuffer};

use super::command::EngineCommand;
use super::{Deck, Mixer};

pub struct AudioEngine {
    decks: [Deck; NUM_DECKS],
    mixer: Mixer,
}

impl AudioEngine {
    pub fn new() -> Self {
        Self {
            decks: std::array::from_fn(|_| Deck::new()),
            mixer: Mixer::new(),
        }
    }

    pub fn deck(&self, side: Side) -> &Deck {
        &self.decks[side as usize]
    }

    /// Lock-free atomics handles for both decks, for the audio backend to
    /// clone out before moving the engine into the callback closure.
    pub fn deck_atomics(&self) -> [Arc<super::DeckAtomics>; NUM_DECKS] {
        std::array::from_fn(|i| self.decks[i].atomics())
    }

    /// Drain all pending commands from `consumer`, applying each to its
    /// deck. Runs at the start of every audio callback. Every command here
    /// is O(1): the disk decode behind `LoadSong` already happened on the
    /// control thread (see `crate::audio::CommandSender::select`), so this
    /// never allocates or blocks on I/O.
    pub fn process_commands(&mut self, consumer: &mut rtrb::Consumer<EngineCommand>) {
        while let Ok(cmd) = consumer.pop() {
            self.apply(cmd);
        }
    }

    fn apply(&mut self, cmd: EngineCommand) {
        match cmd {
            EngineCommand::LoadSong { side, song } => self.decks[side as usize].replace_song(song),
            EngineCommand::Play { side } => self.decks[side as usize].play(),
            EngineCommand::Pause { side } => self.decks[side as usize].pause(),
            EngineCommand::Cue { side } => self.decks[side as usize].cue(),
            EngineCommand::SetRate { side, rate } => self.decks[side as usize].set_rate(rate),
            EngineCommand::Mute { side, stem } => self.decks[side as usize].mute(stem),
            EngineCommand::Unmute { side, stem } => self.decks[side as usize].unmute(stem),
            EngineCommand::Seek { side, delta_seconds } => self.decks[side as usize].seek(delta_seconds),
            EngineCommand::ApplyBpmSync => self.apply_bpm_sync(),
        }
    }

    /// Fill `out` (already sized to the callback's frame count) with the
    /// summed output of both decks.
    pub fn process(&self, frames: usize, out: &mut StereoBuffer) {
        self.mixer.process(&self.decks, frames, out);
    }

    /// §4.4: no-op if either deck has no song loaded (so no native BPM).
    /// Otherwise resample each deck's stems to the mean of the two native
    /// BPMs and reset both decks' positions to zero.
    pub fn apply_bpm_sync(&mut self) {
        let bpms: Vec<Option<f64>> = self.decks.iter().map(Deck::bpm_native).collect();
        if bpms.iter().any(Option::is_none) {
            log::debug!("bpm sync skipped: not all decks have a loaded song");
            return;
        }
        let bpms: Vec<f64> = bpms.into_iter().flatten().collect();
        let target = bpms.iter().sum::<f64>() / bpms.len() as f64;

        for deck in &self.decks {
            let Some(song) = deck.song_snapshot() else { continue };
            let ratio = song.bpm / target;
            let resynced = resample_song(&song, ratio);
            deck.replace_song(Arc::new(resynced));
        }
    }
}

impl Default for AudioEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Resample every stem of `song` by `ratio`, producing a new `Song` with
/// the same name/path/bpm but time-stretched stem buffers.
fn resample_song(song: &Song, ratio: f64) -> Song {
    use crate::audio_file::resample_by_ratio;
    use crate::types::Stem;

    let stems: Vec<StereoBuffer> = Stem::ALL.iter().map(|&stem| resample_by_ratio(song.stem(stem), ratio)).collect();

    Song::from_parts(song.name.clone(), song.path.clone(), song.bpm, stems.try_into().expect("exactly NUM_STEMS stems"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bpm_sync_noop_without_songs() {
        let mut engine = AudioEngine::new();
        engine.apply_bpm_sync();
        assert_eq!(engine.deck(Side::Left).position(), 0.0);
        assert_eq!(engine.deck(Side::Right).position(), 0.0);
    }

    #[test]
    fn test_process_commands_drains_queue() {
        let mut engine = AudioEngine::new();
        let (mut tx, mut rx) = super::super::command_channel();
        tx.push(EngineCommand::SetRate { side: Side::Left, rate: 1.25 }).unwrap();
        engine.process_commands(&mut rx);
        assert_eq!(engine.deck(Side::Left).rate(), 1.25);
    }

    #[test]
    fn test_process_fills_silence_with_no_songs() {
        let engine = AudioEngine::new();
        let mut out = StereoBuffer::silence(16);
        engine.process(16, &mut out);
        assert_eq!(out.peak(), 0.0);
    }

    fn silent_song(name: &str, bpm: f64, len: usize) -> Song {
        use crate::types::StereoSample;
        let stems = std::array::from_fn(|_| StereoBuffer::from_vec(vec![StereoSample::silence(); len]));
        Song::from_parts(name.to_string(), PathBuf::from(name), bpm, stems)
    }

    /// §4.4: resampling both decks to the mean BPM must preserve the
    /// invariant new_len / old_len == target_bpm / native_bpm (within
    /// linear-interpolation rounding), for every stem on every deck.
    #[test]
    fn test_bpm_sync_preserves_length_ratio_invariant() {
        let mut engine = AudioEngine::new();

        let left_song = silent_song("left", 120.0, 1000);
        let right_song = silent_song("right", 160.0, 1000);
        engine.decks[0].replace_song(Arc::new(left_song));
        engine.decks[1].replace_song(Arc::new(right_song));

        let target = (120.0 + 160.0) / 2.0;

        engine.apply_bpm_sync();

        let left_ratio = 120.0 / target;
        let right_ratio = 160.0 / target;
        let left_len = engine.deck(Side::Left).max_len();
        let right_len = engine.deck(Side::Right).max_len();

        assert_eq!(left_len, (1000.0 * left_ratio).round() as usize);
        assert_eq!(right_len, (1000.0 * right_ratio).round() as usize);
    }

    /// §4.2: a single stem at unit gain and rate 1.0 must pass its samples
    /// through unchanged (impulse response). Position `pos_initial` plus
    /// the loop index `k` must land exactly on the impulse.
    #[test]
    fn test_impulse_response_at_unit_rate_and_gain() {
        use crate::types::{Stem, StereoSample};

        let pos_initial = 5usize;
        let impulse_value = 0.75f32;
        let len = 32;

        let mut bass_samples = vec![StereoSample::silence(); len];
        bass_samples[pos_initial] = StereoSample::new(impulse_value, impulse_value);
        let bass = StereoBuffer::from_vec(bass_samples);

        let mut stems: [StereoBuffer; 4] = std::array::from_fn(|_| StereoBuffer::from_vec(vec![StereoSample::silence(); len]));
        stems[Stem::Bass as usize] = bass;

        let song = Song::from_parts("impulse".to_string(), PathBuf::from("impulse"), 120.0, stems);

        let deck = Deck::new();
        deck.replace_song(Arc::new(song));
        deck.mute(Stem::Drums);
        deck.mute(Stem::Other);
        deck.mute(Stem::Vocals);
        deck.play();

        let mut out = StereoBuffer::silence(len);
        deck.process(len, &mut out);

        assert_eq!(out[pos_initial].left, impulse_value);
        assert_eq!(out[pos_initial].right, impulse_value);
        for i in 0..len {
            if i != pos_initial {
                assert_eq!(out[i].peak(), 0.0, "unexpected energy at frame {i}");
            }
        }
    }
}
