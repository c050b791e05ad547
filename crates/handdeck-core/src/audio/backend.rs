//! Audio backend handle and command sender.
//!
//! HandDeck only ever opens a single CPAL output stream (no JACK routing,
//! no cue/headphone bus), so this is just a thin wrapper over the one
//! backend rather than a platform-dispatching handle enum.

use std::path::PathBuf;
use std::sync::Arc;

use crate::engine::{DeckAtomics, EngineCommand};
use crate::loader::{self, LoadError};
use crate::types::{Side, NUM_DECKS, SAMPLE_RATE};

use super::config::AudioConfig;
use super::error::AudioResult;

/// Result of starting the audio system: everything the control thread needs
/// to drive playback without ever touching the callback's locks.
pub struct AudioSystemResult {
    /// Handle to keep the stream alive; dropping it stops audio.
    pub handle: AudioHandle,
    /// Command sender for the control thread (lock-free).
    pub command_sender: CommandSender,
    /// Per-side deck atomics, for lock-free reads of playback state.
    pub deck_atomics: [Arc<DeckAtomics>; NUM_DECKS],
    pub sample_rate: u32,
    pub buffer_size: u32,
    pub latency_ms: f32,
}

/// Handle to the running CPAL output stream.
pub struct AudioHandle {
    pub(crate) stream: cpal::Stream,
    pub(crate) sample_rate: u32,
    pub(crate) buffer_size: u32,
}

impl AudioHandle {
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn buffer_size(&self) -> u32 {
        self.buffer_size
    }

    pub fn latency_ms(&self) -> f32 {
        (self.buffer_size as f32 / self.sample_rate as f32) * 1000.0
    }
}

/// Errors from [`CommandSender::select`]: either the disk decode failed, or
/// the decoded song couldn't be handed to the callback because the command
/// queue was full.
#[derive(Debug, thiserror::Error)]
pub enum SelectError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("command queue full, dropped load for '{song_name}'")]
    QueueFull { song_name: String },
}

/// Command sender for the control thread: a non-blocking wrapper over the
/// `rtrb` producer half of the command queue, plus the library root needed
/// to decode songs before handing them to the callback.
pub struct CommandSender {
    pub(crate) producer: rtrb::Producer<crate::engine::EngineCommand>,
    library_root: PathBuf,
}

impl CommandSender {
    /// Wrap the producer half of a command channel (see
    /// `crate::engine::command_channel`). `start_audio_system` is the usual
    /// way to get one; this constructor exists for tests and alternative
    /// wiring that bypass CPAL entirely.
    pub fn new(producer: rtrb::Producer<crate::engine::EngineCommand>, library_root: PathBuf) -> Self {
        Self { producer, library_root }
    }

    /// Send a command to the audio engine (non-blocking). Returns the
    /// command back on failure if the queue is full.
    pub fn send(&mut self, cmd: crate::engine::EngineCommand) -> Result<(), crate::engine::EngineCommand> {
        self.producer.push(cmd).map_err(|rtrb::PushError::Full(value)| value)
    }

    pub fn has_space(&self) -> bool {
        self.producer.slots() > 0
    }

    /// Load `song_name` from the library root and publish it to `side`.
    ///
    /// §5: decoding stem files is disk I/O and a large allocation, so it
    /// runs here, on the control thread. A `Pause` is sent first so the
    /// deck doesn't keep playing the old song while the decode is in
    /// flight, then `LoadSong` carries the already-decoded `Arc<Song>` —
    /// the callback only ever does the pointer swap.
    pub fn select(&mut self, side: Side, song_name: &str) -> Result<(), SelectError> {
        let song = loader::load(&self.library_root, song_name)?;

        let _ = self.send(EngineCommand::Pause { side });
        self.send(EngineCommand::LoadSong { side, song: Arc::new(song) })
            .map_err(|_| SelectError::QueueFull { song_name: song_name.to_string() })
    }
}

/// Start the audio system: open the default output device and spawn the
/// CPAL stream driving an [`crate::engine::AudioEngine`].
pub fn start_audio_system(config: &AudioConfig, library_root: std::path::PathBuf) -> AudioResult<AudioSystemResult> {
    super::cpal_backend::start_audio_system(config, library_root)
}

/// Nominal sample rate HandDeck decodes and mixes at; used as the target
/// when negotiating with the output device.
pub const NATIVE_SAMPLE_RATE: u32 = SAMPLE_RATE;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::command_channel;

    fn sender(library_root: PathBuf) -> CommandSender {
        let (producer, _consumer) = command_channel();
        CommandSender::new(producer, library_root)
    }

    #[test]
    fn test_select_reports_missing_stem_without_touching_callback() {
        let library = std::env::temp_dir().join("handdeck_test_select_missing_song");
        let _ = std::fs::remove_dir_all(&library);
        std::fs::create_dir_all(&library).unwrap();

        let mut tx = sender(library.clone());
        let err = tx.select(Side::Left, "no_such_song").unwrap_err();
        assert!(matches!(err, SelectError::Load(LoadError::MissingStem { .. })));

        let _ = std::fs::remove_dir_all(&library);
    }

    #[test]
    fn test_select_failure_enqueues_no_commands() {
        let library = std::env::temp_dir().join("handdeck_test_select_no_partial_enqueue");
        let _ = std::fs::remove_dir_all(&library);
        std::fs::create_dir_all(&library).unwrap();

        let (producer, mut consumer) = command_channel();
        let mut tx = CommandSender::new(producer, library.clone());
        assert!(tx.select(Side::Right, "missing").is_err());
        assert!(consumer.pop().is_err(), "a failed decode must not send Pause or LoadSong");

        let _ = std::fs::remove_dir_all(&library);
    }
}
