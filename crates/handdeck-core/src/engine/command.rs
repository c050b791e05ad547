//! Lock-free command queue carrying control-thread mutations to the audio
//! callback.
//!
//! The callback never blocks on a mutex to read a command: `rtrb` gives a
//! wait-free single-producer/single-consumer ring buffer, so pushing from
//! the control thread and popping from the callback are both O(1) and
//! never contend. Most `Deck` mutations (`play`/`pause`/`cue`/`seek`/
//! `mute`/`set_rate`) already go straight through `DeckAtomics` without
//! needing a command at all; this queue also carries `LoadSong`, which
//! exists because a deck swap has to be requested through the same
//! ordered channel as `Pause` rather than applied directly — but the
//! disk decode behind it already happened on the control thread (see
//! `crate::audio::CommandSender::select`), so by the time `LoadSong`
//! reaches the callback it is nothing more than an `Arc` pointer swap.

use std::sync::Arc;

use crate::loader::Song;
use crate::types::{Side, Stem};

/// Commands sent from the control thread to the audio thread.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    /// Publish an already-decoded song onto a deck. The control thread
    /// decodes via `crate::loader::load` and hands over the `Arc` — the
    /// callback only ever does the pointer swap.
    LoadSong { side: Side, song: Arc<Song> },
    Play { side: Side },
    Pause { side: Side },
    Cue { side: Side },
    SetRate { side: Side, rate: f32 },
    Mute { side: Side, stem: Stem },
    Unmute { side: Side, stem: Stem },
    /// Seek by a delta in seconds (positive = forward).
    Seek { side: Side, delta_seconds: f64 },
    /// Recompute BPM sync across both decks (§4.4).
    ApplyBpmSync,
}

/// Capacity of the command queue: generous for gesture-rate control input
/// (tens of Hz), nowhere near audio-callback rates.
pub const COMMAND_QUEUE_CAPACITY: usize = 64;

/// Create a new command channel (producer/consumer pair). The producer is
/// owned by the control thread, the consumer by the audio callback.
pub fn command_channel() -> (rtrb::Producer<EngineCommand>, rtrb::Consumer<EngineCommand>) {
    rtrb::RingBuffer::new(COMMAND_QUEUE_CAPACITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_channel_roundtrip() {
        let (mut tx, mut rx) = command_channel();
        tx.push(EngineCommand::Play { side: Side::Left }).unwrap();
        let cmd = rx.pop().unwrap();
        assert_eq!(cmd, EngineCommand::Play { side: Side::Left });
    }

    #[test]
    fn test_command_channel_empty() {
        let (_tx, mut rx) = command_channel();
        assert!(rx.pop().is_err());
    }

    #[test]
    fn test_load_song_carries_decoded_song() {
        use crate::loader::Song;
        use std::path::PathBuf;

        let song = Arc::new(Song::from_parts("track_a".to_string(), PathBuf::from("track_a"), 120.0, std::array::from_fn(|_| crate::types::StereoBuffer::silence(0))));

        let (mut tx, mut rx) = command_channel();
        tx.push(EngineCommand::LoadSong { side: Side::Right, song: Arc::clone(&song) }).unwrap();
        let cmd = rx.pop().unwrap();
        assert_eq!(cmd, EngineCommand::LoadSong { side: Side::Right, song });
    }
}
