//! Cross-platform audio backend, built on CPAL.
//!
//! Lock-free by design: the control thread sends commands via a ring
//! buffer and reads playback state via relaxed atomics; the audio
//! callback owns the [`crate::engine::AudioEngine`] exclusively and never
//! blocks on a contended lock.
//!
//! No JACK routing and no separate cue/headphone bus: HandDeck opens
//! exactly one stereo output stream.

mod backend;
mod config;
mod cpal_backend;
mod device;
mod error;

pub use backend::{start_audio_system, AudioHandle, AudioSystemResult, CommandSender, SelectError, NATIVE_SAMPLE_RATE};
pub use config::{AudioConfig, BufferSize, DEFAULT_BUFFER_SIZE, LOW_LATENCY_BUFFER_SIZES};
pub use device::{get_cpal_default_device, get_output_devices, AudioDevice};
pub use error::{AudioError, AudioResult};
