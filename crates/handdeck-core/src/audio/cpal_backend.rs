//! CPAL audio backend: a single stereo master output stream.
//!
//! ```text
//! ┌──────────────────┐                     ┌─────────────────────┐
//! │  Control thread   │───push()───────────►│   Command Queue     │
//! │ (gesture-rate)    │                     │  (lock-free SPSC)   │
//! └──────────────────┘                     └──────────┬──────────┘
//!         │                                           │
//!         │ relaxed atomics                           │ pop()
//!         ▼                                           ▼
//! ┌──────────────────┐                     ┌─────────────────────┐
//! │   DeckAtomics     │◄────────────────────│  CPAL callback      │
//! │   (lock-free)     │     writes          │  (owns AudioEngine) │
//! └──────────────────┘                     └─────────────────────┘
//! ```
//!
//! No cue/headphone bus: exactly one stereo output stream.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{BufferSize as CpalBufferSize, SampleFormat, Stream, StreamConfig};

use super::backend::{AudioHandle, AudioSystemResult, CommandSender};
use super::config::{AudioConfig, BufferSize, DEFAULT_BUFFER_SIZE};
use super::device::get_cpal_default_device;
use super::error::{AudioError, AudioResult};
use crate::engine::{command_channel, AudioEngine, EngineCommand};
use crate::types::{StereoBuffer, SAMPLE_RATE};

/// Maximum buffer size to pre-allocate so the callback never allocates.
const MAX_BUFFER_FRAMES: usize = 8192;

struct CallbackState {
    engine: AudioEngine,
    command_rx: rtrb::Consumer<EngineCommand>,
    master_buffer: StereoBuffer,
}

impl CallbackState {
    fn new(engine: AudioEngine, command_rx: rtrb::Consumer<EngineCommand>) -> Self {
        Self { engine, command_rx, master_buffer: StereoBuffer::with_capacity(MAX_BUFFER_FRAMES) }
    }

    fn process(&mut self, n_frames: usize) {
        self.master_buffer.set_len_from_capacity(n_frames);
        self.engine.process_commands(&mut self.command_rx);
        self.engine.process(n_frames, &mut self.master_buffer);
    }
}

/// Open the default output device and start the stream driving a fresh
/// [`AudioEngine`]. `library_root` is handed to the returned
/// [`CommandSender`] so song decodes triggered via `select` happen on the
/// control thread, never inside this module's callback.
pub fn start_audio_system(config: &AudioConfig, library_root: PathBuf) -> AudioResult<AudioSystemResult> {
    let device = get_cpal_default_device()?;
    let device_name = device.name().unwrap_or_else(|_| "unknown".to_string());
    log::info!("using audio device: {device_name}");

    let (supported_config, buffer_size) = get_output_config(&device, config)?;
    let sample_rate = supported_config.sample_rate().0;

    let stream_config = StreamConfig {
        channels: supported_config.channels(),
        sample_rate: supported_config.sample_rate(),
        buffer_size: CpalBufferSize::Fixed(buffer_size),
    };

    let latency_ms = (buffer_size as f32 / sample_rate as f32) * 1000.0;
    log::info!(
        "audio config: {} channels, {}Hz, {} frames (~{:.1}ms latency)",
        stream_config.channels,
        sample_rate,
        buffer_size,
        latency_ms
    );

    let engine = AudioEngine::new();
    let deck_atomics = engine.deck_atomics();

    let (command_tx, command_rx) = command_channel();
    let state = Arc::new(Mutex::new(CallbackState::new(engine, command_rx)));

    let stream = build_output_stream(&device, &stream_config, state)?;
    stream.play().map_err(|e| AudioError::StreamPlayError(e.to_string()))?;

    log::info!("audio stream started");

    Ok(AudioSystemResult {
        handle: AudioHandle { stream, sample_rate, buffer_size },
        command_sender: CommandSender::new(command_tx, library_root),
        deck_atomics,
        sample_rate,
        buffer_size,
        latency_ms,
    })
}

/// Pick a supported output config close to [`SAMPLE_RATE`], f32, stereo,
/// falling back to whatever the device actually offers.
fn get_output_config(device: &cpal::Device, config: &AudioConfig) -> AudioResult<(cpal::SupportedStreamConfig, u32)> {
    let supported_configs: Vec<_> =
        device.supported_output_configs().map_err(|e| AudioError::ConfigError(e.to_string()))?.collect();

    if supported_configs.is_empty() {
        return Err(AudioError::ConfigError("no supported output configurations".to_string()));
    }

    let target_rate = config.sample_rate.unwrap_or(SAMPLE_RATE);

    let best = supported_configs
        .iter()
        .filter(|c| c.sample_format() == SampleFormat::F32 && c.channels() >= 2)
        .find(|c| target_rate >= c.min_sample_rate().0 && target_rate <= c.max_sample_rate().0)
        .or_else(|| supported_configs.iter().find(|c| c.channels() >= 2))
        .or_else(|| supported_configs.first())
        .ok_or_else(|| AudioError::ConfigError("no suitable output configuration".to_string()))?;

    let sample_rate = if target_rate >= best.min_sample_rate().0 && target_rate <= best.max_sample_rate().0 {
        cpal::SampleRate(target_rate)
    } else {
        let fallback = best.max_sample_rate();
        log::warn!("device does not support {target_rate}Hz, falling back to {}Hz", fallback.0);
        fallback
    };

    let stream_config = best.clone().with_sample_rate(sample_rate);

    let buffer_size = match config.buffer_size {
        BufferSize::Default => DEFAULT_BUFFER_SIZE,
        BufferSize::Fixed(frames) => frames.clamp(64, MAX_BUFFER_FRAMES as u32),
        BufferSize::LowLatency => 256,
    };

    Ok((stream_config, buffer_size))
}

fn build_output_stream(device: &cpal::Device, config: &StreamConfig, state: Arc<Mutex<CallbackState>>) -> AudioResult<Stream> {
    let channels = config.channels as usize;

    let stream = device
        .build_output_stream(
            config,
            move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                let mut state = state.lock().unwrap();
                let n_frames = data.len() / channels;
                state.process(n_frames);

                let samples = state.master_buffer.as_slice();
                for (i, frame) in data.chunks_mut(channels).enumerate() {
                    if i < samples.len() {
                        let sample = samples[i];
                        frame[0] = sample.left;
                        if channels > 1 {
                            frame[1] = sample.right;
                        }
                        for ch in frame.iter_mut().skip(2) {
                            *ch = 0.0;
                        }
                    } else {
                        for ch in frame.iter_mut() {
                            *ch = 0.0;
                        }
                    }
                }
            },
            |err| log::error!("audio stream error: {err}"),
            None,
        )
        .map_err(|e| AudioError::StreamBuildError(e.to_string()))?;

    Ok(stream)
}
