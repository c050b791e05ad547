//! Audio backend configuration.
//!
//! No cue/headphone bus: a single stereo master output is the whole
//! output surface here.

use serde::{Deserialize, Serialize};

/// Buffer sizes to try, smallest first, when negotiating with the device.
pub const LOW_LATENCY_BUFFER_SIZES: [u32; 4] = [64, 128, 256, 512];

/// Default buffer size when no preference is specified (frames).
pub const DEFAULT_BUFFER_SIZE: u32 = 512;

/// Preferred buffer size for the audio stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BufferSize {
    /// Let the device choose.
    Default,
    /// Request a specific size in frames (may be adjusted by the device).
    Fixed(u32),
    /// Try [`LOW_LATENCY_BUFFER_SIZES`] smallest-first.
    LowLatency,
}

impl Default for BufferSize {
    fn default() -> Self {
        Self::Default
    }
}

impl BufferSize {
    pub fn as_frames(&self) -> Option<u32> {
        match self {
            BufferSize::Default => None,
            BufferSize::Fixed(frames) => Some(*frames),
            BufferSize::LowLatency => Some(DEFAULT_BUFFER_SIZE),
        }
    }

    pub fn latency_ms(&self, sample_rate: u32) -> Option<f32> {
        self.as_frames().map(|frames| (frames as f32 / sample_rate as f32) * 1000.0)
    }
}

/// Configuration for the single master output stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Preferred buffer size.
    pub buffer_size: BufferSize,
    /// Preferred sample rate (`None` = device default).
    pub sample_rate: Option<u32>,
}

impl AudioConfig {
    pub fn low_latency() -> Self {
        Self { buffer_size: BufferSize::LowLatency, ..Default::default() }
    }

    pub fn with_buffer_frames(mut self, frames: u32) -> Self {
        self.buffer_size = BufferSize::Fixed(frames);
        self
    }

    pub fn with_sample_rate(mut self, rate: u32) -> Self {
        self.sample_rate = Some(rate);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_size_latency_ms() {
        let bs = BufferSize::Fixed(512);
        let ms = bs.latency_ms(44_100).unwrap();
        assert!((ms - 11.6).abs() < 0.1);
    }

    #[test]
    fn test_default_buffer_size_is_none() {
        assert_eq!(BufferSize::Default.as_frames(), None);
    }
}
