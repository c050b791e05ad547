//! Stem audio file decoding
//!
//! Each stem of a song is stored as its own file (`bass.<ext>`, `drums.<ext>`,
//! `other.<ext>`, `vocals.<ext>`) under the song's directory. This module
//! decodes a single stem file into a [`StereoBuffer`], duplicating mono
//! sources into stereo.

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::types::{Sample, StereoBuffer};

/// Stem file extensions tried, in order, when resolving a song's stem files.
pub const STEM_EXTENSIONS: [&str; 4] = ["wav", "flac", "mp3", "ogg"];

/// Errors that can occur while decoding a stem file.
#[derive(Debug, thiserror::Error)]
pub enum AudioFileError {
    #[error("could not open {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unrecognized audio format for {path}")]
    UnsupportedFormat { path: std::path::PathBuf },
    #[error("no audio track found in {path}")]
    NoAudioTrack { path: std::path::PathBuf },
    #[error("decode error in {path}: {source}")]
    Decode {
        path: std::path::PathBuf,
        #[source]
        source: SymphoniaError,
    },
}

/// Decode a single stem file at `path`, returning a stereo buffer plus the
/// native sample rate reported by the file. Callers (the loader) are
/// responsible for resampling if the rate doesn't match
/// [`crate::types::SAMPLE_RATE`].
pub fn decode_stem_file(path: &Path) -> Result<(StereoBuffer, u32), AudioFileError> {
    let file = File::open(path).map_err(|source| AudioFileError::Io { path: path.to_path_buf(), source })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|_| AudioFileError::UnsupportedFormat { path: path.to_path_buf() })?;

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .ok_or_else(|| AudioFileError::NoAudioTrack { path: path.to_path_buf() })?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|source| AudioFileError::Decode { path: path.to_path_buf(), source })?;

    let mut interleaved: Vec<Sample> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<Sample>> = None;
    let mut channel_count = 1usize;
    let mut sample_rate = crate::types::SAMPLE_RATE;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(source) => return Err(AudioFileError::Decode { path: path.to_path_buf(), source }),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                channel_count = spec.channels.count().max(1);
                sample_rate = spec.rate;
                let buf = sample_buf.get_or_insert_with(|| SampleBuffer::new(decoded.capacity() as u64, spec));
                buf.copy_interleaved_ref(decoded);
                interleaved.extend_from_slice(buf.samples());
            }
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(source) => return Err(AudioFileError::Decode { path: path.to_path_buf(), source }),
        }
    }

    let buffer = if channel_count == 1 {
        StereoBuffer::from_mono(&interleaved)
    } else {
        StereoBuffer::from_interleaved_stride(&interleaved, channel_count)
    };
    Ok((buffer, sample_rate))
}

/// Resample a buffer by linear interpolation from `src_rate` to `dst_rate`.
/// Used both when a stem's native rate differs from the engine's and for
/// BPM-sync's offline stretch (which is itself a ratio-based resample).
pub fn resample_linear(buf: &StereoBuffer, src_rate: u32, dst_rate: u32) -> StereoBuffer {
    if src_rate == dst_rate || buf.is_empty() {
        return buf.clone();
    }
    let ratio = dst_rate as f64 / src_rate as f64;
    resample_by_ratio(buf, ratio)
}

/// Resample a buffer by an explicit length ratio (new_len = old_len * ratio),
/// via linear interpolation between neighboring source frames.
pub fn resample_by_ratio(buf: &StereoBuffer, ratio: f64) -> StereoBuffer {
    let src_len = buf.len();
    if src_len == 0 || ratio <= 0.0 {
        return StereoBuffer::silence(0);
    }
    let new_len = ((src_len as f64) * ratio).round().max(1.0) as usize;
    let mut out = StereoBuffer::with_capacity(new_len);
    let step = (src_len - 1).max(1) as f64 / new_len.max(1) as f64;
    for i in 0..new_len {
        let src_pos = i as f64 * step;
        let idx = src_pos.floor() as usize;
        let frac = (src_pos - idx as f64) as Sample;
        let a = buf[idx.min(src_len - 1)];
        let b = buf[(idx + 1).min(src_len - 1)];
        out.push(a.lerp(&b, frac));
    }
    out
}

/// Resolve `<dir>/<stem_name>.<ext>` by trying [`STEM_EXTENSIONS`] in order.
pub fn resolve_stem_path(dir: &Path, stem_name: &str) -> Option<std::path::PathBuf> {
    for ext in STEM_EXTENSIONS {
        let candidate = dir.join(format!("{stem_name}.{ext}"));
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}
