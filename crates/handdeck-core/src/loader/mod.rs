//! Stem Library Loader
//!
//! Reads a song's four stem files (bass, drums, other, vocals) plus its
//! `bpm.txt`, and produces a fully decoded [`Song`] ready to hand to a
//! [`crate::engine::Deck`].

use std::path::{Path, PathBuf};

use crate::audio_file::{decode_stem_file, resample_linear, AudioFileError};
use crate::types::{StereoBuffer, Stem, SAMPLE_RATE};

/// Default BPM used when a song has no `bpm.txt`, or its content doesn't parse.
pub const DEFAULT_BPM: f64 = 120.0;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("song '{song}' is missing its {stem} stem file")]
    MissingStem { song: String, stem: &'static str },
    #[error("failed to decode stem '{stem}' for song '{song}': {source}")]
    Decode {
        song: String,
        stem: &'static str,
        #[source]
        source: AudioFileError,
    },
}

pub type LoadResult<T> = Result<T, LoadError>;

/// A fully decoded song: four stem buffers (indexed by [`Stem`]) plus BPM.
#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    pub name: String,
    pub path: PathBuf,
    pub bpm: f64,
    stems: [StereoBuffer; 4],
}

impl Song {
    /// Build a `Song` directly from already-decoded stem buffers, used by
    /// BPM sync to publish a resampled copy under the same identity.
    pub fn from_parts(name: String, path: PathBuf, bpm: f64, stems: [StereoBuffer; 4]) -> Self {
        Self { name, path, bpm, stems }
    }

    pub fn stem(&self, stem: Stem) -> &StereoBuffer {
        &self.stems[stem as usize]
    }

    /// Length, in frames, of the longest stem (stems need not all be the
    /// same length if source files were trimmed slightly differently).
    pub fn max_len(&self) -> usize {
        self.stems.iter().map(StereoBuffer::len).max().unwrap_or(0)
    }
}

/// Load a song by name from `library_root/<song_name>/`.
///
/// Reads each of `bass.<ext>`, `drums.<ext>`, `other.<ext>`, `vocals.<ext>`
/// (extension resolved by trying wav, flac, mp3, ogg in order), resampling
/// any stem whose native rate isn't [`SAMPLE_RATE`]. Reads `bpm.txt`;
/// absence or a parse failure falls back to [`DEFAULT_BPM`].
pub fn load(library_root: &Path, song_name: &str) -> LoadResult<Song> {
    let song_dir = library_root.join(song_name);

    let mut stems: Vec<StereoBuffer> = Vec::with_capacity(4);
    for stem in Stem::ALL {
        let stem_name = stem.file_name();
        let stem_path = crate::audio_file::resolve_stem_path(&song_dir, stem_name).ok_or_else(|| {
            LoadError::MissingStem {
                song: song_name.to_string(),
                stem: stem_name,
            }
        })?;

        let (buffer, native_rate) = decode_stem_file(&stem_path).map_err(|source| LoadError::Decode {
            song: song_name.to_string(),
            stem: stem_name,
            source,
        })?;

        let buffer = resample_linear(&buffer, native_rate, SAMPLE_RATE);
        stems.push(buffer);
    }

    let bpm = read_bpm(&song_dir);

    Ok(Song {
        name: song_name.to_string(),
        path: song_dir,
        bpm,
        stems: stems.try_into().expect("exactly NUM_STEMS stems collected"),
    })
}

fn read_bpm(song_dir: &Path) -> f64 {
    match std::fs::read_to_string(song_dir.join("bpm.txt")) {
        Ok(contents) => contents.trim().parse::<f64>().unwrap_or_else(|_| {
            log::warn!("bpm.txt in {:?} did not parse as a number, using default", song_dir);
            DEFAULT_BPM
        }),
        Err(_) => {
            log::debug!("no bpm.txt in {:?}, using default BPM", song_dir);
            DEFAULT_BPM
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_bpm_missing_file_defaults() {
        let dir = std::env::temp_dir().join("handdeck_test_missing_bpm");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        assert_eq!(read_bpm(&dir), DEFAULT_BPM);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_read_bpm_parses_value() {
        let dir = std::env::temp_dir().join("handdeck_test_bpm_value");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("bpm.txt"), "128.5\n").unwrap();
        assert_eq!(read_bpm(&dir), 128.5);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_read_bpm_unparsable_defaults() {
        let dir = std::env::temp_dir().join("handdeck_test_bpm_garbage");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("bpm.txt"), "not-a-number").unwrap();
        assert_eq!(read_bpm(&dir), DEFAULT_BPM);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_missing_song_dir_reports_missing_stem() {
        let library = std::env::temp_dir().join("handdeck_test_nonexistent_library");
        let _ = std::fs::remove_dir_all(&library);
        std::fs::create_dir_all(&library).unwrap();
        let result = load(&library, "no_such_song");
        assert!(matches!(result, Err(LoadError::MissingStem { .. })));
        let _ = std::fs::remove_dir_all(&library);
    }
}
